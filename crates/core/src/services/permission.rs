//! Event permission resolution.
//!
//! Pure decisions over an actor and an event's ownership fields. Checks
//! are evaluated in precedence order: site admin, then creator, then
//! officer of the owning club. Publishing is stricter than editing and
//! is reserved for site admins.

use campus_db::entities::event;

/// The authenticated party a permission question is asked about.
#[derive(Debug, Clone)]
pub struct Actor {
    /// User ID.
    pub id: String,
    /// Whether the user is a site admin.
    pub is_admin: bool,
    /// Club codes where the user holds an officer-capable role.
    pub officer_clubs: Vec<String>,
}

impl Actor {
    /// Whether the actor is an officer of the given club.
    #[must_use]
    pub fn is_officer_of(&self, club_code: &str) -> bool {
        self.officer_clubs.iter().any(|c| c == club_code)
    }
}

/// The ownership fields of an event relevant to permission checks.
#[derive(Debug, Clone)]
pub struct EventContext {
    /// User who created the event, if still present.
    pub created_by: Option<String>,
    /// Owning club, if the event belongs to one.
    pub club_code: Option<String>,
}

impl EventContext {
    /// Extract the ownership fields from an event row.
    #[must_use]
    pub fn from_event(event: &event::Model) -> Self {
        Self {
            created_by: event.created_by.clone(),
            club_code: event.club_code.clone(),
        }
    }
}

/// Whether the actor may edit the event.
#[must_use]
pub fn can_edit_event(actor: &Actor, event: &EventContext) -> bool {
    if actor.is_admin {
        return true;
    }

    if event.created_by.as_deref() == Some(actor.id.as_str()) {
        return true;
    }

    event
        .club_code
        .as_deref()
        .is_some_and(|code| actor.is_officer_of(code))
}

/// Whether the actor may delete the event.
///
/// Deletion follows the same ownership rules as editing.
#[must_use]
pub fn can_delete_event(actor: &Actor, event: &EventContext) -> bool {
    can_edit_event(actor, event)
}

/// Whether the actor may flip the published flag.
///
/// Only site admins publish directly; everyone else schedules via
/// `publish_at` and waits for the clock.
#[must_use]
pub const fn can_publish_event(actor: &Actor) -> bool {
    actor.is_admin
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(id: &str, is_admin: bool, officer_clubs: &[&str]) -> Actor {
        Actor {
            id: id.to_string(),
            is_admin,
            officer_clubs: officer_clubs.iter().map(ToString::to_string).collect(),
        }
    }

    fn club_event(created_by: &str, club_code: &str) -> EventContext {
        EventContext {
            created_by: Some(created_by.to_string()),
            club_code: Some(club_code.to_string()),
        }
    }

    #[test]
    fn admin_can_do_everything() {
        let admin = actor("a1", true, &[]);
        let event = club_event("someone-else", "ACM");

        assert!(can_edit_event(&admin, &event));
        assert!(can_delete_event(&admin, &event));
        assert!(can_publish_event(&admin));
    }

    #[test]
    fn creator_can_edit_and_delete_but_not_publish() {
        let creator = actor("u1", false, &[]);
        let event = club_event("u1", "ACM");

        assert!(can_edit_event(&creator, &event));
        assert!(can_delete_event(&creator, &event));
        assert!(!can_publish_event(&creator));
    }

    #[test]
    fn officer_of_owning_club_can_edit() {
        let officer = actor("u2", false, &["ACM"]);
        let event = club_event("u1", "ACM");

        assert!(can_edit_event(&officer, &event));
        assert!(can_delete_event(&officer, &event));
    }

    #[test]
    fn officer_of_other_club_cannot_edit() {
        let officer = actor("u2", false, &["SWE"]);
        let event = club_event("u1", "ACM");

        assert!(!can_edit_event(&officer, &event));
        assert!(!can_delete_event(&officer, &event));
    }

    #[test]
    fn plain_member_cannot_touch_school_wide_event() {
        let member = actor("u3", false, &[]);
        let event = EventContext {
            created_by: Some("u1".to_string()),
            club_code: None,
        };

        assert!(!can_edit_event(&member, &event));
    }

    #[test]
    fn officer_cannot_claim_orphaned_school_wide_event() {
        // club_code None means no officer path applies
        let officer = actor("u2", false, &["ACM"]);
        let event = EventContext {
            created_by: None,
            club_code: None,
        };

        assert!(!can_edit_event(&officer, &event));
    }
}
