//! Event audience resolution.
//!
//! Validates who an event is addressed to before anything is written.
//! An audience is the campus-wide flag plus a set of club listings; it
//! must name at least one destination, and non-admins may only target
//! clubs they hold an officer role in.

use campus_common::AppError;
use thiserror::Error;

use crate::services::permission::Actor;

/// Audience validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AudienceError {
    /// Neither campus-wide nor any club was selected.
    #[error("Event audience must include the campus feed or at least one club")]
    EmptyAudience,
    /// A non-admin targeted a club they are not an officer of.
    #[error("Not an officer of club: {0}")]
    NotAnOfficer(String),
}

impl From<AudienceError> for AppError {
    fn from(err: AudienceError) -> Self {
        match err {
            AudienceError::EmptyAudience => Self::Validation(err.to_string()),
            AudienceError::NotAnOfficer(_) => Self::Forbidden(err.to_string()),
        }
    }
}

/// Raw audience selection as submitted by a client.
#[derive(Debug, Clone, Default)]
pub struct AudienceSelection {
    /// Whether the event appears in the campus-wide feed.
    pub is_campus_wide: bool,
    /// Club codes whose listings should carry the event.
    pub club_codes: Vec<String>,
}

/// A validated audience, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudienceSpec {
    /// Whether the event appears in the campus-wide feed.
    pub is_campus_wide: bool,
    /// Deduplicated club codes, in submission order.
    pub club_codes: Vec<String>,
}

/// Validate an audience selection for an actor.
///
/// Duplicate club codes collapse to one listing each. Admins may target
/// any club; everyone else only clubs from their officer set.
pub fn resolve_audience(
    actor: &Actor,
    selection: AudienceSelection,
) -> Result<AudienceSpec, AudienceError> {
    // Blank codes count as no selection at all
    let mut club_codes: Vec<String> = Vec::with_capacity(selection.club_codes.len());
    for code in selection.club_codes {
        if !code.trim().is_empty() && !club_codes.contains(&code) {
            club_codes.push(code);
        }
    }

    if !selection.is_campus_wide && club_codes.is_empty() {
        return Err(AudienceError::EmptyAudience);
    }

    if !actor.is_admin {
        for code in &club_codes {
            if !actor.is_officer_of(code) {
                return Err(AudienceError::NotAnOfficer(code.clone()));
            }
        }
    }

    Ok(AudienceSpec {
        is_campus_wide: selection.is_campus_wide,
        club_codes,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn actor(is_admin: bool, officer_clubs: &[&str]) -> Actor {
        Actor {
            id: "u1".to_string(),
            is_admin,
            officer_clubs: officer_clubs.iter().map(ToString::to_string).collect(),
        }
    }

    fn selection(campus: bool, clubs: &[&str]) -> AudienceSelection {
        AudienceSelection {
            is_campus_wide: campus,
            club_codes: clubs.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn empty_selection_rejected() {
        let result = resolve_audience(&actor(true, &[]), selection(false, &[]));
        assert_eq!(result.unwrap_err(), AudienceError::EmptyAudience);
    }

    #[test]
    fn campus_only_is_valid() {
        let spec = resolve_audience(&actor(false, &[]), selection(true, &[])).unwrap();
        assert!(spec.is_campus_wide);
        assert!(spec.club_codes.is_empty());
    }

    #[test]
    fn officer_can_target_own_clubs() {
        let spec =
            resolve_audience(&actor(false, &["ACM", "SWE"]), selection(false, &["ACM"])).unwrap();
        assert_eq!(spec.club_codes, vec!["ACM".to_string()]);
    }

    #[test]
    fn officer_cannot_target_foreign_club() {
        let result = resolve_audience(&actor(false, &["ACM"]), selection(false, &["SWE"]));
        assert_eq!(
            result.unwrap_err(),
            AudienceError::NotAnOfficer("SWE".to_string())
        );
    }

    #[test]
    fn admin_can_target_any_club() {
        let spec = resolve_audience(&actor(true, &[]), selection(false, &["GDC"])).unwrap();
        assert_eq!(spec.club_codes, vec!["GDC".to_string()]);
    }

    #[test]
    fn blank_code_alone_is_empty() {
        let result = resolve_audience(&actor(true, &[]), selection(false, &[""]));
        assert_eq!(result.unwrap_err(), AudienceError::EmptyAudience);
    }

    #[test]
    fn duplicate_codes_collapse() {
        let spec = resolve_audience(
            &actor(true, &[]),
            selection(true, &["ACM", "SWE", "ACM"]),
        )
        .unwrap();
        assert_eq!(spec.club_codes, vec!["ACM".to_string(), "SWE".to_string()]);
    }
}
