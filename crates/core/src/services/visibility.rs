//! Event visibility resolution.
//!
//! Publish state is derived at read time from the stored row and the
//! caller's clock. The stored `is_published` flag is never flipped by a
//! read path, so a scheduled event becomes visible the moment its
//! `publish_at` passes without any background job running.

use campus_db::entities::event;
use chrono::{DateTime, Utc};

/// Whether an event is visible to non-privileged viewers at `now`.
///
/// An event is visible if it was explicitly published, or if it has a
/// publish schedule whose time has arrived. The boundary is inclusive:
/// an event with `publish_at` equal to `now` is visible.
#[must_use]
pub fn is_visible_to_public(event: &event::Model, now: DateTime<Utc>) -> bool {
    if event.is_published {
        return true;
    }

    event
        .publish_at
        .is_some_and(|publish_at| publish_at.with_timezone(&Utc) <= now)
}

/// Derived publish lifecycle state of an event at `now`.
///
/// `Published` reached through the wall clock is never written back to
/// the row; it exists only in this derived view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    /// Hidden, with no publish schedule.
    DraftUnscheduled,
    /// Hidden, waiting for `publish_at` to arrive.
    DraftScheduled,
    /// Visible to ordinary viewers.
    Published,
}

/// Compute the publish state of an event at `now`.
#[must_use]
pub fn publish_state(event: &event::Model, now: DateTime<Utc>) -> PublishState {
    if is_visible_to_public(event, now) {
        PublishState::Published
    } else if event.publish_at.is_some() {
        PublishState::DraftScheduled
    } else {
        PublishState::DraftUnscheduled
    }
}

/// Filter a listing down to what a non-privileged viewer may see.
///
/// `now` is sampled once by the caller so every row in the listing is
/// judged against the same instant.
#[must_use]
pub fn filter_visible(events: Vec<event::Model>, now: DateTime<Utc>) -> Vec<event::Model> {
    events
        .into_iter()
        .filter(|e| is_visible_to_public(e, now))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_event(is_published: bool, publish_at: Option<DateTime<Utc>>) -> event::Model {
        event::Model {
            id: "e1".to_string(),
            title: "Test Event".to_string(),
            description: None,
            location: None,
            start_time: Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap().into(),
            end_time: None,
            capacity: None,
            cover_image_url: None,
            created_by: Some("u1".to_string()),
            club_code: None,
            is_campus_wide: true,
            is_published,
            publish_at: publish_at.map(Into::into),
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap().into(),
            updated_at: None,
        }
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn published_flag_always_visible() {
        let event = test_event(true, None);
        assert!(is_visible_to_public(&event, at(0, 0)));
    }

    #[test]
    fn published_flag_wins_over_future_schedule() {
        // Explicit publish overrides a schedule still in the future
        let event = test_event(true, Some(at(12, 0)));
        assert!(is_visible_to_public(&event, at(9, 0)));
    }

    #[test]
    fn draft_without_schedule_hidden() {
        let event = test_event(false, None);
        assert!(!is_visible_to_public(&event, at(23, 59)));
    }

    #[test]
    fn scheduled_hidden_before_publish_at() {
        let event = test_event(false, Some(at(12, 0)));
        assert!(!is_visible_to_public(&event, at(11, 59)));
    }

    #[test]
    fn scheduled_visible_exactly_at_publish_at() {
        let event = test_event(false, Some(at(12, 0)));
        assert!(is_visible_to_public(&event, at(12, 0)));
    }

    #[test]
    fn scheduled_visible_after_publish_at() {
        let event = test_event(false, Some(at(12, 0)));
        assert!(is_visible_to_public(&event, at(12, 1)));
    }

    #[test]
    fn publish_state_transitions_with_the_clock() {
        let draft = test_event(false, None);
        assert_eq!(publish_state(&draft, at(12, 0)), PublishState::DraftUnscheduled);

        let scheduled = test_event(false, Some(at(12, 0)));
        assert_eq!(
            publish_state(&scheduled, at(11, 0)),
            PublishState::DraftScheduled
        );
        assert_eq!(publish_state(&scheduled, at(12, 0)), PublishState::Published);

        let published = test_event(true, None);
        assert_eq!(publish_state(&published, at(0, 0)), PublishState::Published);
    }

    #[test]
    fn filter_visible_keeps_order() {
        let events = vec![
            test_event(true, None),
            test_event(false, None),
            test_event(false, Some(at(10, 0))),
        ];

        let visible = filter_visible(events, at(11, 0));

        assert_eq!(visible.len(), 2);
        assert!(visible[0].is_published);
        assert!(!visible[1].is_published);
    }
}
