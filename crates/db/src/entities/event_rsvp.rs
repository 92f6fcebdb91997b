//! Event RSVP entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A user's attendance answer for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum RsvpStatus {
    /// Planning to attend.
    #[sea_orm(string_value = "going")]
    Going,
    /// Might attend.
    #[sea_orm(string_value = "interested")]
    Interested,
    /// Not attending.
    #[sea_orm(string_value = "not_going")]
    NotGoing,
}

impl RsvpStatus {
    /// Wire representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Going => "going",
            Self::Interested => "interested",
            Self::NotGoing => "not_going",
        }
    }
}

impl std::str::FromStr for RsvpStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "going" => Ok(Self::Going),
            "interested" => Ok(Self::Interested),
            "not_going" => Ok(Self::NotGoing),
            _ => Err(()),
        }
    }
}

/// Event RSVP - one row per (event, user), overwritten on re-answer.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event_rsvp")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The event being answered.
    #[sea_orm(indexed)]
    pub event_id: String,

    /// The answering user.
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Current answer.
    pub status: RsvpStatus,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_delete = "Cascade"
    )]
    Event,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [RsvpStatus::Going, RsvpStatus::Interested, RsvpStatus::NotGoing] {
            assert_eq!(status.as_str().parse::<RsvpStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!("maybe".parse::<RsvpStatus>().is_err());
    }
}
