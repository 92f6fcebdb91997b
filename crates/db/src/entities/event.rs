//! Event entity.
//!
//! Public visibility is derived at read time from `is_published` and
//! `publish_at`; it is never written back to the row (see
//! `campus_core::services::visibility`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub title: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(nullable)]
    pub location: Option<String>,

    pub start_time: DateTimeWithTimeZone,

    /// Must be >= `start_time` when present.
    #[sea_orm(nullable)]
    pub end_time: Option<DateTimeWithTimeZone>,

    /// Maximum attendance, if capped.
    #[sea_orm(nullable)]
    pub capacity: Option<i32>,

    #[sea_orm(nullable)]
    pub cover_image_url: Option<String>,

    /// Creating user. Null when the creator account was deleted.
    #[sea_orm(nullable, indexed)]
    pub created_by: Option<String>,

    /// Owning club. Null = school-wide event (admin-authored).
    #[sea_orm(nullable, indexed)]
    pub club_code: Option<String>,

    /// Whether the event is listed in the campus-wide feed.
    #[sea_orm(default_value = false)]
    pub is_campus_wide: bool,

    /// Explicit publish flag, flipped only by admins.
    #[sea_orm(default_value = false)]
    pub is_published: bool,

    /// Scheduled auto-reveal time. The event becomes publicly visible
    /// once the wall clock reaches this, without any stored transition.
    #[sea_orm(nullable)]
    pub publish_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::club::Entity",
        from = "Column::ClubCode",
        to = "super::club::Column::Code",
        on_delete = "SetNull"
    )]
    Club,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Creator,
    #[sea_orm(has_many = "super::event_audience::Entity")]
    Audiences,
    #[sea_orm(has_many = "super::event_rsvp::Entity")]
    Rsvps,
}

impl Related<super::club::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Club.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::event_audience::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Audiences.def()
    }
}

impl Related<super::event_rsvp::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rsvps.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
