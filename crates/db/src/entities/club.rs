//! Club entity - a student organization in the campus directory.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "club")]
pub struct Model {
    /// Short unique code (human-assigned, immutable key).
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,

    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Cover image URL (resolved by the storage layer after upload).
    #[sea_orm(nullable)]
    pub cover_image_url: Option<String>,

    /// Inactive clubs are hidden from the directory and cannot be targeted.
    #[sea_orm(default_value = true)]
    pub is_active: bool,

    /// Number of members (denormalized).
    #[sea_orm(default_value = 0)]
    pub members_count: i64,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::club_member::Entity")]
    Members,
    #[sea_orm(has_many = "super::event::Entity")]
    Events,
}

impl Related<super::club_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
