//! Profile entity - presentational fields tied 1:1 to a user.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: String,

    /// Display name.
    #[sea_orm(nullable)]
    pub full_name: Option<String>,

    /// Avatar URL (resolved by the storage layer after upload).
    #[sea_orm(nullable)]
    pub avatar_url: Option<String>,

    /// Declared major (references the major table).
    #[sea_orm(nullable, indexed)]
    pub major_code: Option<String>,

    /// Expected graduation year. Never in the past at write time.
    #[sea_orm(nullable)]
    pub graduation_year: Option<i32>,

    /// Denormalized mirror of club memberships (JSON array of club codes).
    pub club_codes: Json,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Club codes as a plain vector.
    #[must_use]
    pub fn club_codes_vec(&self) -> Vec<String> {
        serde_json::from_value(self.club_codes.clone()).unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::major::Entity",
        from = "Column::MajorCode",
        to = "super::major::Column::Code",
        on_delete = "SetNull"
    )]
    Major,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::major::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Major.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
