//! Club member entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a club member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ClubRole {
    /// Regular member.
    #[sea_orm(string_value = "member")]
    Member,
    /// Officer - may manage the club's events and content.
    #[sea_orm(string_value = "officer")]
    Officer,
    /// Club admin - full management of the club.
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Default for ClubRole {
    fn default() -> Self {
        Self::Member
    }
}

impl ClubRole {
    /// Whether this role carries officer privileges (event management).
    #[must_use]
    pub const fn is_officer(self) -> bool {
        matches!(self, Self::Officer | Self::Admin)
    }

    /// Whether this role can manage members (promote, remove).
    #[must_use]
    pub const fn can_manage_members(self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Wire representation of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Officer => "officer",
            Self::Admin => "admin",
        }
    }
}

impl std::str::FromStr for ClubRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Self::Member),
            "officer" => Ok(Self::Officer),
            "admin" => Ok(Self::Admin),
            _ => Err(()),
        }
    }
}

/// Club member - tracks which users belong to which clubs.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "club_member")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The club they belong to.
    #[sea_orm(indexed)]
    pub club_code: String,

    /// The user who is a member.
    #[sea_orm(indexed)]
    pub user_id: String,

    /// Role of the member in the club.
    pub role: ClubRole,

    /// When the user joined the club.
    pub joined_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::club::Entity",
        from = "Column::ClubCode",
        to = "super::club::Column::Code",
        on_delete = "Cascade"
    )]
    Club,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::club::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Club.def()
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
    fn test_officer_roles() {
        assert!(!ClubRole::Member.is_officer());
        assert!(ClubRole::Officer.is_officer());
        assert!(ClubRole::Admin.is_officer());
    }

    #[test]
    fn test_manage_members() {
        assert!(!ClubRole::Member.can_manage_members());
        assert!(!ClubRole::Officer.can_manage_members());
        assert!(ClubRole::Admin.can_manage_members());
    }
}
