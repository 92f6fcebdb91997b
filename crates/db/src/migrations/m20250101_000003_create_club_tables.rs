//! Create club and `club_member` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create club table
        manager
            .create_table(
                Table::create()
                    .table(Club::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Club::Code)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Club::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Club::Description).text())
                    .col(ColumnDef::new(Club::CoverImageUrl).string_len(512))
                    .col(
                        ColumnDef::new(Club::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Club::MembersCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Club::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Club::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Index on is_active for directory listings
        manager
            .create_index(
                Index::create()
                    .name("idx_club_is_active")
                    .table(Club::Table)
                    .col(Club::IsActive)
                    .to_owned(),
            )
            .await?;

        // Create club_member table
        manager
            .create_table(
                Table::create()
                    .table(ClubMember::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClubMember::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClubMember::ClubCode)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClubMember::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(ClubMember::Role)
                            .string_len(16)
                            .not_null()
                            .default("member"),
                    )
                    .col(
                        ColumnDef::new(ClubMember::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_club_member_club")
                            .from(ClubMember::Table, ClubMember::ClubCode)
                            .to(Club::Table, Club::Code)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_club_member_user")
                            .from(ClubMember::Table, ClubMember::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_club_member_club_code")
                    .table(ClubMember::Table)
                    .col(ClubMember::ClubCode)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_club_member_user_id")
                    .table(ClubMember::Table)
                    .col(ClubMember::UserId)
                    .to_owned(),
            )
            .await?;

        // Unique constraint on (club_code, user_id)
        manager
            .create_index(
                Index::create()
                    .name("idx_club_member_unique")
                    .table(ClubMember::Table)
                    .col(ClubMember::ClubCode)
                    .col(ClubMember::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClubMember::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Club::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Club {
    Table,
    Code,
    Name,
    Description,
    CoverImageUrl,
    IsActive,
    MembersCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ClubMember {
    Table,
    Id,
    ClubCode,
    UserId,
    Role,
    JoinedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
