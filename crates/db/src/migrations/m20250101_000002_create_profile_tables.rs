//! Create major and profile tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create major table
        manager
            .create_table(
                Table::create()
                    .table(Major::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Major::Code)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Major::Name).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Major::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Create profile table
        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Profile::UserId)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Profile::FullName).string_len(128))
                    .col(ColumnDef::new(Profile::AvatarUrl).string_len(512))
                    .col(ColumnDef::new(Profile::MajorCode).string_len(32))
                    .col(ColumnDef::new(Profile::GraduationYear).integer())
                    .col(
                        ColumnDef::new(Profile::ClubCodes)
                            .json_binary()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Profile::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Profile::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_user")
                            .from(Profile::Table, Profile::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_major")
                            .from(Profile::Table, Profile::MajorCode)
                            .to(Major::Table, Major::Code)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index on major_code for major-scoped lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_profile_major_code")
                    .table(Profile::Table)
                    .col(Profile::MajorCode)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Profile::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Major::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Major {
    Table,
    Code,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum Profile {
    Table,
    UserId,
    FullName,
    AvatarUrl,
    MajorCode,
    GraduationYear,
    ClubCodes,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
