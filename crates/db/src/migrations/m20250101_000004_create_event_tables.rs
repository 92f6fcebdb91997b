//! Create event and `event_audience` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create event table
        manager
            .create_table(
                Table::create()
                    .table(Event::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Event::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Event::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Event::Description).text())
                    .col(ColumnDef::new(Event::Location).string_len(256))
                    .col(
                        ColumnDef::new(Event::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Event::EndTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(Event::Capacity).integer())
                    .col(ColumnDef::new(Event::CoverImageUrl).string_len(512))
                    .col(ColumnDef::new(Event::CreatedBy).string_len(32))
                    .col(ColumnDef::new(Event::ClubCode).string_len(32))
                    .col(
                        ColumnDef::new(Event::IsCampusWide)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Event::IsPublished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Event::PublishAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Event::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Event::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_creator")
                            .from(Event::Table, Event::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_club")
                            .from(Event::Table, Event::ClubCode)
                            .to(Club::Table, Club::Code)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Index on start_time for upcoming listings
        manager
            .create_index(
                Index::create()
                    .name("idx_event_start_time")
                    .table(Event::Table)
                    .col(Event::StartTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_club_code")
                    .table(Event::Table)
                    .col(Event::ClubCode)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_created_by")
                    .table(Event::Table)
                    .col(Event::CreatedBy)
                    .to_owned(),
            )
            .await?;

        // Create event_audience table
        manager
            .create_table(
                Table::create()
                    .table(EventAudience::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventAudience::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EventAudience::EventId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventAudience::ClubCode)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventAudience::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_audience_event")
                            .from(EventAudience::Table, EventAudience::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_audience_club")
                            .from(EventAudience::Table, EventAudience::ClubCode)
                            .to(Club::Table, Club::Code)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_audience_event_id")
                    .table(EventAudience::Table)
                    .col(EventAudience::EventId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_audience_club_code")
                    .table(EventAudience::Table)
                    .col(EventAudience::ClubCode)
                    .to_owned(),
            )
            .await?;

        // Unique constraint on (event_id, club_code)
        manager
            .create_index(
                Index::create()
                    .name("idx_event_audience_unique")
                    .table(EventAudience::Table)
                    .col(EventAudience::EventId)
                    .col(EventAudience::ClubCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventAudience::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Event::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Event {
    Table,
    Id,
    Title,
    Description,
    Location,
    StartTime,
    EndTime,
    Capacity,
    CoverImageUrl,
    CreatedBy,
    ClubCode,
    IsCampusWide,
    IsPublished,
    PublishAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum EventAudience {
    Table,
    Id,
    EventId,
    ClubCode,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum Club {
    Table,
    Code,
}
