//! Create `event_rsvp` table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventRsvp::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventRsvp::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EventRsvp::EventId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EventRsvp::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(EventRsvp::Status).string_len(20).not_null())
                    .col(
                        ColumnDef::new(EventRsvp::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(EventRsvp::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_rsvp_event")
                            .from(EventRsvp::Table, EventRsvp::EventId)
                            .to(Event::Table, Event::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_rsvp_user")
                            .from(EventRsvp::Table, EventRsvp::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_rsvp_event_id")
                    .table(EventRsvp::Table)
                    .col(EventRsvp::EventId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_rsvp_user_id")
                    .table(EventRsvp::Table)
                    .col(EventRsvp::UserId)
                    .to_owned(),
            )
            .await?;

        // One answer per (event, user)
        manager
            .create_index(
                Index::create()
                    .name("idx_event_rsvp_unique")
                    .table(EventRsvp::Table)
                    .col(EventRsvp::EventId)
                    .col(EventRsvp::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EventRsvp::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EventRsvp {
    Table,
    Id,
    EventId,
    UserId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Event {
    Table,
    Id,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
