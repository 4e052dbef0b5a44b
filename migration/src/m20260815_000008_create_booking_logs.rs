use sea_orm_migration::{prelude::*, schema::*};

use super::m20260815_000005_create_bookings::{Booking, BookingStatus};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BookingLog::Table)
                    .if_not_exists()
                    .col(uuid(BookingLog::Id).primary_key())
                    .col(uuid(BookingLog::BookingId).not_null())
                    .col(
                        ColumnDef::new(BookingLog::PreviousStatus)
                            .custom(BookingStatus::Enum)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(BookingLog::NewStatus)
                            .custom(BookingStatus::Enum)
                            .not_null(),
                    )
                    .col(string_len(BookingLog::ChangedBy, 100).not_null())
                    .col(string_len_null(BookingLog::Notes, 255))
                    .col(
                        timestamp_with_time_zone(BookingLog::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_log_booking")
                            .from(BookingLog::Table, BookingLog::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BookingLog::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum BookingLog {
    Table,
    Id,
    BookingId,
    PreviousStatus,
    NewStatus,
    ChangedBy,
    Notes,
    CreatedAt,
}
