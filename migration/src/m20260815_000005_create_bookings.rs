use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20260815_000004_create_sailing_dates::SailingDate;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create booking status enum
        manager
            .create_type(
                Type::create()
                    .as_enum(BookingStatus::Enum)
                    .values([
                        BookingStatus::Pending,
                        BookingStatus::Confirmed,
                        BookingStatus::Completed,
                        BookingStatus::Cancelled,
                        BookingStatus::Refunded,
                    ])
                    .to_owned(),
            )
            .await?;

        // Create booking channel enum
        manager
            .create_type(
                Type::create()
                    .as_enum(BookingChannel::Enum)
                    .values([BookingChannel::Counter, BookingChannel::Online])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(uuid(Booking::Id).primary_key())
                    .col(
                        string_len(Booking::BookingCode, 20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(uuid(Booking::SailingDateId).not_null())
                    .col(integer(Booking::PassengerCount).not_null())
                    .col(
                        ColumnDef::new(Booking::Status)
                            .custom(BookingStatus::Enum)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Booking::Channel)
                            .custom(BookingChannel::Enum)
                            .not_null(),
                    )
                    .col(big_integer(Booking::TotalAmount).not_null())
                    .col(string_len(Booking::CustomerName, 100).not_null())
                    .col(string_len_null(Booking::CustomerContact, 100))
                    .col(
                        timestamp_with_time_zone(Booking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_sailing_date")
                            .from(Booking::Table, Booking::SailingDateId)
                            .to(SailingDate::Table, SailingDate::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Booking::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(BookingChannel::Enum).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(BookingStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Booking {
    Table,
    Id,
    BookingCode,
    SailingDateId,
    PassengerCount,
    Status,
    Channel,
    TotalAmount,
    CustomerName,
    CustomerContact,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum BookingStatus {
    #[sea_orm(iden = "booking_status")]
    Enum,
    #[sea_orm(iden = "pending")]
    Pending,
    #[sea_orm(iden = "confirmed")]
    Confirmed,
    #[sea_orm(iden = "completed")]
    Completed,
    #[sea_orm(iden = "cancelled")]
    Cancelled,
    #[sea_orm(iden = "refunded")]
    Refunded,
}

#[derive(DeriveIden)]
pub enum BookingChannel {
    #[sea_orm(iden = "booking_channel")]
    Enum,
    #[sea_orm(iden = "counter")]
    Counter,
    #[sea_orm(iden = "online")]
    Online,
}
