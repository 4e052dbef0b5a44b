use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20260815_000003_create_schedules::Schedule;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create sailing status enum
        manager
            .create_type(
                Type::create()
                    .as_enum(SailingStatus::Enum)
                    .values([
                        SailingStatus::Active,
                        SailingStatus::Inactive,
                        SailingStatus::Full,
                        SailingStatus::Cancelled,
                        SailingStatus::Departed,
                        SailingStatus::WeatherIssue,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SailingDate::Table)
                    .if_not_exists()
                    .col(uuid(SailingDate::Id).primary_key())
                    .col(uuid(SailingDate::ScheduleId).not_null())
                    .col(date(SailingDate::SailingDate).not_null())
                    .col(
                        ColumnDef::new(SailingDate::Status)
                            .custom(SailingStatus::Enum)
                            .not_null(),
                    )
                    .col(string_len_null(SailingDate::StatusReason, 255))
                    .col(timestamp_with_time_zone_null(SailingDate::StatusExpiry))
                    .col(integer(SailingDate::PassengerCount).not_null().default(0))
                    .col(integer(SailingDate::MotorcycleCount).not_null().default(0))
                    .col(integer(SailingDate::CarCount).not_null().default(0))
                    .col(integer(SailingDate::BusCount).not_null().default(0))
                    .col(integer(SailingDate::TruckCount).not_null().default(0))
                    .col(
                        timestamp_with_time_zone(SailingDate::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sailing_date_schedule")
                            .from(SailingDate::Table, SailingDate::ScheduleId)
                            .to(Schedule::Table, Schedule::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One sailing per schedule per calendar day
        manager
            .create_index(
                Index::create()
                    .name("ux_sailing_date_schedule_day")
                    .table(SailingDate::Table)
                    .col(SailingDate::ScheduleId)
                    .col(SailingDate::SailingDate)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SailingDate::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(SailingStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum SailingDate {
    Table,
    Id,
    ScheduleId,
    SailingDate,
    Status,
    StatusReason,
    StatusExpiry,
    PassengerCount,
    MotorcycleCount,
    CarCount,
    BusCount,
    TruckCount,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum SailingStatus {
    #[sea_orm(iden = "sailing_status")]
    Enum,
    #[sea_orm(iden = "active")]
    Active,
    #[sea_orm(iden = "inactive")]
    Inactive,
    #[sea_orm(iden = "full")]
    Full,
    #[sea_orm(iden = "cancelled")]
    Cancelled,
    #[sea_orm(iden = "departed")]
    Departed,
    #[sea_orm(iden = "weather_issue")]
    WeatherIssue,
}
