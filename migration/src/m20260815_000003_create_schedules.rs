use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20260815_000001_create_routes::Route;
use super::m20260815_000002_create_ferries::Ferry;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create schedule status enum
        manager
            .create_type(
                Type::create()
                    .as_enum(ScheduleStatus::Enum)
                    .values([
                        ScheduleStatus::Active,
                        ScheduleStatus::Inactive,
                        ScheduleStatus::Cancelled,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Schedule::Table)
                    .if_not_exists()
                    .col(uuid(Schedule::Id).primary_key())
                    .col(uuid(Schedule::RouteId).not_null())
                    .col(uuid(Schedule::FerryId).not_null())
                    .col(time(Schedule::DepartureTime).not_null())
                    .col(time(Schedule::ArrivalTime).not_null())
                    .col(integer(Schedule::RecurrenceDays).not_null())
                    .col(
                        ColumnDef::new(Schedule::Status)
                            .custom(ScheduleStatus::Enum)
                            .not_null(),
                    )
                    .col(string_len_null(Schedule::StatusReason, 255))
                    .col(
                        timestamp_with_time_zone(Schedule::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedule_route")
                            .from(Schedule::Table, Schedule::RouteId)
                            .to(Route::Table, Route::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_schedule_ferry")
                            .from(Schedule::Table, Schedule::FerryId)
                            .to(Ferry::Table, Ferry::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Schedule::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(ScheduleStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Schedule {
    Table,
    Id,
    RouteId,
    FerryId,
    DepartureTime,
    ArrivalTime,
    RecurrenceDays,
    Status,
    StatusReason,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum ScheduleStatus {
    #[sea_orm(iden = "schedule_status")]
    Enum,
    #[sea_orm(iden = "active")]
    Active,
    #[sea_orm(iden = "inactive")]
    Inactive,
    #[sea_orm(iden = "cancelled")]
    Cancelled,
}
