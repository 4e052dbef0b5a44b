use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20260815_000005_create_bookings::Booking;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create vehicle type enum
        manager
            .create_type(
                Type::create()
                    .as_enum(VehicleType::Enum)
                    .values([
                        VehicleType::Motorcycle,
                        VehicleType::Car,
                        VehicleType::Bus,
                        VehicleType::Truck,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Vehicle::Table)
                    .if_not_exists()
                    .col(uuid(Vehicle::Id).primary_key())
                    .col(uuid(Vehicle::BookingId).not_null())
                    .col(
                        ColumnDef::new(Vehicle::VehicleType)
                            .custom(VehicleType::Enum)
                            .not_null(),
                    )
                    .col(string_len(Vehicle::Category, 50).not_null())
                    .col(string_len_null(Vehicle::LicensePlate, 20))
                    .col(
                        timestamp_with_time_zone(Vehicle::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_booking")
                            .from(Vehicle::Table, Vehicle::BookingId)
                            .to(Booking::Table, Booking::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vehicle::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(VehicleType::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Vehicle {
    Table,
    Id,
    BookingId,
    VehicleType,
    Category,
    LicensePlate,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum VehicleType {
    #[sea_orm(iden = "vehicle_type")]
    Enum,
    #[sea_orm(iden = "motorcycle")]
    Motorcycle,
    #[sea_orm(iden = "car")]
    Car,
    #[sea_orm(iden = "bus")]
    Bus,
    #[sea_orm(iden = "truck")]
    Truck,
}
