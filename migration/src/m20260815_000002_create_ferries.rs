use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ferry::Table)
                    .if_not_exists()
                    .col(uuid(Ferry::Id).primary_key())
                    .col(string_len(Ferry::Name, 100).not_null())
                    .col(
                        string_len(Ferry::RegistrationNumber, 50)
                            .not_null()
                            .unique_key(),
                    )
                    .col(integer(Ferry::CapacityPassenger).not_null())
                    .col(integer(Ferry::CapacityMotorcycle).not_null())
                    .col(integer(Ferry::CapacityCar).not_null())
                    .col(integer(Ferry::CapacityBus).not_null())
                    .col(integer(Ferry::CapacityTruck).not_null())
                    .col(
                        timestamp_with_time_zone(Ferry::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ferry::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Ferry {
    Table,
    Id,
    Name,
    RegistrationNumber,
    CapacityPassenger,
    CapacityMotorcycle,
    CapacityCar,
    CapacityBus,
    CapacityTruck,
    CreatedAt,
}
