pub use sea_orm_migration::prelude::*;

mod m20260815_000001_create_routes;
mod m20260815_000002_create_ferries;
mod m20260815_000003_create_schedules;
mod m20260815_000004_create_sailing_dates;
mod m20260815_000005_create_bookings;
mod m20260815_000006_create_tickets;
mod m20260815_000007_create_vehicles;
mod m20260815_000008_create_booking_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260815_000001_create_routes::Migration),
            Box::new(m20260815_000002_create_ferries::Migration),
            Box::new(m20260815_000003_create_schedules::Migration),
            Box::new(m20260815_000004_create_sailing_dates::Migration),
            Box::new(m20260815_000005_create_bookings::Migration),
            Box::new(m20260815_000006_create_tickets::Migration),
            Box::new(m20260815_000007_create_vehicles::Migration),
            Box::new(m20260815_000008_create_booking_logs::Migration),
        ]
    }
}
