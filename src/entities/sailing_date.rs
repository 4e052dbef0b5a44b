use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "sailing_status")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SailingStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "full")]
    Full,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "departed")]
    Departed,
    #[sea_orm(string_value = "weather_issue")]
    WeatherIssue,
}

impl SailingStatus {
    /// Statuses set by an operator, never overwritten by counter arithmetic.
    pub fn is_override(self) -> bool {
        matches!(
            self,
            SailingStatus::Inactive
                | SailingStatus::Cancelled
                | SailingStatus::Departed
                | SailingStatus::WeatherIssue
        )
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sailing_date")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub sailing_date: Date,
    pub status: SailingStatus,
    pub status_reason: Option<String>,
    pub status_expiry: Option<DateTimeWithTimeZone>,
    pub passenger_count: i32,
    pub motorcycle_count: i32,
    pub car_count: i32,
    pub bus_count: i32,
    pub truck_count: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::schedule::Entity",
        from = "Column::ScheduleId",
        to = "super::schedule::Column::Id"
    )]
    Schedule,
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
}

impl Related<super::schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedule.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
