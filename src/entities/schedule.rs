use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "schedule_status")]
#[serde(rename_all = "UPPERCASE")]
pub enum ScheduleStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "schedule")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub route_id: Uuid,
    pub ferry_id: Uuid,
    pub departure_time: Time,
    pub arrival_time: Time,
    /// Bitmask of weekdays the ferry runs, bit 0 = Monday .. bit 6 = Sunday.
    pub recurrence_days: i32,
    pub status: ScheduleStatus,
    pub status_reason: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::route::Entity",
        from = "Column::RouteId",
        to = "super::route::Column::Id"
    )]
    Route,
    #[sea_orm(
        belongs_to = "super::ferry::Entity",
        from = "Column::FerryId",
        to = "super::ferry::Column::Id"
    )]
    Ferry,
    #[sea_orm(has_many = "super::sailing_date::Entity")]
    SailingDates,
}

impl Related<super::route::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Route.def()
    }
}

impl Related<super::ferry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ferry.def()
    }
}

impl Related<super::sailing_date::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SailingDates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
