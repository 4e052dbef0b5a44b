use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::availability::{self, AnnotatedSailing};
use crate::entities::route;
use crate::entities::sailing_date::SailingStatus;
use crate::error::{AppError, AppResult};
use crate::ledger::ResourceCounts;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub route_id: Uuid,
    pub date: NaiveDate,
    pub passenger_count: i32,
    #[serde(default)]
    pub motorcycle_count: i32,
    #[serde(default)]
    pub car_count: i32,
    #[serde(default)]
    pub bus_count: i32,
    #[serde(default)]
    pub truck_count: i32,
}

impl SearchParams {
    fn requested(&self) -> AppResult<ResourceCounts> {
        if self.passenger_count < 1 {
            return Err(AppError::BadRequest(
                "At least one passenger is required".to_string(),
            ));
        }
        if self.motorcycle_count < 0
            || self.car_count < 0
            || self.bus_count < 0
            || self.truck_count < 0
        {
            return Err(AppError::BadRequest(
                "Vehicle counts must not be negative".to_string(),
            ));
        }
        Ok(ResourceCounts {
            passenger: self.passenger_count,
            motorcycle: self.motorcycle_count,
            car: self.car_count,
            bus: self.bus_count,
            truck: self.truck_count,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct SailingResponse {
    pub sailing_date_id: Uuid,
    pub schedule_id: Uuid,
    pub sailing_date: NaiveDate,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub route_code: String,
    pub origin: String,
    pub destination: String,
    pub ferry_name: String,
    pub status: SailingStatus,
    pub available_passenger: i32,
    pub available_motorcycle: i32,
    pub available_car: i32,
    pub available_bus: i32,
    pub available_truck: i32,
    pub is_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

fn to_response(annotated: AnnotatedSailing, rte: &route::Model) -> SailingResponse {
    SailingResponse {
        sailing_date_id: annotated.sailing.id,
        schedule_id: annotated.schedule.id,
        sailing_date: annotated.sailing.sailing_date,
        departure_time: annotated.schedule.departure_time,
        arrival_time: annotated.schedule.arrival_time,
        route_code: rte.route_code.clone(),
        origin: rte.origin.clone(),
        destination: rte.destination.clone(),
        ferry_name: annotated.ferry.name.clone(),
        status: annotated.sailing.status,
        available_passenger: annotated.available.passenger,
        available_motorcycle: annotated.available.motorcycle,
        available_car: annotated.available.car,
        available_bus: annotated.available.bus,
        available_truck: annotated.available.truck,
        is_available: annotated.is_available,
        reason: annotated.reason,
    }
}

async fn load_route(state: &AppState, route_id: Uuid) -> AppResult<route::Model> {
    route::Entity::find_by_id(route_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Route not found".to_string()))
}

/// Search sailings for a route and date. Sailings without enough room
/// are still listed, annotated with the reason, so the caller can show
/// why a departure cannot be booked.
pub async fn search_schedules(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<SailingResponse>>> {
    let requested = params.requested()?;
    let rte = load_route(&state, params.route_id).await?;

    let results = availability::search(&state.db, params.route_id, params.date, requested).await?;

    Ok(Json(
        results.into_iter().map(|a| to_response(a, &rte)).collect(),
    ))
}

#[derive(Debug, Serialize)]
pub struct NearestResponse {
    pub nearest_date: NaiveDate,
    pub nearest_schedules: Vec<SailingResponse>,
}

/// Find the first date after the requested one, within a fixed 7-day
/// window, that has at least one sailing able to take the whole request.
pub async fn search_nearest(
    State(state): State<AppState>,
    Json(params): Json<SearchParams>,
) -> AppResult<Json<NearestResponse>> {
    let requested = params.requested()?;
    let rte = load_route(&state, params.route_id).await?;

    let (nearest_date, results) =
        availability::find_nearest(&state.db, params.route_id, params.date, requested)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No available sailing within {} days after {}",
                    availability::NEAREST_WINDOW_DAYS,
                    params.date
                ))
            })?;

    Ok(Json(NearestResponse {
        nearest_date,
        nearest_schedules: results.into_iter().map(|a| to_response(a, &rte)).collect(),
    }))
}

/// List all routes (reference data for the search form)
pub async fn list_routes(State(state): State<AppState>) -> AppResult<Json<Vec<route::Model>>> {
    let routes = route::Entity::find().all(&state.db).await?;
    Ok(Json(routes))
}
