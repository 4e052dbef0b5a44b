use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog;
use crate::entities::booking;
use crate::entities::sailing_date::{self, SailingStatus};
use crate::entities::schedule::{self, ScheduleStatus};
use crate::entities::{ferry, route};
use crate::error::{AppError, AppResult};
use crate::ledger::ResourceCounts;
use crate::lifecycle;
use crate::AppState;

// ============ Route Management ============

#[derive(Debug, Deserialize)]
pub struct CreateRouteRequest {
    pub origin: String,
    pub destination: String,
    pub route_code: String,
    pub duration_minutes: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRouteRequest {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub route_code: Option<String>,
    pub duration_minutes: Option<i32>,
}

/// List all routes (admin)
pub async fn list_routes(State(state): State<AppState>) -> AppResult<Json<Vec<route::Model>>> {
    let routes = route::Entity::find().all(&state.db).await?;
    Ok(Json(routes))
}

/// Create a route (admin)
pub async fn create_route(
    State(state): State<AppState>,
    Json(payload): Json<CreateRouteRequest>,
) -> AppResult<Json<route::Model>> {
    if payload.duration_minutes <= 0 {
        return Err(AppError::BadRequest(
            "Duration must be positive".to_string(),
        ));
    }

    let existing = route::Entity::find()
        .filter(route::Column::RouteCode.eq(&payload.route_code))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Route code already in use".to_string()));
    }

    let new_route = route::ActiveModel {
        id: Set(Uuid::new_v4()),
        origin: Set(payload.origin),
        destination: Set(payload.destination),
        route_code: Set(payload.route_code),
        duration_minutes: Set(payload.duration_minutes),
        ..Default::default()
    };

    let result = new_route.insert(&state.db).await?;
    Ok(Json(result))
}

/// Update a route (admin)
pub async fn update_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRouteRequest>,
) -> AppResult<Json<route::Model>> {
    let rte = route::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Route not found".to_string()))?;

    let mut active: route::ActiveModel = rte.into();

    if let Some(origin) = payload.origin {
        active.origin = Set(origin);
    }
    if let Some(destination) = payload.destination {
        active.destination = Set(destination);
    }
    if let Some(code) = payload.route_code {
        active.route_code = Set(code);
    }
    if let Some(minutes) = payload.duration_minutes {
        if minutes <= 0 {
            return Err(AppError::BadRequest(
                "Duration must be positive".to_string(),
            ));
        }
        active.duration_minutes = Set(minutes);
    }

    let result = active.update(&state.db).await?;
    Ok(Json(result))
}

/// Delete a route (admin)
pub async fn delete_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let in_use = schedule::Entity::find()
        .filter(schedule::Column::RouteId.eq(id))
        .one(&state.db)
        .await?;
    if in_use.is_some() {
        return Err(AppError::Conflict(
            "Route has schedules and cannot be deleted".to_string(),
        ));
    }

    let result = route::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Route not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Route deleted" })))
}

// ============ Ferry Management ============

#[derive(Debug, Deserialize)]
pub struct CreateFerryRequest {
    pub name: String,
    pub registration_number: String,
    pub capacity_passenger: i32,
    pub capacity_motorcycle: i32,
    pub capacity_car: i32,
    pub capacity_bus: i32,
    pub capacity_truck: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFerryRequest {
    pub name: Option<String>,
    pub capacity_passenger: Option<i32>,
    pub capacity_motorcycle: Option<i32>,
    pub capacity_car: Option<i32>,
    pub capacity_bus: Option<i32>,
    pub capacity_truck: Option<i32>,
}

/// List all ferries (admin)
pub async fn list_ferries(State(state): State<AppState>) -> AppResult<Json<Vec<ferry::Model>>> {
    let ferries = ferry::Entity::find().all(&state.db).await?;
    Ok(Json(ferries))
}

/// Create a ferry (admin)
pub async fn create_ferry(
    State(state): State<AppState>,
    Json(payload): Json<CreateFerryRequest>,
) -> AppResult<Json<ferry::Model>> {
    let caps = [
        payload.capacity_passenger,
        payload.capacity_motorcycle,
        payload.capacity_car,
        payload.capacity_bus,
        payload.capacity_truck,
    ];
    if caps.iter().any(|&c| c < 0) {
        return Err(AppError::BadRequest(
            "Capacities must not be negative".to_string(),
        ));
    }
    if payload.capacity_passenger == 0 {
        return Err(AppError::BadRequest(
            "Passenger capacity must be positive".to_string(),
        ));
    }

    let existing = ferry::Entity::find()
        .filter(ferry::Column::RegistrationNumber.eq(&payload.registration_number))
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "Registration number already in use".to_string(),
        ));
    }

    let new_ferry = ferry::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        registration_number: Set(payload.registration_number),
        capacity_passenger: Set(payload.capacity_passenger),
        capacity_motorcycle: Set(payload.capacity_motorcycle),
        capacity_car: Set(payload.capacity_car),
        capacity_bus: Set(payload.capacity_bus),
        capacity_truck: Set(payload.capacity_truck),
        ..Default::default()
    };

    let result = new_ferry.insert(&state.db).await?;
    Ok(Json(result))
}

/// The highest committed counters across the ferry's upcoming sailings.
/// A capacity edit may never shrink a resource below these.
async fn committed_counts(state: &AppState, ferry_id: Uuid) -> AppResult<ResourceCounts> {
    let schedule_ids: Vec<Uuid> = schedule::Entity::find()
        .filter(schedule::Column::FerryId.eq(ferry_id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|s| s.id)
        .collect();

    let today = Utc::now().date_naive();
    let sailings = sailing_date::Entity::find()
        .filter(sailing_date::Column::ScheduleId.is_in(schedule_ids))
        .filter(sailing_date::Column::SailingDate.gte(today))
        .filter(sailing_date::Column::Status.ne(SailingStatus::Departed))
        .all(&state.db)
        .await?;

    let mut max = ResourceCounts::default();
    for sd in &sailings {
        max.passenger = max.passenger.max(sd.passenger_count);
        max.motorcycle = max.motorcycle.max(sd.motorcycle_count);
        max.car = max.car.max(sd.car_count);
        max.bus = max.bus.max(sd.bus_count);
        max.truck = max.truck.max(sd.truck_count);
    }
    Ok(max)
}

/// Update a ferry (admin). Capacity edits are rejected when they would
/// drop a resource below what upcoming sailings have already sold.
pub async fn update_ferry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFerryRequest>,
) -> AppResult<Json<ferry::Model>> {
    let f = ferry::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Ferry not found".to_string()))?;

    let committed = committed_counts(&state, id).await?;
    let checks = [
        ("passenger", payload.capacity_passenger, committed.passenger),
        (
            "motorcycle",
            payload.capacity_motorcycle,
            committed.motorcycle,
        ),
        ("car", payload.capacity_car, committed.car),
        ("bus", payload.capacity_bus, committed.bus),
        ("truck", payload.capacity_truck, committed.truck),
    ];
    for (resource, new_cap, sold) in checks {
        if let Some(cap) = new_cap {
            if cap < 0 {
                return Err(AppError::BadRequest(
                    "Capacities must not be negative".to_string(),
                ));
            }
            if cap < sold {
                return Err(AppError::Conflict(format!(
                    "Cannot shrink {} capacity to {}: {} already booked on an upcoming sailing",
                    resource, cap, sold
                )));
            }
        }
    }

    let mut active: ferry::ActiveModel = f.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(cap) = payload.capacity_passenger {
        active.capacity_passenger = Set(cap);
    }
    if let Some(cap) = payload.capacity_motorcycle {
        active.capacity_motorcycle = Set(cap);
    }
    if let Some(cap) = payload.capacity_car {
        active.capacity_car = Set(cap);
    }
    if let Some(cap) = payload.capacity_bus {
        active.capacity_bus = Set(cap);
    }
    if let Some(cap) = payload.capacity_truck {
        active.capacity_truck = Set(cap);
    }

    let result = active.update(&state.db).await?;
    Ok(Json(result))
}

/// Delete a ferry (admin)
pub async fn delete_ferry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let in_use = schedule::Entity::find()
        .filter(schedule::Column::FerryId.eq(id))
        .one(&state.db)
        .await?;
    if in_use.is_some() {
        return Err(AppError::Conflict(
            "Ferry has schedules and cannot be deleted".to_string(),
        ));
    }

    let result = ferry::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Ferry not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Ferry deleted" })))
}

// ============ Schedule Management ============

#[derive(Debug, Deserialize)]
pub struct CreateScheduleRequest {
    pub route_id: Uuid,
    pub ferry_id: Uuid,
    pub departure_time: NaiveTime,
    pub arrival_time: NaiveTime,
    pub recurrence_days: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateScheduleRequest {
    pub departure_time: Option<NaiveTime>,
    pub arrival_time: Option<NaiveTime>,
    pub recurrence_days: Option<i32>,
    pub status: Option<ScheduleStatus>,
    pub status_reason: Option<String>,
}

fn validate_recurrence(mask: i32) -> AppResult<()> {
    if mask <= 0 || mask > catalog::FULL_WEEK {
        return Err(AppError::BadRequest(
            "Recurrence days must set at least one weekday (bit 0 = Monday .. bit 6 = Sunday)"
                .to_string(),
        ));
    }
    Ok(())
}

/// List all schedules (admin)
pub async fn list_schedules(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<schedule::Model>>> {
    let schedules = schedule::Entity::find().all(&state.db).await?;
    Ok(Json(schedules))
}

/// Create a schedule (admin)
pub async fn create_schedule(
    State(state): State<AppState>,
    Json(payload): Json<CreateScheduleRequest>,
) -> AppResult<Json<schedule::Model>> {
    validate_recurrence(payload.recurrence_days)?;

    route::Entity::find_by_id(payload.route_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid route".to_string()))?;

    ferry::Entity::find_by_id(payload.ferry_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid ferry".to_string()))?;

    let new_schedule = schedule::ActiveModel {
        id: Set(Uuid::new_v4()),
        route_id: Set(payload.route_id),
        ferry_id: Set(payload.ferry_id),
        departure_time: Set(payload.departure_time),
        arrival_time: Set(payload.arrival_time),
        recurrence_days: Set(payload.recurrence_days),
        status: Set(ScheduleStatus::Active),
        status_reason: Set(None),
        ..Default::default()
    };

    let result = new_schedule.insert(&state.db).await?;
    Ok(Json(result))
}

/// Update a schedule (admin). Deactivating or cancelling cascades to
/// future sailing dates; past dates keep their history.
pub async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateScheduleRequest>,
) -> AppResult<Json<schedule::Model>> {
    let sched = schedule::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))?;

    let old_status = sched.status;
    let mut active: schedule::ActiveModel = sched.into();

    if let Some(time) = payload.departure_time {
        active.departure_time = Set(time);
    }
    if let Some(time) = payload.arrival_time {
        active.arrival_time = Set(time);
    }
    if let Some(mask) = payload.recurrence_days {
        validate_recurrence(mask)?;
        active.recurrence_days = Set(mask);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
        active.status_reason = Set(payload.status_reason.clone());
    }

    let result = active.update(&state.db).await?;

    if let Some(status) = payload.status {
        if status != old_status {
            catalog::cascade_schedule_status(&state.db, id, status, payload.status_reason).await?;
        }
    }

    Ok(Json(result))
}

/// Delete a schedule and its sailing dates (admin)
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let sailing_ids: Vec<Uuid> = sailing_date::Entity::find()
        .filter(sailing_date::Column::ScheduleId.eq(id))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|sd| sd.id)
        .collect();

    // Cancelled and refunded bookings keep their rows, and the FK
    // restricts the delete, so any booking row blocks removal.
    let held = booking::Entity::find()
        .filter(booking::Column::SailingDateId.is_in(sailing_ids))
        .one(&state.db)
        .await?;
    if held.is_some() {
        return Err(AppError::Conflict(
            "Schedule has sailing dates with booking records".to_string(),
        ));
    }

    let result = schedule::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Schedule not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Schedule deleted" })))
}

// ============ Sailing Date Administration ============

#[derive(Debug, Deserialize)]
pub struct CreateSailingDatesRequest {
    /// Single date, mutually exclusive with the range below.
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<SailingStatus>,
    pub status_reason: Option<String>,
    pub status_expiry: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct MaterializeResponse {
    pub created: usize,
    pub sailing_dates: Vec<sailing_date::Model>,
}

/// Create sailing dates for a schedule (admin). A range is filtered to
/// the schedule's recurrence days; a single explicit date is created as
/// asked. Existing dates are skipped, never duplicated.
pub async fn create_sailing_dates(
    State(state): State<AppState>,
    Path(schedule_id): Path<Uuid>,
    Json(payload): Json<CreateSailingDatesRequest>,
) -> AppResult<Json<MaterializeResponse>> {
    let sched = schedule::Entity::find_by_id(schedule_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))?;

    let dates = match (payload.date, payload.start_date, payload.end_date) {
        (Some(date), None, None) => vec![date],
        (None, Some(start), Some(end)) => {
            if start > end {
                return Err(AppError::BadRequest(
                    "Start date must not be after end date".to_string(),
                ));
            }
            catalog::expand_range(start, end, sched.recurrence_days)
        }
        _ => {
            return Err(AppError::BadRequest(
                "Provide either a date or a start_date/end_date range".to_string(),
            ));
        }
    };

    let status = payload.status.unwrap_or(SailingStatus::Active);
    let (reason, expiry) = if status == SailingStatus::Active {
        (None, None)
    } else {
        (payload.status_reason, payload.status_expiry.map(Into::into))
    };

    let created = catalog::materialize(&state.db, &sched, &dates, status, reason, expiry).await?;

    Ok(Json(MaterializeResponse {
        created: created.len(),
        sailing_dates: created,
    }))
}

/// List sailing dates for a schedule (admin)
pub async fn list_sailing_dates(
    State(state): State<AppState>,
    Path(schedule_id): Path<Uuid>,
) -> AppResult<Json<Vec<sailing_date::Model>>> {
    schedule::Entity::find_by_id(schedule_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))?;

    let rows = sailing_date::Entity::find()
        .filter(sailing_date::Column::ScheduleId.eq(schedule_id))
        .order_by_asc(sailing_date::Column::SailingDate)
        .all(&state.db)
        .await?;

    let mut results = Vec::with_capacity(rows.len());
    for row in rows {
        results.push(catalog::revert_if_expired(&state.db, row).await?);
    }

    Ok(Json(results))
}

#[derive(Debug, Deserialize)]
pub struct UpdateSailingDateRequest {
    pub status: Option<SailingStatus>,
    pub status_reason: Option<String>,
    pub status_expiry: Option<DateTime<Utc>>,
}

/// Edit a sailing date's status (admin). Setting ACTIVE clears the
/// override and re-derives FULL from the counters, so an operator cannot
/// accidentally reopen a sold-out sailing.
pub async fn update_sailing_date(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSailingDateRequest>,
) -> AppResult<Json<sailing_date::Model>> {
    let sd = sailing_date::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sailing date not found".to_string()))?;

    let sched = schedule::Entity::find_by_id(sd.schedule_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))?;
    let f = ferry::Entity::find_by_id(sched.ferry_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Internal("Ferry missing for schedule".to_string()))?;

    let used = ResourceCounts::of_sailing(&sd);
    let capacity = ResourceCounts::of_ferry(&f);

    let mut active: sailing_date::ActiveModel = sd.into();
    if let Some(status) = payload.status {
        if status == SailingStatus::Active || status == SailingStatus::Full {
            active.status = Set(catalog::restored_status(used, capacity));
            active.status_reason = Set(None);
            active.status_expiry = Set(None);
        } else {
            active.status = Set(status);
            active.status_reason = Set(payload.status_reason);
            active.status_expiry = Set(payload.status_expiry.map(Into::into));
        }
    } else {
        if let Some(reason) = payload.status_reason {
            active.status_reason = Set(Some(reason));
        }
        if let Some(expiry) = payload.status_expiry {
            active.status_expiry = Set(Some(expiry.into()));
        }
    }

    let result = active.update(&state.db).await?;
    Ok(Json(result))
}

/// Delete a sailing date (admin). Refused while any booking row still
/// references it, including cancelled and refunded ones kept for audit.
pub async fn delete_sailing_date(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    if lifecycle::has_bookings(&state.db, id).await? {
        return Err(AppError::Conflict(
            "Sailing date has booking records".to_string(),
        ));
    }

    let result = sailing_date::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Sailing date not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "message": "Sailing date deleted" })))
}
