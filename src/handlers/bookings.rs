use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::booking::{self, BookingChannel, BookingStatus};
use crate::entities::vehicle::VehicleType;
use crate::entities::{booking_log, ticket, vehicle};
use crate::error::{AppError, AppResult};
use crate::lifecycle::{self, NewBooking, VehicleRequest};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct VehicleDto {
    pub vehicle_type: VehicleType,
    pub category: String,
    pub license_plate: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub sailing_date_id: Uuid,
    pub passenger_count: i32,
    pub passengers: Vec<String>,
    #[serde(default)]
    pub vehicles: Vec<VehicleDto>,
    pub channel: BookingChannel,
    pub customer_name: String,
    pub customer_contact: Option<String>,
    pub total_amount: i64,
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub booking_code: String,
    pub sailing_date_id: Uuid,
    pub passenger_count: i32,
    pub status: BookingStatus,
    pub channel: BookingChannel,
    pub total_amount: i64,
    pub customer_name: String,
    pub customer_contact: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<booking::Model> for BookingResponse {
    fn from(b: booking::Model) -> Self {
        Self {
            id: b.id,
            booking_code: b.booking_code,
            sailing_date_id: b.sailing_date_id,
            passenger_count: b.passenger_count,
            status: b.status,
            channel: b.channel,
            total_amount: b.total_amount,
            customer_name: b.customer_name,
            customer_contact: b.customer_contact,
            created_at: b.created_at.with_timezone(&Utc),
        }
    }
}

/// Create a booking. Fails whole with the per-resource shortfall when
/// the sailing cannot take the load; no partial booking is ever left
/// behind.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<BookingResponse>> {
    if payload.passenger_count != payload.passengers.len() as i32 {
        return Err(AppError::BadRequest(
            "Passenger list does not match passenger count".to_string(),
        ));
    }
    if payload.total_amount < 0 {
        return Err(AppError::BadRequest(
            "Total amount must not be negative".to_string(),
        ));
    }

    let changed_by = match payload.channel {
        BookingChannel::Counter => "counter",
        BookingChannel::Online => "online",
    };

    let booking = lifecycle::create(
        &state.db,
        NewBooking {
            sailing_date_id: payload.sailing_date_id,
            channel: payload.channel,
            customer_name: payload.customer_name,
            customer_contact: payload.customer_contact,
            total_amount: payload.total_amount,
            passengers: payload.passengers,
            vehicles: payload
                .vehicles
                .into_iter()
                .map(|v| VehicleRequest {
                    vehicle_type: v.vehicle_type,
                    category: v.category,
                    license_plate: v.license_plate,
                })
                .collect(),
        },
        changed_by,
    )
    .await?;

    Ok(Json(booking.into()))
}

/// List all bookings
pub async fn list_bookings(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<BookingResponse>>> {
    let bookings = booking::Entity::find()
        .order_by_desc(booking::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Serialize)]
pub struct TicketInfo {
    pub id: Uuid,
    pub passenger_name: String,
}

#[derive(Debug, Serialize)]
pub struct VehicleInfo {
    pub id: Uuid,
    pub vehicle_type: VehicleType,
    pub category: String,
    pub license_plate: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LogInfo {
    pub previous_status: Option<BookingStatus>,
    pub new_status: BookingStatus,
    pub changed_by: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BookingDetailResponse {
    #[serde(flatten)]
    pub booking: BookingResponse,
    pub tickets: Vec<TicketInfo>,
    pub vehicles: Vec<VehicleInfo>,
    pub logs: Vec<LogInfo>,
}

/// Get a booking with its tickets, vehicles, and audit trail
pub async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> AppResult<Json<BookingDetailResponse>> {
    let b = booking::Entity::find_by_id(booking_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    let tickets = ticket::Entity::find()
        .filter(ticket::Column::BookingId.eq(booking_id))
        .all(&state.db)
        .await?;

    let vehicles = vehicle::Entity::find()
        .filter(vehicle::Column::BookingId.eq(booking_id))
        .all(&state.db)
        .await?;

    let logs = booking_log::Entity::find()
        .filter(booking_log::Column::BookingId.eq(booking_id))
        .order_by_asc(booking_log::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(BookingDetailResponse {
        booking: b.into(),
        tickets: tickets
            .into_iter()
            .map(|t| TicketInfo {
                id: t.id,
                passenger_name: t.passenger_name,
            })
            .collect(),
        vehicles: vehicles
            .into_iter()
            .map(|v| VehicleInfo {
                id: v.id,
                vehicle_type: v.vehicle_type,
                category: v.category,
                license_plate: v.license_plate,
            })
            .collect(),
        logs: logs
            .into_iter()
            .map(|l| LogInfo {
                previous_status: l.previous_status,
                new_status: l.new_status,
                changed_by: l.changed_by,
                notes: l.notes,
                created_at: l.created_at.with_timezone(&Utc),
            })
            .collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub new_status: BookingStatus,
    pub changed_by: String,
    pub notes: Option<String>,
}

/// Apply a status transition to a booking
pub async fn update_status(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<Json<BookingResponse>> {
    let updated = lifecycle::update_status(
        &state.db,
        booking_id,
        payload.new_status,
        &payload.changed_by,
        payload.notes,
    )
    .await?;

    Ok(Json(updated.into()))
}

#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub sailing_date_id: Uuid,
    pub changed_by: String,
}

/// Move a booking to another sailing date
pub async fn reschedule(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<RescheduleRequest>,
) -> AppResult<Json<BookingResponse>> {
    let updated = lifecycle::reschedule(
        &state.db,
        booking_id,
        payload.sailing_date_id,
        &payload.changed_by,
    )
    .await?;

    Ok(Json(updated.into()))
}
