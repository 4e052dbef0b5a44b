//! Booking lifecycle: the state machine and its coupling to the capacity
//! ledger. Every transition runs inside one transaction with the ledger
//! mutation it implies, so a booking can never hold tickets without a
//! reservation or the other way round.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::booking::{self, BookingChannel, BookingStatus};
use crate::entities::vehicle::{self, VehicleType};
use crate::entities::{booking_log, ticket};
use crate::error::{AppError, AppResult};
use crate::ledger::{self, ResourceCounts};
use crate::utils::code::booking_code;

/// Legal transitions. PENDING -> CONFIRMED -> COMPLETED is the happy
/// path; cancellation branches off every non-terminal state and REFUNDED
/// is only reachable from CANCELLED.
pub fn is_legal_transition(from: BookingStatus, to: BookingStatus) -> bool {
    use BookingStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed)
            | (Pending, Cancelled)
            | (Confirmed, Completed)
            | (Confirmed, Cancelled)
            | (Completed, Cancelled)
            | (Cancelled, Refunded)
    )
}

/// Whether a booking in this status still holds its reservation on the
/// sailing. Cancelled and refunded bookings have released theirs but
/// keep their rows for the audit trail.
pub fn holds_capacity(status: BookingStatus) -> bool {
    matches!(
        status,
        BookingStatus::Pending | BookingStatus::Confirmed | BookingStatus::Completed
    )
}

/// Capacity is reserved at create and released exactly once, on the
/// transition out of the capacity-holding statuses. With the transition
/// table above that is the step into CANCELLED; the later CANCELLED ->
/// REFUNDED step must not release again.
fn releases_capacity(from: BookingStatus, to: BookingStatus) -> bool {
    holds_capacity(from) && !holds_capacity(to)
}

#[derive(Debug, Clone)]
pub struct VehicleRequest {
    pub vehicle_type: VehicleType,
    pub category: String,
    pub license_plate: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub sailing_date_id: Uuid,
    pub channel: BookingChannel,
    pub customer_name: String,
    pub customer_contact: Option<String>,
    pub total_amount: i64,
    pub passengers: Vec<String>,
    pub vehicles: Vec<VehicleRequest>,
}

async fn append_log(
    txn: &DatabaseTransaction,
    booking_id: Uuid,
    previous: Option<BookingStatus>,
    new: BookingStatus,
    changed_by: &str,
    notes: Option<String>,
) -> AppResult<()> {
    let log = booking_log::ActiveModel {
        id: Set(Uuid::new_v4()),
        booking_id: Set(booking_id),
        previous_status: Set(previous),
        new_status: Set(new),
        changed_by: Set(changed_by.to_string()),
        notes: Set(notes),
        ..Default::default()
    };
    log.insert(txn).await?;
    Ok(())
}

/// The reservation delta a booking holds: its passenger count plus its
/// vehicles grouped by broad type. Reschedule reconstructs the delta the
/// same way, so reserve and release always match.
pub async fn booking_delta(
    txn: &DatabaseTransaction,
    booking: &booking::Model,
) -> AppResult<ResourceCounts> {
    let vehicles = vehicle::Entity::find()
        .filter(vehicle::Column::BookingId.eq(booking.id))
        .all(txn)
        .await?;

    Ok(ResourceCounts::for_booking(
        booking.passenger_count,
        vehicles.iter().map(|v| v.vehicle_type),
    ))
}

/// Create a booking: reserve capacity, then insert the booking, one
/// ticket per passenger, one vehicle row per requested vehicle, and the
/// opening audit entry, all in one transaction. Counter bookings start
/// CONFIRMED, self-service ones PENDING; either way the capacity is
/// taken now so the pending window cannot be double-booked.
pub async fn create(
    db: &DatabaseConnection,
    req: NewBooking,
    changed_by: &str,
) -> AppResult<booking::Model> {
    if req.passengers.is_empty() {
        return Err(AppError::BadRequest(
            "Booking must have at least one passenger".to_string(),
        ));
    }
    if req.passengers.iter().any(|name| name.trim().is_empty()) {
        return Err(AppError::BadRequest(
            "Passenger names must not be empty".to_string(),
        ));
    }
    if req.vehicles.iter().any(|v| v.category.trim().is_empty()) {
        return Err(AppError::BadRequest(
            "Vehicle category must not be empty".to_string(),
        ));
    }

    let delta = ResourceCounts::for_booking(
        req.passengers.len() as i32,
        req.vehicles.iter().map(|v| v.vehicle_type),
    );

    let txn = db.begin().await?;

    let sailing = ledger::lock(&txn, req.sailing_date_id).await?;
    if sailing.status.is_override() {
        return Err(AppError::Conflict(
            "Sailing is not accepting bookings".to_string(),
        ));
    }
    ledger::reserve_on(&txn, sailing, &delta).await?;

    let status = match req.channel {
        BookingChannel::Counter => BookingStatus::Confirmed,
        BookingChannel::Online => BookingStatus::Pending,
    };

    let booking_id = Uuid::new_v4();
    let new_booking = booking::ActiveModel {
        id: Set(booking_id),
        booking_code: Set(booking_code()),
        sailing_date_id: Set(req.sailing_date_id),
        passenger_count: Set(req.passengers.len() as i32),
        status: Set(status),
        channel: Set(req.channel),
        total_amount: Set(req.total_amount),
        customer_name: Set(req.customer_name),
        customer_contact: Set(req.customer_contact),
        ..Default::default()
    };
    let created = new_booking.insert(&txn).await?;

    for name in &req.passengers {
        let row = ticket::ActiveModel {
            id: Set(Uuid::new_v4()),
            booking_id: Set(booking_id),
            passenger_name: Set(name.clone()),
            ..Default::default()
        };
        row.insert(&txn).await?;
    }

    for v in &req.vehicles {
        let row = vehicle::ActiveModel {
            id: Set(Uuid::new_v4()),
            booking_id: Set(booking_id),
            vehicle_type: Set(v.vehicle_type),
            category: Set(v.category.clone()),
            license_plate: Set(v.license_plate.clone()),
            ..Default::default()
        };
        row.insert(&txn).await?;
    }

    append_log(&txn, booking_id, None, status, changed_by, None).await?;

    txn.commit().await?;

    tracing::info!(
        booking_id = %created.id,
        booking_code = %created.booking_code,
        status = %created.status,
        "Booking created",
    );

    Ok(created)
}

/// Apply a status transition. Releases the booking's full reservation on
/// the transition into CANCELLED and appends an audit entry; illegal
/// transitions are rejected without touching any counter.
pub async fn update_status(
    db: &DatabaseConnection,
    booking_id: Uuid,
    new_status: BookingStatus,
    changed_by: &str,
    notes: Option<String>,
) -> AppResult<booking::Model> {
    let txn = db.begin().await?;

    // Lock the booking row so two concurrent transitions serialize and a
    // double cancel cannot release capacity twice.
    let booking = booking::Entity::find_by_id(booking_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    let from = booking.status;
    if !is_legal_transition(from, new_status) {
        return Err(AppError::IllegalTransition {
            from,
            to: new_status,
        });
    }

    if releases_capacity(from, new_status) {
        let delta = booking_delta(&txn, &booking).await?;
        ledger::release(&txn, booking.sailing_date_id, &delta).await?;
    }

    let mut active: booking::ActiveModel = booking.into();
    active.status = Set(new_status);
    let updated = active.update(&txn).await?;

    append_log(&txn, booking_id, Some(from), new_status, changed_by, notes).await?;

    txn.commit().await?;

    tracing::info!(
        booking_id = %updated.id,
        from = %from,
        to = %new_status,
        by = changed_by,
        "Booking status updated",
    );

    Ok(updated)
}

/// Move a booking to another sailing date: release the old reservation
/// and reserve the new one in the same transaction. If the new sailing
/// cannot take the load the transaction rolls back and the booking keeps
/// its original reservation untouched. Both rows are locked in uuid
/// order so two opposing reschedules cannot deadlock.
pub async fn reschedule(
    db: &DatabaseConnection,
    booking_id: Uuid,
    new_sailing_date_id: Uuid,
    changed_by: &str,
) -> AppResult<booking::Model> {
    let txn = db.begin().await?;

    let booking = booking::Entity::find_by_id(booking_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if !matches!(
        booking.status,
        BookingStatus::Pending | BookingStatus::Confirmed
    ) {
        return Err(AppError::BadRequest(format!(
            "Cannot reschedule a {} booking",
            booking.status
        )));
    }

    let old_sailing_date_id = booking.sailing_date_id;
    if old_sailing_date_id == new_sailing_date_id {
        return Err(AppError::BadRequest(
            "Booking is already on that sailing date".to_string(),
        ));
    }

    let delta = booking_delta(&txn, &booking).await?;

    let (first_id, second_id) = if old_sailing_date_id < new_sailing_date_id {
        (old_sailing_date_id, new_sailing_date_id)
    } else {
        (new_sailing_date_id, old_sailing_date_id)
    };
    let first = ledger::lock(&txn, first_id).await?;
    let second = ledger::lock(&txn, second_id).await?;
    let (old_row, new_row) = if first_id == old_sailing_date_id {
        (first, second)
    } else {
        (second, first)
    };

    if new_row.status.is_override() {
        return Err(AppError::Conflict(
            "Target sailing is not accepting bookings".to_string(),
        ));
    }

    ledger::release_on(&txn, old_row, &delta).await?;
    ledger::reserve_on(&txn, new_row, &delta).await?;

    let status = booking.status;
    let mut active: booking::ActiveModel = booking.into();
    active.sailing_date_id = Set(new_sailing_date_id);
    let updated = active.update(&txn).await?;

    append_log(
        &txn,
        booking_id,
        Some(status),
        status,
        changed_by,
        Some(format!(
            "Rescheduled from sailing {} to {}",
            old_sailing_date_id, new_sailing_date_id
        )),
    )
    .await?;

    txn.commit().await?;

    tracing::info!(
        booking_id = %updated.id,
        from_sailing = %old_sailing_date_id,
        to_sailing = %new_sailing_date_id,
        "Booking rescheduled",
    );

    Ok(updated)
}

/// Any booking row pins its sailing date, whatever its status; the
/// foreign key restricts the delete and cancelled or refunded rows are
/// kept for audit.
pub async fn has_bookings(db: &DatabaseConnection, sailing_date_id: Uuid) -> AppResult<bool> {
    let count = booking::Entity::find()
        .filter(booking::Column::SailingDateId.eq(sailing_date_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use BookingStatus::*;

    #[test]
    fn happy_path_is_legal() {
        assert!(is_legal_transition(Pending, Confirmed));
        assert!(is_legal_transition(Confirmed, Completed));
    }

    #[test]
    fn cancellation_branches() {
        assert!(is_legal_transition(Pending, Cancelled));
        assert!(is_legal_transition(Confirmed, Cancelled));
        assert!(is_legal_transition(Completed, Cancelled));
        assert!(is_legal_transition(Cancelled, Refunded));
    }

    #[test]
    fn double_cancel_is_illegal() {
        assert!(!is_legal_transition(Cancelled, Cancelled));
    }

    #[test]
    fn refunded_is_terminal() {
        for to in [Pending, Confirmed, Completed, Cancelled, Refunded] {
            assert!(!is_legal_transition(Refunded, to));
        }
    }

    #[test]
    fn no_backwards_or_skip_transitions() {
        assert!(!is_legal_transition(Confirmed, Pending));
        assert!(!is_legal_transition(Pending, Completed));
        assert!(!is_legal_transition(Completed, Confirmed));
        assert!(!is_legal_transition(Pending, Refunded));
        assert!(!is_legal_transition(Confirmed, Refunded));
    }

    #[test]
    fn capacity_released_only_on_cancel() {
        assert!(releases_capacity(Pending, Cancelled));
        assert!(releases_capacity(Confirmed, Cancelled));
        assert!(releases_capacity(Completed, Cancelled));
        assert!(!releases_capacity(Cancelled, Refunded));
        assert!(!releases_capacity(Pending, Confirmed));
        assert!(!releases_capacity(Confirmed, Completed));
    }

    #[test]
    fn cancelled_and_refunded_keep_rows_but_not_capacity() {
        assert!(holds_capacity(Pending));
        assert!(holds_capacity(Confirmed));
        assert!(holds_capacity(Completed));
        assert!(!holds_capacity(Cancelled));
        assert!(!holds_capacity(Refunded));
    }
}
