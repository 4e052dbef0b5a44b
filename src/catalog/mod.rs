//! Sailing catalog: expands recurring schedules into concrete sailing-date
//! rows and answers "which sailings exist for route X on date Y".

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::sailing_date::{self, SailingStatus};
use crate::entities::schedule::{self, ScheduleStatus};
use crate::entities::ferry;
use crate::error::{AppError, AppResult};
use crate::ledger::{self, ResourceCounts};

pub fn weekday_bit(day: Weekday) -> i32 {
    1 << day.num_days_from_monday()
}

pub fn recurrence_contains(mask: i32, day: Weekday) -> bool {
    mask & weekday_bit(day) != 0
}

/// All seven weekdays set.
pub const FULL_WEEK: i32 = 0b111_1111;

/// Calendar days in the inclusive range that fall on one of the
/// schedule's recurrence days. Days outside the recurrence set are
/// skipped, never materialized.
pub fn expand_range(start: NaiveDate, end: NaiveDate, mask: i32) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut day = start;
    while day <= end {
        if recurrence_contains(mask, day.weekday()) {
            dates.push(day);
        }
        day = day + Duration::days(1);
    }
    dates
}

/// Create sailing-date rows for the given calendar days. Days that
/// already have a row for this schedule are left untouched.
pub async fn materialize<C: ConnectionTrait>(
    db: &C,
    schedule: &schedule::Model,
    dates: &[NaiveDate],
    status: SailingStatus,
    status_reason: Option<String>,
    status_expiry: Option<DateTimeWithTimeZone>,
) -> AppResult<Vec<sailing_date::Model>> {
    let existing: Vec<NaiveDate> = sailing_date::Entity::find()
        .filter(sailing_date::Column::ScheduleId.eq(schedule.id))
        .filter(sailing_date::Column::SailingDate.is_in(dates.to_vec()))
        .all(db)
        .await?
        .into_iter()
        .map(|sd| sd.sailing_date)
        .collect();

    let mut created = Vec::new();
    for &date in dates {
        if existing.contains(&date) {
            continue;
        }

        let row = sailing_date::ActiveModel {
            id: Set(Uuid::new_v4()),
            schedule_id: Set(schedule.id),
            sailing_date: Set(date),
            status: Set(status),
            status_reason: Set(status_reason.clone()),
            status_expiry: Set(status_expiry),
            passenger_count: Set(0),
            motorcycle_count: Set(0),
            car_count: Set(0),
            bus_count: Set(0),
            truck_count: Set(0),
            ..Default::default()
        };
        created.push(row.insert(db).await?);
    }

    tracing::info!(
        schedule_id = %schedule.id,
        requested = dates.len(),
        created = created.len(),
        "Materialized sailing dates",
    );

    Ok(created)
}

/// Status a sailing carries once an operator override is lifted: ACTIVE,
/// or FULL when its counters already exhaust the ferry.
pub fn restored_status(used: ResourceCounts, capacity: ResourceCounts) -> SailingStatus {
    ledger::derive_status(used, capacity, SailingStatus::Active)
}

async fn ferry_capacity_of<C: ConnectionTrait>(
    db: &C,
    schedule_id: Uuid,
) -> AppResult<ResourceCounts> {
    let sched = schedule::Entity::find_by_id(schedule_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::Internal("Schedule missing for sailing date".to_string()))?;
    let f = ferry::Entity::find_by_id(sched.ferry_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::Internal("Ferry missing for schedule".to_string()))?;
    Ok(ResourceCounts::of_ferry(&f))
}

/// Revert an expired operator override. Checked lazily on every read;
/// sailings are read far more often than overrides expire, so no
/// background job is needed. The row returns to the status its counters
/// dictate, so a sold-out sailing comes back as FULL, not ACTIVE.
pub async fn revert_if_expired<C: ConnectionTrait>(
    db: &C,
    row: sailing_date::Model,
) -> AppResult<sailing_date::Model> {
    let expired = row
        .status_expiry
        .is_some_and(|expiry| expiry <= Utc::now());
    if !expired || row.status == SailingStatus::Active {
        return Ok(row);
    }

    let capacity = ferry_capacity_of(db, row.schedule_id).await?;
    let status = restored_status(ResourceCounts::of_sailing(&row), capacity);

    tracing::info!(sailing_date_id = %row.id, from = ?row.status, to = ?status, "Status override expired, reverting");

    let mut active: sailing_date::ActiveModel = row.into();
    active.status = Set(status);
    active.status_reason = Set(None);
    active.status_expiry = Set(None);
    Ok(active.update(db).await?)
}

/// Sailing-dates for a route on a calendar day, joined with their
/// schedules, ordered by departure time. Expired status overrides are
/// reverted before the rows are returned.
pub async fn find<C: ConnectionTrait>(
    db: &C,
    route_id: Uuid,
    date: NaiveDate,
) -> AppResult<Vec<(sailing_date::Model, schedule::Model)>> {
    let schedules = schedule::Entity::find()
        .filter(schedule::Column::RouteId.eq(route_id))
        .order_by_asc(schedule::Column::DepartureTime)
        .all(db)
        .await?;

    let schedule_ids: Vec<Uuid> = schedules.iter().map(|s| s.id).collect();
    let sailings = sailing_date::Entity::find()
        .filter(sailing_date::Column::ScheduleId.is_in(schedule_ids))
        .filter(sailing_date::Column::SailingDate.eq(date))
        .all(db)
        .await?;

    let mut results = Vec::new();
    for row in sailings {
        let row = revert_if_expired(db, row).await?;
        if let Some(sched) = schedules.iter().find(|s| s.id == row.schedule_id) {
            results.push((row, sched.clone()));
        }
    }
    results.sort_by_key(|(_, s)| s.departure_time);

    Ok(results)
}

/// Reinstating a schedule reverses the cascade below: future sailing
/// dates sitting at INACTIVE or CANCELLED return to the status their
/// counters dictate. Weather overrides and departed sailings are left
/// alone.
async fn reactivate_future_dates<C: ConnectionTrait>(
    db: &C,
    schedule_id: Uuid,
) -> AppResult<u64> {
    let capacity = ferry_capacity_of(db, schedule_id).await?;

    let today = Utc::now().date_naive();
    let rows = sailing_date::Entity::find()
        .filter(sailing_date::Column::ScheduleId.eq(schedule_id))
        .filter(sailing_date::Column::SailingDate.gt(today))
        .filter(
            sailing_date::Column::Status
                .is_in([SailingStatus::Inactive, SailingStatus::Cancelled]),
        )
        .all(db)
        .await?;

    let mut affected = 0;
    for row in rows {
        let status = restored_status(ResourceCounts::of_sailing(&row), capacity);
        let mut active: sailing_date::ActiveModel = row.into();
        active.status = Set(status);
        active.status_reason = Set(None);
        active.status_expiry = Set(None);
        active.update(db).await?;
        affected += 1;
    }

    tracing::info!(
        schedule_id = %schedule_id,
        affected,
        "Reinstated future sailing dates",
    );

    Ok(affected)
}

/// Deactivating or cancelling a schedule cascades to its *future*
/// sailing dates only; past and departed dates keep their status so
/// history stays accurate. Setting the schedule back to ACTIVE runs the
/// reverse cascade.
pub async fn cascade_schedule_status<C: ConnectionTrait>(
    db: &C,
    schedule_id: Uuid,
    new_status: ScheduleStatus,
    reason: Option<String>,
) -> AppResult<u64> {
    let sailing_status = match new_status {
        ScheduleStatus::Active => return reactivate_future_dates(db, schedule_id).await,
        ScheduleStatus::Inactive => SailingStatus::Inactive,
        ScheduleStatus::Cancelled => SailingStatus::Cancelled,
    };

    let today = Utc::now().date_naive();
    let future = sailing_date::Entity::find()
        .filter(sailing_date::Column::ScheduleId.eq(schedule_id))
        .filter(sailing_date::Column::SailingDate.gt(today))
        .filter(sailing_date::Column::Status.ne(SailingStatus::Departed))
        .all(db)
        .await?;

    let mut affected = 0;
    for row in future {
        let mut active: sailing_date::ActiveModel = row.into();
        active.status = Set(sailing_status);
        active.status_reason = Set(reason.clone());
        active.status_expiry = Set(None);
        active.update(db).await?;
        affected += 1;
    }

    tracing::info!(
        schedule_id = %schedule_id,
        status = ?sailing_status,
        affected,
        "Cascaded schedule status to future sailing dates",
    );

    Ok(affected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekday_bits_are_distinct() {
        let days = [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ];
        let mask = days.iter().fold(0, |m, &d| m | weekday_bit(d));
        assert_eq!(mask, FULL_WEEK);
    }

    #[test]
    fn expand_range_skips_non_recurrence_days() {
        // Mon/Wed/Fri over a Mon..Sun week
        let mask = weekday_bit(Weekday::Mon) | weekday_bit(Weekday::Wed) | weekday_bit(Weekday::Fri);
        let dates = expand_range(date(2024, 6, 3), date(2024, 6, 9), mask);
        assert_eq!(
            dates,
            vec![date(2024, 6, 3), date(2024, 6, 5), date(2024, 6, 7)]
        );
    }

    #[test]
    fn expand_range_fourteen_days_mon_wed() {
        let mask = weekday_bit(Weekday::Mon) | weekday_bit(Weekday::Wed);
        // 2024-06-03 is a Monday
        let dates = expand_range(date(2024, 6, 3), date(2024, 6, 16), mask);
        assert_eq!(
            dates,
            vec![
                date(2024, 6, 3),
                date(2024, 6, 5),
                date(2024, 6, 10),
                date(2024, 6, 12),
            ]
        );
        assert!(dates.iter().all(|d| matches!(d.weekday(), Weekday::Mon | Weekday::Wed)));
    }

    #[test]
    fn expand_range_empty_mask_yields_nothing() {
        assert!(expand_range(date(2024, 6, 3), date(2024, 6, 30), 0).is_empty());
    }

    #[test]
    fn reinstated_sold_out_sailing_restores_full() {
        let capacity = ResourceCounts {
            passenger: 50,
            motorcycle: 20,
            car: 10,
            bus: 2,
            truck: 4,
        };
        let used = ResourceCounts {
            passenger: 50,
            ..Default::default()
        };
        assert_eq!(restored_status(used, capacity), SailingStatus::Full);
    }

    #[test]
    fn reinstated_sailing_with_room_restores_active() {
        let capacity = ResourceCounts {
            passenger: 50,
            motorcycle: 20,
            car: 10,
            bus: 2,
            truck: 4,
        };
        let used = ResourceCounts {
            passenger: 49,
            car: 10,
            ..Default::default()
        };
        assert_eq!(restored_status(used, capacity), SailingStatus::Active);
    }

    #[test]
    fn expand_range_single_day() {
        let mask = weekday_bit(Weekday::Sun);
        assert_eq!(
            expand_range(date(2024, 6, 9), date(2024, 6, 9), mask),
            vec![date(2024, 6, 9)]
        );
        assert!(expand_range(date(2024, 6, 8), date(2024, 6, 8), mask).is_empty());
    }
}
