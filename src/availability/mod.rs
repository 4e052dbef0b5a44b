//! Availability engine: the read path of the booking flow. Answers which
//! sailings can satisfy a request and when the next date with room is.
//! Never mutates the ledger; the authoritative capacity check happens
//! inside `ledger::reserve` when the booking is actually created.

use chrono::{Duration, NaiveDate};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::catalog;
use crate::entities::sailing_date::{self, SailingStatus};
use crate::entities::{ferry, schedule};
use crate::error::AppResult;
use crate::ledger::{self, ResourceCounts};

/// Forward scan bound for nearest-date search. A hard limit, not a
/// per-call parameter.
pub const NEAREST_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct AnnotatedSailing {
    pub sailing: sailing_date::Model,
    pub schedule: schedule::Model,
    pub ferry: ferry::Model,
    pub available: ResourceCounts,
    pub is_available: bool,
    pub reason: Option<String>,
}

fn status_reason(status: SailingStatus) -> Option<&'static str> {
    match status {
        SailingStatus::Active | SailingStatus::Full => None,
        SailingStatus::Inactive => Some("Sailing is inactive"),
        SailingStatus::Cancelled => Some("Sailing is cancelled"),
        SailingStatus::Departed => Some("Ferry has departed"),
        SailingStatus::WeatherIssue => Some("Sailing suspended due to weather"),
    }
}

/// Annotate one candidate against the requested load. FULL is advisory
/// here; the counters decide, so a vehicle-only request can still fit a
/// sailing whose passenger deck is exhausted.
pub fn annotate(
    status: SailingStatus,
    used: ResourceCounts,
    capacity: ResourceCounts,
    requested: ResourceCounts,
) -> (bool, Option<String>) {
    if let Some(reason) = status_reason(status) {
        return (false, Some(reason.to_string()));
    }

    match ledger::check(used, capacity, requested) {
        Ok(()) => (true, None),
        Err(shortfalls) => {
            let first = &shortfalls[0];
            (
                false,
                Some(format!(
                    "Insufficient {} capacity: requested {}, {} left",
                    first.resource, first.requested, first.available
                )),
            )
        }
    }
}

/// All sailings for the route on the given date, annotated with per
/// resource remainders. Candidates that cannot satisfy the request are
/// still returned so the caller can show why not. Ordered by departure
/// time ascending.
pub async fn search<C: ConnectionTrait>(
    db: &C,
    route_id: Uuid,
    date: NaiveDate,
    requested: ResourceCounts,
) -> AppResult<Vec<AnnotatedSailing>> {
    let candidates = catalog::find(db, route_id, date).await?;

    let ferry_ids: Vec<Uuid> = candidates.iter().map(|(_, s)| s.ferry_id).collect();
    let ferries = ferry::Entity::find()
        .filter(ferry::Column::Id.is_in(ferry_ids))
        .all(db)
        .await?;

    let mut results = Vec::new();
    for (sailing, sched) in candidates {
        let Some(ferry) = ferries.iter().find(|f| f.id == sched.ferry_id) else {
            continue;
        };

        let used = ResourceCounts::of_sailing(&sailing);
        let capacity = ResourceCounts::of_ferry(ferry);
        let (is_available, reason) = annotate(sailing.status, used, capacity, requested);

        results.push(AnnotatedSailing {
            sailing,
            schedule: sched,
            ferry: ferry.clone(),
            available: ResourceCounts::remaining(used, capacity),
            is_available,
            reason,
        });
    }

    Ok(results)
}

/// The candidate dates the nearest-date scan visits, in order: the day
/// after the requested date through `NEAREST_WINDOW_DAYS` after it,
/// inclusive. The requested date itself is never a candidate.
pub fn window_dates(after: NaiveDate) -> Vec<NaiveDate> {
    (1..=NEAREST_WINDOW_DAYS)
        .map(|offset| after + Duration::days(offset))
        .collect()
}

/// Scan the window forward day by day and return the first date with at
/// least one fully available sailing, or `None` when the window is
/// exhausted.
pub async fn find_nearest<C: ConnectionTrait>(
    db: &C,
    route_id: Uuid,
    date: NaiveDate,
    requested: ResourceCounts,
) -> AppResult<Option<(NaiveDate, Vec<AnnotatedSailing>)>> {
    for candidate_date in window_dates(date) {
        let results = search(db, route_id, candidate_date, requested).await?;
        if results.iter().any(|r| r.is_available) {
            return Ok(Some((candidate_date, results)));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps() -> ResourceCounts {
        ResourceCounts {
            passenger: 50,
            motorcycle: 20,
            car: 10,
            bus: 2,
            truck: 4,
        }
    }

    #[test]
    fn annotate_available_sailing() {
        let used = ResourceCounts {
            passenger: 10,
            car: 3,
            ..Default::default()
        };
        let requested = ResourceCounts {
            passenger: 4,
            car: 1,
            ..Default::default()
        };
        let (ok, reason) = annotate(SailingStatus::Active, used, caps(), requested);
        assert!(ok);
        assert!(reason.is_none());
    }

    #[test]
    fn annotate_names_the_short_resource() {
        let used = ResourceCounts {
            passenger: 48,
            ..Default::default()
        };
        let requested = ResourceCounts {
            passenger: 3,
            ..Default::default()
        };
        let (ok, reason) = annotate(SailingStatus::Active, used, caps(), requested);
        assert!(!ok);
        assert_eq!(
            reason.as_deref(),
            Some("Insufficient passenger capacity: requested 3, 2 left")
        );
    }

    #[test]
    fn annotate_non_bookable_status_is_its_own_reason() {
        let (ok, reason) = annotate(
            SailingStatus::Cancelled,
            ResourceCounts::default(),
            caps(),
            ResourceCounts {
                passenger: 1,
                ..Default::default()
            },
        );
        assert!(!ok);
        assert_eq!(reason.as_deref(), Some("Sailing is cancelled"));
    }

    #[test]
    fn nearest_scan_covers_exactly_seven_days_after_the_request() {
        let start = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let dates = window_dates(start);

        assert_eq!(dates.len(), NEAREST_WINDOW_DAYS as usize);
        // Day 1 through day 7 are candidates
        assert_eq!(dates.first().copied(), NaiveDate::from_ymd_opt(2024, 6, 4));
        assert_eq!(dates.last().copied(), NaiveDate::from_ymd_opt(2024, 6, 10));
        // The requested day itself and day 8 are not
        assert!(!dates.contains(&start));
        assert!(!dates.contains(&NaiveDate::from_ymd_opt(2024, 6, 11).unwrap()));
    }

    #[test]
    fn annotate_full_sailing_can_still_take_vehicle_only_request() {
        // Passenger deck exhausted, car deck open.
        let used = ResourceCounts {
            passenger: 50,
            ..Default::default()
        };
        let requested = ResourceCounts {
            car: 1,
            ..Default::default()
        };
        let (ok, reason) = annotate(SailingStatus::Full, used, caps(), requested);
        assert!(ok);
        assert!(reason.is_none());
    }
}
