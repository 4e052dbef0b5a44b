//! Capacity ledger: the five per-sailing resource counters and the only
//! code paths allowed to mutate them. Reserve and release run against a
//! row locked with SELECT ... FOR UPDATE inside the caller's transaction,
//! so concurrent bookings against one sailing are serialized.

use sea_orm::{ActiveModelTrait, DatabaseTransaction, EntityTrait, QuerySelect, Set};
use uuid::Uuid;

use crate::entities::sailing_date::{self, SailingStatus};
use crate::entities::vehicle::VehicleType;
use crate::entities::{ferry, schedule};
use crate::error::{AppError, AppResult, Shortfall};

/// A snapshot of the five resources: used counters, ferry capacities,
/// or the delta of a reservation, depending on context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceCounts {
    pub passenger: i32,
    pub motorcycle: i32,
    pub car: i32,
    pub bus: i32,
    pub truck: i32,
}

impl ResourceCounts {
    pub fn of_sailing(sd: &sailing_date::Model) -> Self {
        Self {
            passenger: sd.passenger_count,
            motorcycle: sd.motorcycle_count,
            car: sd.car_count,
            bus: sd.bus_count,
            truck: sd.truck_count,
        }
    }

    pub fn of_ferry(f: &ferry::Model) -> Self {
        Self {
            passenger: f.capacity_passenger,
            motorcycle: f.capacity_motorcycle,
            car: f.capacity_car,
            bus: f.capacity_bus,
            truck: f.capacity_truck,
        }
    }

    /// Build a reservation delta from a passenger count and vehicles
    /// grouped by broad type.
    pub fn for_booking<I>(passengers: i32, vehicles: I) -> Self
    where
        I: IntoIterator<Item = VehicleType>,
    {
        let mut counts = Self {
            passenger: passengers,
            ..Default::default()
        };
        for v in vehicles {
            match v {
                VehicleType::Motorcycle => counts.motorcycle += 1,
                VehicleType::Car => counts.car += 1,
                VehicleType::Bus => counts.bus += 1,
                VehicleType::Truck => counts.truck += 1,
            }
        }
        counts
    }

    fn as_array(&self) -> [(&'static str, i32); 5] {
        [
            ("passenger", self.passenger),
            ("motorcycle", self.motorcycle),
            ("car", self.car),
            ("bus", self.bus),
            ("truck", self.truck),
        ]
    }

    fn map2(a: Self, b: Self, f: impl Fn(i32, i32) -> i32) -> Self {
        Self {
            passenger: f(a.passenger, b.passenger),
            motorcycle: f(a.motorcycle, b.motorcycle),
            car: f(a.car, b.car),
            bus: f(a.bus, b.bus),
            truck: f(a.truck, b.truck),
        }
    }

    pub fn plus(self, delta: Self) -> Self {
        Self::map2(self, delta, |a, b| a + b)
    }

    /// Subtraction floored at zero; release never drives a counter negative.
    pub fn minus_clamped(self, delta: Self) -> Self {
        Self::map2(self, delta, |a, b| (a - b).max(0))
    }

    /// Remaining room per resource.
    pub fn remaining(used: Self, capacity: Self) -> Self {
        Self::map2(capacity, used, |cap, u| (cap - u).max(0))
    }
}

/// Check that every positively requested resource fits. All failing
/// resources are collected so the caller can report each shortfall;
/// nothing is committed on failure.
pub fn check(used: ResourceCounts, capacity: ResourceCounts, delta: ResourceCounts) -> Result<(), Vec<Shortfall>> {
    let mut shortfalls = Vec::new();
    for ((name, requested), ((_, u), (_, cap))) in delta
        .as_array()
        .into_iter()
        .zip(used.as_array().into_iter().zip(capacity.as_array()))
    {
        if requested > 0 && u + requested > cap {
            shortfalls.push(Shortfall {
                resource: name,
                requested,
                available: (cap - u).max(0),
            });
        }
    }
    if shortfalls.is_empty() {
        Ok(())
    } else {
        Err(shortfalls)
    }
}

/// Single source of truth for the FULL flag. Operator-set statuses
/// (inactive, cancelled, departed, weather issue) are never overwritten
/// here. Otherwise the sailing is FULL when the passenger deck is
/// exhausted or every vehicle slot the ferry actually has is exhausted.
pub fn derive_status(
    used: ResourceCounts,
    capacity: ResourceCounts,
    current: SailingStatus,
) -> SailingStatus {
    if current.is_override() {
        return current;
    }

    let passenger_full = used.passenger >= capacity.passenger;

    let vehicle_slots: Vec<(i32, i32)> = [
        (used.motorcycle, capacity.motorcycle),
        (used.car, capacity.car),
        (used.bus, capacity.bus),
        (used.truck, capacity.truck),
    ]
    .into_iter()
    .filter(|&(_, cap)| cap > 0)
    .collect();
    let vehicles_full = !vehicle_slots.is_empty() && vehicle_slots.iter().all(|&(u, cap)| u >= cap);

    if passenger_full || vehicles_full {
        SailingStatus::Full
    } else {
        SailingStatus::Active
    }
}

/// Lock a sailing-date row for the remainder of the transaction.
pub async fn lock(txn: &DatabaseTransaction, sailing_date_id: Uuid) -> AppResult<sailing_date::Model> {
    sailing_date::Entity::find_by_id(sailing_date_id)
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Sailing date not found".to_string()))
}

async fn ferry_capacities(txn: &DatabaseTransaction, schedule_id: Uuid) -> AppResult<ResourceCounts> {
    let schedule = schedule::Entity::find_by_id(schedule_id)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Schedule not found".to_string()))?;

    let ferry = ferry::Entity::find_by_id(schedule.ferry_id)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::Internal("Ferry missing for schedule".to_string()))?;

    Ok(ResourceCounts::of_ferry(&ferry))
}

async fn apply(
    txn: &DatabaseTransaction,
    row: sailing_date::Model,
    new_counts: ResourceCounts,
    capacity: ResourceCounts,
) -> AppResult<sailing_date::Model> {
    let old_status = row.status;
    let new_status = derive_status(new_counts, capacity, old_status);

    let mut active: sailing_date::ActiveModel = row.into();
    active.passenger_count = Set(new_counts.passenger);
    active.motorcycle_count = Set(new_counts.motorcycle);
    active.car_count = Set(new_counts.car);
    active.bus_count = Set(new_counts.bus);
    active.truck_count = Set(new_counts.truck);
    active.status = Set(new_status);
    let updated = active.update(txn).await?;

    if new_status != old_status {
        tracing::info!(
            sailing_date_id = %updated.id,
            from = ?old_status,
            to = ?new_status,
            "Sailing status changed",
        );
    }

    Ok(updated)
}

/// Reserve capacity on an already locked row. Rejects the whole request
/// if any resource is short; on success increments every counter and
/// persists the re-derived status in the same update.
pub async fn reserve_on(
    txn: &DatabaseTransaction,
    row: sailing_date::Model,
    delta: &ResourceCounts,
) -> AppResult<sailing_date::Model> {
    let used = ResourceCounts::of_sailing(&row);
    let capacity = ferry_capacities(txn, row.schedule_id).await?;

    check(used, capacity, *delta)
        .map_err(|shortfalls| AppError::InsufficientCapacity { shortfalls })?;

    apply(txn, row, used.plus(*delta), capacity).await
}

/// Release previously reserved capacity on an already locked row.
/// Counters are floored at zero and FULL clears when room frees up.
pub async fn release_on(
    txn: &DatabaseTransaction,
    row: sailing_date::Model,
    delta: &ResourceCounts,
) -> AppResult<sailing_date::Model> {
    let used = ResourceCounts::of_sailing(&row);
    let capacity = ferry_capacities(txn, row.schedule_id).await?;

    apply(txn, row, used.minus_clamped(*delta), capacity).await
}

pub async fn reserve(
    txn: &DatabaseTransaction,
    sailing_date_id: Uuid,
    delta: &ResourceCounts,
) -> AppResult<sailing_date::Model> {
    let row = lock(txn, sailing_date_id).await?;
    reserve_on(txn, row, delta).await
}

pub async fn release(
    txn: &DatabaseTransaction,
    sailing_date_id: Uuid,
    delta: &ResourceCounts,
) -> AppResult<sailing_date::Model> {
    let row = lock(txn, sailing_date_id).await?;
    release_on(txn, row, delta).await
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
    fn check_accepts_exact_fit() {
        let used = ResourceCounts {
            passenger: 48,
            ..Default::default()
        };
        let delta = ResourceCounts {
            passenger: 2,
            ..Default::default()
        };
        assert!(check(used, caps(), delta).is_ok());
    }

    #[test]
    fn check_reports_shortfall_arithmetic() {
        let used = ResourceCounts {
            passenger: 48,
            ..Default::default()
        };
        let delta = ResourceCounts {
            passenger: 3,
            ..Default::default()
        };
        let shortfalls = check(used, caps(), delta).unwrap_err();
        assert_eq!(
            shortfalls,
            vec![Shortfall {
                resource: "passenger",
                requested: 3,
                available: 2,
            }]
        );
    }

    #[test]
    fn check_collects_every_failing_resource() {
        let used = ResourceCounts {
            passenger: 50,
            car: 10,
            ..Default::default()
        };
        let delta = ResourceCounts {
            passenger: 1,
            motorcycle: 1,
            car: 1,
            ..Default::default()
        };
        let shortfalls = check(used, caps(), delta).unwrap_err();
        let resources: Vec<_> = shortfalls.iter().map(|s| s.resource).collect();
        assert_eq!(resources, vec!["passenger", "car"]);
    }

    #[test]
    fn check_ignores_zero_deltas_on_exhausted_resources() {
        // A passenger-only request should not fail because the car deck
        // happens to be full.
        let used = ResourceCounts {
            car: 10,
            ..Default::default()
        };
        let delta = ResourceCounts {
            passenger: 5,
            ..Default::default()
        };
        assert!(check(used, caps(), delta).is_ok());
    }

    #[test]
    fn reserve_release_round_trip_restores_counters() {
        let used = ResourceCounts {
            passenger: 10,
            motorcycle: 3,
            car: 2,
            bus: 0,
            truck: 1,
        };
        let delta = ResourceCounts {
            passenger: 4,
            car: 1,
            ..Default::default()
        };
        assert_eq!(used.plus(delta).minus_clamped(delta), used);
    }

    #[test]
    fn release_floors_at_zero() {
        let used = ResourceCounts {
            passenger: 1,
            ..Default::default()
        };
        let delta = ResourceCounts {
            passenger: 5,
            car: 2,
            ..Default::default()
        };
        assert_eq!(used.minus_clamped(delta), ResourceCounts::default());
    }

    #[test]
    fn full_when_passengers_exhausted() {
        let used = ResourceCounts {
            passenger: 50,
            ..Default::default()
        };
        assert_eq!(
            derive_status(used, caps(), SailingStatus::Active),
            SailingStatus::Full
        );
    }

    #[test]
    fn not_full_while_any_vehicle_slot_remains() {
        let used = ResourceCounts {
            passenger: 10,
            motorcycle: 20,
            car: 10,
            bus: 2,
            truck: 3,
        };
        assert_eq!(
            derive_status(used, caps(), SailingStatus::Active),
            SailingStatus::Active
        );
    }

    #[test]
    fn full_when_every_vehicle_slot_exhausted() {
        let used = ResourceCounts {
            passenger: 10,
            motorcycle: 20,
            car: 10,
            bus: 2,
            truck: 4,
        };
        assert_eq!(
            derive_status(used, caps(), SailingStatus::Active),
            SailingStatus::Full
        );
    }

    #[test]
    fn passenger_only_ferry_not_full_by_vehicle_rule() {
        let capacity = ResourceCounts {
            passenger: 100,
            ..Default::default()
        };
        let used = ResourceCounts {
            passenger: 40,
            ..Default::default()
        };
        assert_eq!(
            derive_status(used, capacity, SailingStatus::Active),
            SailingStatus::Active
        );
    }

    #[test]
    fn full_clears_when_capacity_frees() {
        let full = ResourceCounts {
            passenger: 50,
            ..Default::default()
        };
        assert_eq!(
            derive_status(full, caps(), SailingStatus::Full),
            SailingStatus::Full
        );
        let freed = full.minus_clamped(ResourceCounts {
            passenger: 2,
            ..Default::default()
        });
        assert_eq!(
            derive_status(freed, caps(), SailingStatus::Full),
            SailingStatus::Active
        );
    }

    #[test]
    fn operator_overrides_are_preserved() {
        let used = ResourceCounts::default();
        for status in [
            SailingStatus::Inactive,
            SailingStatus::Cancelled,
            SailingStatus::Departed,
            SailingStatus::WeatherIssue,
        ] {
            assert_eq!(derive_status(used, caps(), status), status);
        }
    }

    #[test]
    fn booking_delta_groups_vehicles_by_type() {
        let delta = ResourceCounts::for_booking(
            3,
            [
                VehicleType::Car,
                VehicleType::Motorcycle,
                VehicleType::Car,
                VehicleType::Truck,
            ],
        );
        assert_eq!(
            delta,
            ResourceCounts {
                passenger: 3,
                motorcycle: 1,
                car: 2,
                bus: 0,
                truck: 1,
            }
        );
    }
}
