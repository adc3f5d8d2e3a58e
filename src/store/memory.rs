use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use super::{RideStore, UpdateOutcome, next_revision, oldest_first};
use crate::error::StoreError;
use crate::ride::{Ride, RideStatus};
use crate::types::{RideId, UserId};

type Slot = Arc<Mutex<Ride>>;

/// Single-process store: one mutex per ride plus the in-record version.
///
/// The id → slot map is only locked long enough to clone a slot handle, so
/// updates to different rides never wait on each other.
#[derive(Default)]
pub struct MemoryRideStore {
    rides: RwLock<HashMap<RideId, Slot>>,
}

impl MemoryRideStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: &RideId) -> Result<Option<Slot>, StoreError> {
        let rides = self.rides.read().map_err(|_| StoreError::Poisoned)?;
        Ok(rides.get(id).cloned())
    }

    fn snapshot(&self) -> Result<Vec<Slot>, StoreError> {
        let rides = self.rides.read().map_err(|_| StoreError::Poisoned)?;
        Ok(rides.values().cloned().collect())
    }

    fn scan(&self, keep: impl Fn(&Ride) -> bool) -> Result<Vec<Ride>, StoreError> {
        let mut rides = Vec::new();
        for slot in self.snapshot()? {
            let ride = slot.lock().map_err(|_| StoreError::Poisoned)?;
            if keep(&ride) {
                rides.push(ride.clone());
            }
        }
        Ok(rides)
    }
}

impl RideStore for MemoryRideStore {
    fn insert(&self, ride: &Ride) -> Result<(), StoreError> {
        let mut rides = self.rides.write().map_err(|_| StoreError::Poisoned)?;
        if rides.contains_key(&ride.id) {
            return Err(StoreError::Duplicate(ride.id.to_string()));
        }
        rides.insert(ride.id.clone(), Arc::new(Mutex::new(ride.clone())));
        Ok(())
    }

    fn get(&self, id: &RideId) -> Result<Option<Ride>, StoreError> {
        let Some(slot) = self.slot(id)? else {
            return Ok(None);
        };
        let ride = slot.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(Some(ride.clone()))
    }

    fn conditional_update(
        &self,
        id: &RideId,
        expected_version: u64,
        mutator: &dyn Fn(&mut Ride),
    ) -> Result<UpdateOutcome, StoreError> {
        let Some(slot) = self.slot(id)? else {
            return Ok(UpdateOutcome::Missing);
        };
        let mut stored = slot.lock().map_err(|_| StoreError::Poisoned)?;
        if stored.version != expected_version {
            return Ok(UpdateOutcome::Stale(stored.clone()));
        }
        let next = next_revision(&stored, mutator);
        *stored = next.clone();
        Ok(UpdateOutcome::Applied(next))
    }

    fn list_by_status(&self, status: RideStatus) -> Result<Vec<Ride>, StoreError> {
        let mut rides = self.scan(|ride| ride.status == status)?;
        oldest_first(&mut rides);
        Ok(rides)
    }

    fn list_by_passenger(&self, passenger_id: &UserId) -> Result<Vec<Ride>, StoreError> {
        self.scan(|ride| &ride.passenger_id == passenger_id)
    }
}
