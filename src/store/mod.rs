//! Durable ride storage and the conditional-update contract the lifecycle
//! relies on.
//!
//! `conditional_update` is the only concurrency mechanism in the crate: a
//! mutation commits only if the stored version still equals the version the
//! caller read. Losers see the current record and nothing is written.
mod memory;
mod sled_store;

pub use memory::MemoryRideStore;
pub use sled_store::SledRideStore;

use crate::error::StoreError;
use crate::ride::{Ride, RideStatus};
use crate::types::{RideId, UserId};

/// Result of a [`RideStore::conditional_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The mutator ran and the new record (version bumped) was committed.
    Applied(Ride),
    /// The stored version no longer matched. Carries what is stored now.
    Stale(Ride),
    Missing,
}

pub trait RideStore: Send + Sync {
    /// Store a new ride. Fails with [`StoreError::Duplicate`] if the id is taken.
    fn insert(&self, ride: &Ride) -> Result<(), StoreError>;

    fn get(&self, id: &RideId) -> Result<Option<Ride>, StoreError>;

    /// Apply `mutator` only if the stored version equals `expected_version`
    /// at commit time. The store owns the version: it is incremented on
    /// every applied mutation regardless of what the mutator does.
    fn conditional_update(
        &self,
        id: &RideId,
        expected_version: u64,
        mutator: &dyn Fn(&mut Ride),
    ) -> Result<UpdateOutcome, StoreError>;

    /// Rides in `status`, oldest `created_at` first.
    fn list_by_status(&self, status: RideStatus) -> Result<Vec<Ride>, StoreError>;

    fn list_by_passenger(&self, passenger_id: &UserId) -> Result<Vec<Ride>, StoreError>;
}

// ties on created_at fall back to id so the order is total
pub(crate) fn oldest_first(rides: &mut [Ride]) {
    rides.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Copy of `current` with `mutator` applied and the version bumped.
/// The id is pinned so a mutator can't move the record.
pub(crate) fn next_revision(current: &Ride, mutator: &dyn Fn(&mut Ride)) -> Ride {
    let mut next = current.clone();
    mutator(&mut next);
    next.id = current.id.clone();
    next.version = current.version + 1;
    next
}
