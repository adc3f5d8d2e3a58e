//! Ride state machine on top of a [`RideStore`].
//!
//! Each transition reads the ride, checks the edge exists, then commits with
//! a conditional update against the version it read. A lost race is never
//! retried: the loser re-evaluates the record it was handed back and fails
//! with `Conflict`.
use std::sync::Arc;

use crate::error::CoreError;
use crate::policy::Operation;
use crate::ride::Ride;
use crate::store::{RideStore, UpdateOutcome};
use crate::types::{RideId, UserId};
use crate::utils::required;

pub struct RideLifecycle<S> {
    store: Arc<S>,
}

impl<S> Clone for RideLifecycle<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: RideStore> RideLifecycle<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Create a ride in `Requested` with no driver and version 0.
    pub fn request(
        &self,
        passenger_id: &UserId,
        pickup: &str,
        dropoff: &str,
    ) -> Result<Ride, CoreError> {
        let pickup = required("pickup location", pickup)?;
        let dropoff = required("drop location", dropoff)?;

        let ride = Ride::requested(RideId::generate()?, passenger_id.clone(), pickup, dropoff);
        self.store.insert(&ride)?;

        tracing::info!(ride_id = %ride.id, %passenger_id, "ride requested");
        Ok(ride)
    }

    /// Bind `driver_id` to a `Requested` ride. At most one caller ever wins.
    pub fn accept(&self, ride_id: &RideId, driver_id: &UserId) -> Result<Ride, CoreError> {
        let ride = self.transition(ride_id, Operation::AcceptRide, &|ride| {
            ride.bind_driver(driver_id.clone())
        })?;

        tracing::info!(ride_id = %ride.id, %driver_id, "ride accepted");
        Ok(ride)
    }

    /// Move an `Accepted` ride to `Completed`.
    ///
    /// Ownership of the ride is not checked here; any caller that passed the
    /// role policy may complete it.
    pub fn complete(&self, ride_id: &RideId) -> Result<Ride, CoreError> {
        let ride = self.transition(ride_id, Operation::CompleteRide, &|ride| ride.finish())?;

        tracing::info!(
            ride_id = %ride.id,
            passenger_id = %ride.passenger_id,
            driver_id = ?ride.driver_id,
            "ride completed"
        );
        Ok(ride)
    }

    pub fn get(&self, ride_id: &RideId) -> Result<Ride, CoreError> {
        self.store
            .get(ride_id)?
            .ok_or_else(|| CoreError::ride_not_found(ride_id))
    }

    fn transition(
        &self,
        ride_id: &RideId,
        operation: Operation,
        mutator: &dyn Fn(&mut Ride),
    ) -> Result<Ride, CoreError> {
        let ride = self.get(ride_id)?;
        if ride.status.after(operation).is_none() {
            tracing::warn!(%ride_id, status = %ride.status, %operation, "transition rejected");
            return Err(conflict(ride, operation));
        }

        match self.store.conditional_update(ride_id, ride.version, mutator)? {
            UpdateOutcome::Applied(updated) => Ok(updated),
            UpdateOutcome::Stale(current) => {
                tracing::warn!(
                    %ride_id,
                    status = %current.status,
                    %operation,
                    "lost race on conditional update"
                );
                Err(conflict(current, operation))
            }
            UpdateOutcome::Missing => Err(CoreError::ride_not_found(ride_id)),
        }
    }
}

fn conflict(ride: Ride, operation: Operation) -> CoreError {
    CoreError::Conflict {
        ride_id: ride.id,
        status: ride.status,
        operation,
    }
}
