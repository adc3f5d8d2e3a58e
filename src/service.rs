//! Service layer API for ride operations.
//!
//! Every call takes the caller's [`Identity`] explicitly, runs the role
//! policy first and only then touches the lifecycle or the queries. A
//! denied call has no side effects.
use std::sync::Arc;

use crate::error::CoreError;
use crate::lifecycle::RideLifecycle;
use crate::policy::{Operation, authorize};
use crate::query::RideQueryService;
use crate::ride::Ride;
use crate::store::RideStore;
use crate::types::RideId;
use crate::user::Identity;

pub struct RideService<S> {
    lifecycle: RideLifecycle<S>,
    queries: RideQueryService<S>,
}

impl<S> Clone for RideService<S> {
    fn clone(&self) -> Self {
        Self {
            lifecycle: self.lifecycle.clone(),
            queries: self.queries.clone(),
        }
    }
}

impl<S: RideStore> RideService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            lifecycle: RideLifecycle::new(Arc::clone(&store)),
            queries: RideQueryService::new(store),
        }
    }

    pub fn lifecycle(&self) -> &RideLifecycle<S> {
        &self.lifecycle
    }

    /// Request a ride on behalf of the calling passenger
    pub fn request_ride(
        &self,
        caller: &Identity,
        pickup: &str,
        dropoff: &str,
    ) -> Result<Ride, CoreError> {
        authorize(caller, Operation::RequestRide)?;
        self.lifecycle.request(&caller.user_id, pickup, dropoff)
    }

    /// Rides requested by the calling passenger
    pub fn my_rides(&self, caller: &Identity) -> Result<Vec<Ride>, CoreError> {
        authorize(caller, Operation::MyRides)?;
        self.queries.my_rides(&caller.user_id)
    }

    /// Rides waiting for a driver, oldest first
    pub fn pending_rides(&self, caller: &Identity) -> Result<Vec<Ride>, CoreError> {
        authorize(caller, Operation::PendingRides)?;
        self.queries.pending_rides()
    }

    /// Accept a ride as the calling driver
    pub fn accept_ride(&self, caller: &Identity, ride_id: &RideId) -> Result<Ride, CoreError> {
        authorize(caller, Operation::AcceptRide)?;
        self.lifecycle.accept(ride_id, &caller.user_id)
    }

    /// Complete an accepted ride
    pub fn complete_ride(&self, caller: &Identity, ride_id: &RideId) -> Result<Ride, CoreError> {
        authorize(caller, Operation::CompleteRide)?;
        self.lifecycle.complete(ride_id)
    }
}
