//! Read projections over the ride store. Nothing here mutates.
use std::sync::Arc;

use crate::error::CoreError;
use crate::ride::{Ride, RideStatus};
use crate::store::RideStore;
use crate::types::UserId;

pub struct RideQueryService<S> {
    store: Arc<S>,
}

impl<S> Clone for RideQueryService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: RideStore> RideQueryService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Rides still waiting for a driver, oldest first.
    pub fn pending_rides(&self) -> Result<Vec<Ride>, CoreError> {
        Ok(self.store.list_by_status(RideStatus::Requested)?)
    }

    pub fn my_rides(&self, passenger_id: &UserId) -> Result<Vec<Ride>, CoreError> {
        Ok(self.store.list_by_passenger(passenger_id)?)
    }
}
