//! Ride record and its three-state lifecycle
use serde::Serialize;
use std::fmt;

use crate::policy::Operation;
use crate::types::{RideId, TimeStamp, UserId};

/// Strictly forward-moving ride status.
///
/// The only edges are `Requested --accept--> Accepted --complete--> Completed`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    minicbor::Encode,
    minicbor::Decode,
    Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    #[n(0)]
    Requested,
    #[n(1)]
    Accepted,
    #[n(2)]
    Completed,
}

impl RideStatus {
    /// The status `operation` leads to, or `None` when there is no such edge.
    pub fn after(self, operation: Operation) -> Option<RideStatus> {
        match (self, operation) {
            (RideStatus::Requested, Operation::AcceptRide) => Some(RideStatus::Accepted),
            (RideStatus::Accepted, Operation::CompleteRide) => Some(RideStatus::Completed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == RideStatus::Completed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RideStatus::Requested => "REQUESTED",
            RideStatus::Accepted => "ACCEPTED",
            RideStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for RideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A passenger's trip request and the driver bound to it, if any.
///
/// JSON shape: `{id, userId, driverId|null, pickupLocation, dropLocation, status, createdAt}`.
/// `version` stays internal; it is the token conditional writes are checked against.
#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    #[n(0)]
    pub id: RideId,
    #[n(1)]
    #[serde(rename = "userId")]
    pub passenger_id: UserId,
    #[n(2)]
    pub driver_id: Option<UserId>, // set exactly once, on accept
    #[n(3)]
    #[serde(rename = "pickupLocation")]
    pub pickup: String,
    #[n(4)]
    #[serde(rename = "dropLocation")]
    pub dropoff: String,
    #[n(5)]
    pub status: RideStatus,
    #[n(6)]
    pub created_at: TimeStamp,
    #[n(7)]
    #[serde(skip)]
    pub version: u64,
}

impl Ride {
    /// A fresh ride awaiting a driver.
    pub fn requested(id: RideId, passenger_id: UserId, pickup: String, dropoff: String) -> Self {
        Self {
            id,
            passenger_id,
            driver_id: None,
            pickup,
            dropoff,
            status: RideStatus::Requested,
            created_at: TimeStamp::now(),
            version: 0,
        }
    }

    /// `Requested` has no driver; `Accepted` and `Completed` always have one.
    pub fn driver_matches_status(&self) -> bool {
        match self.status {
            RideStatus::Requested => self.driver_id.is_none(),
            RideStatus::Accepted | RideStatus::Completed => self.driver_id.is_some(),
        }
    }

    pub(crate) fn bind_driver(&mut self, driver_id: UserId) {
        self.driver_id = Some(driver_id);
        self.status = RideStatus::Accepted;
    }

    pub(crate) fn finish(&mut self) {
        self.status = RideStatus::Completed;
    }
}
