use crate::policy::Operation;
use crate::ride::RideStatus;
use crate::types::RideId;
use crate::user::Role;

/// Failures raised by a [`crate::store::RideStore`] or the user directory backend.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("storage engine failure: {0}")]
    Engine(#[from] sled::Error),
    #[error("failed to encode record: {0}")]
    Encode(String),
    #[error("failed to decode record: {0}")]
    Decode(#[from] minicbor::decode::Error),
    #[error("record {0} already exists")]
    Duplicate(String),
    #[error("in-memory store lock poisoned")]
    Poisoned,
}

#[derive(thiserror::Error, Debug)]
pub enum IdError {
    #[error("invalid id prefix: {0}")]
    Prefix(#[from] bech32::primitives::hrp::Error),
    #[error("failed to encode id: {0}")]
    Encode(#[from] bech32::EncodeError),
}

/// Error taxonomy of the ride core.
///
/// Every mutation path is fail-closed: whichever variant is returned, the
/// ride record is left exactly as it was before the call.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    /// Bad input. Raised before the store is touched.
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },
    /// The ride was not in the state the operation needs at commit time.
    /// Lost accept races land here too.
    #[error("cannot {operation} ride {ride_id}: {}", conflict_reason(.status, .operation))]
    Conflict {
        ride_id: RideId,
        status: RideStatus,
        operation: Operation,
    },
    #[error("username {0} is already taken")]
    UsernameTaken(String),
    #[error("role {role} may not {operation}")]
    Forbidden { role: Role, operation: Operation },
    /// Collaborator I/O failure. Never retried by the core.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
    #[error(transparent)]
    Identifier(#[from] IdError),
}

impl CoreError {
    pub(crate) fn ride_not_found(ride_id: &RideId) -> Self {
        CoreError::NotFound {
            entity: "ride",
            id: ride_id.to_string(),
        }
    }

    /// Stable machine-readable code, used in error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "VALIDATION",
            CoreError::NotFound { .. } => "NOT_FOUND",
            CoreError::Conflict { .. } | CoreError::UsernameTaken(_) => "CONFLICT",
            CoreError::Forbidden { .. } => "FORBIDDEN",
            CoreError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            CoreError::Identifier(_) => "INTERNAL",
        }
    }
}

fn conflict_reason(status: &RideStatus, operation: &Operation) -> &'static str {
    match (status, operation) {
        (RideStatus::Completed, _) => "ride is already completed",
        (RideStatus::Accepted, Operation::AcceptRide) => "ride is already accepted",
        (RideStatus::Requested, Operation::CompleteRide) => "ride has not been accepted",
        // the state still allows the operation, so another writer got in first
        _ => "ride was modified concurrently",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict(status: RideStatus, operation: Operation) -> CoreError {
        CoreError::Conflict {
            ride_id: RideId::from("ride_1test"),
            status,
            operation,
        }
    }

    #[test]
    fn conflict_message_names_observed_state() {
        let accepted = conflict(RideStatus::Accepted, Operation::AcceptRide).to_string();
        assert_eq!(accepted, "cannot accept ride ride_1test: ride is already accepted");

        let completed = conflict(RideStatus::Completed, Operation::AcceptRide).to_string();
        assert!(completed.ends_with("ride is already completed"));

        let early = conflict(RideStatus::Requested, Operation::CompleteRide).to_string();
        assert!(early.ends_with("ride has not been accepted"));
    }

    #[test]
    fn codes_follow_taxonomy() {
        assert_eq!(CoreError::Validation("x".into()).code(), "VALIDATION");
        assert_eq!(CoreError::ride_not_found(&RideId::from("r")).code(), "NOT_FOUND");
        assert_eq!(conflict(RideStatus::Accepted, Operation::AcceptRide).code(), "CONFLICT");
        assert_eq!(
            CoreError::Forbidden {
                role: Role::Passenger,
                operation: Operation::AcceptRide
            }
            .code(),
            "FORBIDDEN"
        );
        assert_eq!(
            CoreError::from(StoreError::Poisoned).code(),
            "STORE_UNAVAILABLE"
        );
    }
}
