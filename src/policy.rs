//! Role-based gate in front of the lifecycle and query operations.
//!
//! The table is static; nothing about a specific ride is consulted here.
//! Complete is open to both roles without checking that the caller is the
//! passenger or driver bound to the ride.
use std::fmt;

use crate::error::CoreError;
use crate::user::{Identity, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    RequestRide,
    AcceptRide,
    CompleteRide,
    PendingRides,
    MyRides,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::RequestRide,
        Operation::AcceptRide,
        Operation::CompleteRide,
        Operation::PendingRides,
        Operation::MyRides,
    ];

    pub fn permitted_roles(self) -> &'static [Role] {
        match self {
            Operation::RequestRide => &[Role::Passenger],
            Operation::AcceptRide => &[Role::Driver],
            Operation::CompleteRide => &[Role::Passenger, Role::Driver],
            Operation::PendingRides => &[Role::Driver],
            Operation::MyRides => &[Role::Passenger],
        }
    }

    pub fn permits(self, role: Role) -> bool {
        self.permitted_roles().contains(&role)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::RequestRide => "request",
            Operation::AcceptRide => "accept",
            Operation::CompleteRide => "complete",
            Operation::PendingRides => "list pending rides",
            Operation::MyRides => "list own rides",
        })
    }
}

/// Fails with `Forbidden` when the caller's role may not run `operation`.
pub fn authorize(caller: &Identity, operation: Operation) -> Result<(), CoreError> {
    if operation.permits(caller.role) {
        return Ok(());
    }
    tracing::warn!(
        user_id = %caller.user_id,
        role = %caller.role,
        %operation,
        "operation denied by role policy"
    );
    Err(CoreError::Forbidden {
        role: caller.role,
        operation,
    })
}
