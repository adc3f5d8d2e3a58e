//! Smoke Screen Unit tests for rideshare components
//!
//! These are unit tests that span the codebase, testing behavior in
//! isolation from integration scenarios. They are intended as a smoke-screen
//! and generally test the happy-path.
//!

use chrono::{Datelike, Timelike, Utc};
use rideshare::{
    error::{CoreError, IdError},
    policy::{Operation, authorize},
    ride::{Ride, RideStatus},
    types::{RideId, TimeStamp, UserId},
    user::{Identity, Role},
    utils::{RIDE_HRP, USER_HRP, new_uuid_to_bech32, required},
};

// UTILS MODULE TESTS
#[cfg(test)]
mod utils_tests {
    use super::*;

    /// Test that new_uuid_to_bech32 generates valid bech32-encoded strings
    /// with the correct human-readable prefix
    #[test]
    fn generates_valid_bech32_with_hrp() {
        let encoded = new_uuid_to_bech32(RIDE_HRP).unwrap();

        assert!(encoded.starts_with("ride_1"));
        assert!(encoded.len() > 10);
    }

    /// Test that an empty prefix is refused as a prefix error
    #[test]
    fn handles_empty_hrp() {
        assert!(matches!(new_uuid_to_bech32(""), Err(IdError::Prefix(_))));
    }

    /// Test that multiple calls generate unique identifiers
    #[test]
    fn generates_unique_ids() {
        let id1 = new_uuid_to_bech32(RIDE_HRP).unwrap();
        let id2 = new_uuid_to_bech32(RIDE_HRP).unwrap();
        let id3 = new_uuid_to_bech32(RIDE_HRP).unwrap();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    /// Test that ride and user ids are distinguishable by prefix
    #[test]
    fn different_hrps_produce_different_encodings() {
        let ride_id = RideId::generate().unwrap();
        let user_id = UserId::generate().unwrap();

        assert!(ride_id.as_str().starts_with(RIDE_HRP));
        assert!(user_id.as_str().starts_with(USER_HRP));
        assert_ne!(ride_id.as_str(), user_id.as_str());
    }

    /// Test that required keeps the value as given and rejects blanks
    #[test]
    fn required_rejects_blank_only() {
        assert_eq!(required("pickup", " Pier 39 ").unwrap(), " Pier 39 ");
        assert!(matches!(
            required("pickup", ""),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            required("drop", " \t\n"),
            Err(CoreError::Validation(_))
        ));
    }
}

// RIDE MODULE TESTS
#[cfg(test)]
mod ride_tests {
    use super::*;

    /// Test that TimeStamp::now() creates a timestamp close to current time
    #[test]
    fn timestamp_now_creates_current_time() {
        let ts = TimeStamp::now();

        let diff = (Utc::now() - ts.to_datetime_utc()).num_seconds().abs();
        assert!(diff < 1);
    }

    /// Test that TimeStamp can be created with specific date/time values
    #[test]
    fn timestamp_new_with_creates_specific_time() {
        let dt = TimeStamp::new_with(2024, 6, 15, 10, 30, 0)
            .unwrap()
            .to_datetime_utc();

        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.month(), 6);
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 10);
        assert_eq!(dt.minute(), 30);
    }

    /// Test that impossible dates are refused rather than clamped
    #[test]
    fn timestamp_new_with_rejects_invalid_date() {
        assert!(TimeStamp::new_with(2024, 2, 30, 0, 0, 0).is_none());
    }

    /// Test that a stored ride decodes back to the same record
    #[test]
    fn ride_cbor_roundtrip() {
        let ride = Ride::requested(
            RideId::generate().unwrap(),
            UserId::generate().unwrap(),
            "Main St".into(),
            "Harbour".into(),
        );

        let encoded = minicbor::to_vec(&ride).unwrap();
        let decoded: Ride = minicbor::decode(&encoded).unwrap();

        assert_eq!(ride, decoded);
    }

    /// Test RideStatus ordering follows the lifecycle
    #[test]
    fn status_ordering() {
        assert!(RideStatus::Requested < RideStatus::Accepted);
        assert!(RideStatus::Accepted < RideStatus::Completed);
        assert!(!RideStatus::Accepted.is_terminal());
    }
}

// POLICY MODULE TESTS
#[cfg(test)]
mod policy_tests {
    use super::*;

    fn caller(role: Role) -> Identity {
        Identity {
            user_id: UserId::from("user_1caller"),
            role,
        }
    }

    /// Test the full role table in one place
    #[test]
    fn role_table() {
        let expected = [
            (Operation::RequestRide, true, false),
            (Operation::AcceptRide, false, true),
            (Operation::CompleteRide, true, true),
            (Operation::PendingRides, false, true),
            (Operation::MyRides, true, false),
        ];

        for (op, passenger, driver) in expected {
            assert_eq!(op.permits(Role::Passenger), passenger, "{op} for passenger");
            assert_eq!(op.permits(Role::Driver), driver, "{op} for driver");
        }
    }

    /// Test that a denied call names the role and operation
    #[test]
    fn authorize_reports_role_and_operation() {
        assert!(authorize(&caller(Role::Driver), Operation::AcceptRide).is_ok());

        let err = authorize(&caller(Role::Passenger), Operation::AcceptRide).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Forbidden {
                role: Role::Passenger,
                operation: Operation::AcceptRide
            }
        ));
    }

    /// Test that roles parse from their wire names only
    #[test]
    fn role_from_str() {
        assert_eq!("PASSENGER".parse::<Role>().unwrap(), Role::Passenger);
        assert_eq!("DRIVER".parse::<Role>().unwrap(), Role::Driver);
        assert!("driver".parse::<Role>().is_err());
    }
}
