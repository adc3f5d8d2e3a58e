use super::{RideStore, UpdateOutcome, next_revision, oldest_first};
use crate::error::StoreError;
use crate::ride::{Ride, RideStatus};
use crate::types::{RideId, UserId};

const RIDES_TREE: &str = "rides";

/// Rides encoded as CBOR in the `rides` tree, keyed by ride id.
///
/// Conditional updates commit with `compare_and_swap` against the exact
/// bytes that were read, so any concurrent write in between makes the swap
/// fail and no lock is held across the read-modify-write.
#[derive(Clone)]
pub struct SledRideStore {
    rides: sled::Tree,
}

impl SledRideStore {
    pub fn open(db: &sled::Db) -> Result<Self, StoreError> {
        Ok(Self {
            rides: db.open_tree(RIDES_TREE)?,
        })
    }

    fn scan(&self, keep: impl Fn(&Ride) -> bool) -> Result<Vec<Ride>, StoreError> {
        let mut rides = Vec::new();
        for entry in self.rides.iter() {
            let (_, bytes) = entry?;
            let ride = decode(&bytes)?;
            if keep(&ride) {
                rides.push(ride);
            }
        }
        Ok(rides)
    }
}

impl RideStore for SledRideStore {
    fn insert(&self, ride: &Ride) -> Result<(), StoreError> {
        let bytes = encode(ride)?;
        self.rides
            .compare_and_swap(ride.id.as_bytes(), None::<&[u8]>, Some(bytes))?
            .map_err(|_| StoreError::Duplicate(ride.id.to_string()))
    }

    fn get(&self, id: &RideId) -> Result<Option<Ride>, StoreError> {
        self.rides
            .get(id.as_bytes())?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    fn conditional_update(
        &self,
        id: &RideId,
        expected_version: u64,
        mutator: &dyn Fn(&mut Ride),
    ) -> Result<UpdateOutcome, StoreError> {
        let Some(current_bytes) = self.rides.get(id.as_bytes())? else {
            return Ok(UpdateOutcome::Missing);
        };
        let current = decode(&current_bytes)?;
        if current.version != expected_version {
            return Ok(UpdateOutcome::Stale(current));
        }

        let next = next_revision(&current, mutator);
        let swapped = self.rides.compare_and_swap(
            id.as_bytes(),
            Some(&current_bytes),
            Some(encode(&next)?),
        )?;

        match swapped {
            Ok(()) => Ok(UpdateOutcome::Applied(next)),
            Err(lost) => match lost.current {
                Some(bytes) => Ok(UpdateOutcome::Stale(decode(&bytes)?)),
                None => Ok(UpdateOutcome::Missing),
            },
        }
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

fn encode(ride: &Ride) -> Result<Vec<u8>, StoreError> {
    minicbor::to_vec(ride).map_err(|err| StoreError::Encode(err.to_string()))
}

fn decode(bytes: &[u8]) -> Result<Ride, StoreError> {
    Ok(minicbor::decode(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimeStamp;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, SledRideStore) {
        let temp_dir = tempdir().unwrap();
        let db = sled::open(temp_dir.path().join("rides.db")).unwrap();
        (temp_dir, SledRideStore::open(&db).unwrap())
    }

    fn ride(id: &str, passenger: &str) -> Ride {
        Ride::requested(RideId::from(id), UserId::from(passenger), "A".into(), "B".into())
    }

    #[test]
    fn insert_refuses_overwrite() {
        let (_dir, store) = store();
        let first = ride("ride_1a", "user_1p");
        store.insert(&first).unwrap();

        let mut clash = ride("ride_1a", "user_1q");
        clash.pickup = "elsewhere".into();
        assert!(matches!(store.insert(&clash), Err(StoreError::Duplicate(_))));
        assert_eq!(store.get(&first.id).unwrap(), Some(first));
    }

    #[test]
    fn update_bumps_version_once() {
        let (_dir, store) = store();
        let original = ride("ride_1a", "user_1p");
        store.insert(&original).unwrap();

        let outcome = store
            .conditional_update(&original.id, 0, &|r| r.bind_driver(UserId::from("user_1d")))
            .unwrap();
        let UpdateOutcome::Applied(updated) = outcome else {
            panic!("expected applied, got {outcome:?}");
        };
        assert_eq!(updated.version, 1);
        assert_eq!(updated.status, RideStatus::Accepted);
        assert_eq!(store.get(&original.id).unwrap(), Some(updated));
    }

    #[test]
    fn stale_version_writes_nothing() {
        let (_dir, store) = store();
        let original = ride("ride_1a", "user_1p");
        store.insert(&original).unwrap();
        store
            .conditional_update(&original.id, 0, &|r| r.bind_driver(UserId::from("user_1d")))
            .unwrap();
        let before = store.get(&original.id).unwrap().unwrap();

        let outcome = store
            .conditional_update(&original.id, 0, &|r| r.bind_driver(UserId::from("user_1x")))
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::Stale(before.clone()));
        assert_eq!(store.get(&original.id).unwrap(), Some(before));
    }

    #[test]
    fn missing_ride() {
        let (_dir, store) = store();
        let outcome = store
            .conditional_update(&RideId::from("ride_1none"), 0, &|r| r.finish())
            .unwrap();

        assert_eq!(outcome, UpdateOutcome::Missing);
        assert!(store.get(&RideId::from("ride_1none")).unwrap().is_none());
    }

    #[test]
    fn lists_filter_and_order() {
        let (_dir, store) = store();
        let mut late = ride("ride_1late", "user_1p");
        late.created_at = TimeStamp::new_with(2024, 1, 2, 0, 0, 0).unwrap();
        let mut early = ride("ride_1early", "user_1q");
        early.created_at = TimeStamp::new_with(2024, 1, 1, 0, 0, 0).unwrap();
        let mut taken = ride("ride_1taken", "user_1p");
        taken.bind_driver(UserId::from("user_1d"));

        for r in [&late, &early, &taken] {
            store.insert(r).unwrap();
        }

        let pending = store.list_by_status(RideStatus::Requested).unwrap();
        assert_eq!(pending, vec![early, late.clone()]);

        let mut mine = store.list_by_passenger(&UserId::from("user_1p")).unwrap();
        mine.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(mine, vec![late, taken]);
    }
}
