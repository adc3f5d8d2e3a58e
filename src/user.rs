//! Users, caller identities and the directory that resolves them
use serde::{Deserialize, Serialize};
use sled::Transactional;
use sled::transaction::{TransactionError, abort};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, StoreError};
use crate::types::UserId;

const USERS_TREE: &str = "users";
const USERNAMES_TREE: &str = "usernames";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, minicbor::Encode, minicbor::Decode, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    #[n(0)]
    Passenger,
    #[n(1)]
    Driver,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Passenger => "PASSENGER",
            Role::Driver => "DRIVER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PASSENGER" => Ok(Role::Passenger),
            "DRIVER" => Ok(Role::Driver),
            other => Err(CoreError::Validation(format!("unknown role {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, minicbor::Encode, minicbor::Decode)]
pub struct User {
    #[n(0)]
    pub id: UserId,
    #[n(1)]
    pub username: String,
    #[n(2)]
    pub password_hash: String, // argon2 PHC string
    #[n(3)]
    pub role: Role,
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id.clone(),
            role: self.role,
        }
    }
}

/// An authenticated caller. Passed explicitly into every ride operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

/// Read-side lookup of users.
pub trait UserDirectory: Send + Sync {
    fn get(&self, user_id: &UserId) -> Result<Option<User>, CoreError>;

    fn find_by_username(&self, username: &str) -> Result<Option<User>, CoreError>;

    /// Map an authenticated subject (username) to its internal id and role.
    fn resolve(&self, username: &str) -> Result<Identity, CoreError> {
        self.find_by_username(username)?
            .map(|user| user.identity())
            .ok_or_else(|| CoreError::NotFound {
                entity: "user",
                id: username.to_string(),
            })
    }
}

/// Directory backed by two sled trees: `users` keyed by id and a
/// `usernames` index keyed by username.
pub struct SledUserDirectory {
    users: sled::Tree,
    usernames: sled::Tree,
}

impl SledUserDirectory {
    pub fn open(db: &sled::Db) -> Result<Self, StoreError> {
        Ok(Self {
            users: db.open_tree(USERS_TREE)?,
            usernames: db.open_tree(USERNAMES_TREE)?,
        })
    }

    /// Store a new user. Claiming the username and writing the record happen
    /// in one transaction, so two registrations can't both take a name.
    pub fn register(
        &self,
        username: &str,
        password_hash: String,
        role: Role,
    ) -> Result<User, CoreError> {
        let user = User {
            id: UserId::generate()?,
            username: username.to_string(),
            password_hash,
            role,
        };
        let encoded = encode(&user)?;

        let outcome: Result<(), TransactionError<()>> = (&self.users, &self.usernames)
            .transaction(|(users, usernames)| {
                if usernames.get(username.as_bytes())?.is_some() {
                    return abort(());
                }
                usernames.insert(username.as_bytes(), user.id.as_bytes())?;
                users.insert(user.id.as_bytes(), encoded.as_slice())?;
                Ok(())
            });

        match outcome {
            Ok(()) => {
                tracing::info!(user_id = %user.id, %role, "user registered");
                Ok(user)
            }
            Err(TransactionError::Abort(())) => Err(CoreError::UsernameTaken(username.to_string())),
            Err(TransactionError::Storage(err)) => Err(StoreError::from(err).into()),
        }
    }
}

impl UserDirectory for SledUserDirectory {
    fn get(&self, user_id: &UserId) -> Result<Option<User>, CoreError> {
        let Some(bytes) = self.users.get(user_id.as_bytes()).map_err(StoreError::from)? else {
            return Ok(None);
        };
        Ok(Some(decode(&bytes)?))
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>, CoreError> {
        let Some(id) = self.usernames.get(username.as_bytes()).map_err(StoreError::from)? else {
            return Ok(None);
        };
        let user_id = UserId::from(String::from_utf8_lossy(&id).into_owned());
        self.get(&user_id)
    }
}

fn encode(user: &User) -> Result<Vec<u8>, StoreError> {
    minicbor::to_vec(user).map_err(|err| StoreError::Encode(err.to_string()))
}

fn decode(bytes: &[u8]) -> Result<User, StoreError> {
    Ok(minicbor::decode(bytes)?)
}
