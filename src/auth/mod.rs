//! Registration, login and bearer-token authentication.
//!
//! This is the identity collaborator in front of the ride core: it turns a
//! token into an [`Identity`] and nothing downstream re-checks credentials.
pub mod jwt;
pub mod password;

use std::sync::Arc;

use crate::error::CoreError;
use crate::user::{Identity, Role, SledUserDirectory, User, UserDirectory};
use crate::utils::required;
use jwt::JwtConfig;

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("missing or malformed bearer token")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("token subject {0} is not a known user")]
    UnknownSubject(String),
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
    #[error("password hashing failed: {0}")]
    Hashing(argon2::password_hash::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Minimum accepted username length at registration.
pub const MIN_USERNAME_LEN: usize = 3;

pub struct AuthService {
    directory: Arc<SledUserDirectory>,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(directory: Arc<SledUserDirectory>, jwt: JwtConfig) -> Self {
        Self { directory, jwt }
    }

    /// Store a new user and issue its first token.
    pub fn register(
        &self,
        username: &str,
        password: &str,
        role: Role,
    ) -> Result<(User, String), AuthError> {
        let username = required("username", username)?;
        min_length("username", &username, MIN_USERNAME_LEN)?;
        required("password", password)?;
        min_length("password", password, password::MIN_PASSWORD_LEN)?;

        let hash = password::hash_password(password).map_err(AuthError::Hashing)?;
        let user = self.directory.register(&username, hash, role)?;
        let token =
            jwt::generate_token(&user.username, user.role, &self.jwt).map_err(AuthError::Signing)?;
        Ok((user, token))
    }

    /// Issue a token. Unknown users and wrong passwords look the same.
    pub fn login(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let Some(user) = self.directory.find_by_username(username)? else {
            tracing::warn!(%username, "login for unknown user");
            return Err(AuthError::InvalidCredentials);
        };
        if !password::verify_password(password, &user.password_hash).map_err(AuthError::Hashing)? {
            tracing::warn!(user_id = %user.id, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        jwt::generate_token(&user.username, user.role, &self.jwt).map_err(AuthError::Signing)
    }

    /// Validate `token` and resolve its subject. The stored role wins over
    /// the role in the claims.
    pub fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = jwt::validate_token(token, &self.jwt)?;
        match self.directory.resolve(&claims.sub) {
            Ok(identity) => Ok(identity),
            Err(CoreError::NotFound { .. }) => Err(AuthError::UnknownSubject(claims.sub)),
            Err(err) => Err(err.into()),
        }
    }
}

// counted in characters, not bytes
fn min_length(field: &str, value: &str, min: usize) -> Result<(), CoreError> {
    if value.chars().count() < min {
        return Err(CoreError::Validation(format!(
            "{field} must be at least {min} characters"
        )));
    }
    Ok(())
}
