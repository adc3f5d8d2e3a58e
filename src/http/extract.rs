//! Bearer-token extractor yielding the caller's [`Identity`].

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::AppState;
use super::error::ApiError;
use super::handlers::blocking;
use crate::auth::AuthError;
use crate::user::Identity;

/// Authenticated caller, resolved through the user directory.
///
/// ```ignore
/// async fn handler(AuthUser(caller): AuthUser) -> ApiResult<Json<()>> {
///     tracing::info!(user_id = %caller.user_id, role = %caller.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_owned)
            .ok_or(AuthError::MissingToken)?;

        let auth = state.auth.clone();
        let identity = blocking(move || Ok(auth.authenticate(&token)?)).await?;
        Ok(AuthUser(identity))
    }
}
