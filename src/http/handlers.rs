use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::AppState;
use super::error::{ApiError, ApiResult};
use super::extract::AuthUser;
use crate::ride::Ride;
use crate::types::{RideId, UserId};
use crate::user::Role;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRideRequest {
    pub pickup_location: String,
    pub drop_location: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of a successful registration: the stored user plus a first token.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

/// Run sled and argon2 work on the blocking pool.
pub(crate) async fn blocking<T, F>(work: F) -> ApiResult<T>
where
    F: FnOnce() -> ApiResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| ApiError::Internal(err.to_string()))?
}

pub async fn welcome() -> Json<Value> {
    Json(json!({
        "message": "Welcome to RideShare API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/api/auth/register",
            "/api/auth/login",
            "/api/v1/rides",
            "/api/v1/user/rides",
            "/api/v1/driver/rides/requests",
            "/api/v1/driver/rides/{id}/accept",
            "/api/v1/rides/{id}/complete",
        ],
    }))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "UP", "service": "RideShare API" }))
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(body) = payload?;
    let auth = state.auth.clone();
    let (user, token) =
        blocking(move || Ok(auth.register(&body.username, &body.password, body.role)?)).await?;

    let response = RegisterResponse {
        id: user.id,
        username: user.username,
        role: user.role,
        token,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<AuthResponse>> {
    let Json(body) = payload?;
    let auth = state.auth.clone();
    let token = blocking(move || Ok(auth.login(&body.username, &body.password)?)).await?;

    Ok(Json(AuthResponse { token }))
}

pub async fn request_ride(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    payload: Result<Json<CreateRideRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Ride>)> {
    let Json(body) = payload?;
    let ride = blocking(move || {
        Ok(state
            .rides
            .request_ride(&caller, &body.pickup_location, &body.drop_location)?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(ride)))
}

pub async fn my_rides(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<Vec<Ride>>> {
    let rides = blocking(move || Ok(state.rides.my_rides(&caller)?)).await?;
    Ok(Json(rides))
}

pub async fn pending_rides(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
) -> ApiResult<Json<Vec<Ride>>> {
    let rides = blocking(move || Ok(state.rides.pending_rides(&caller)?)).await?;
    Ok(Json(rides))
}

pub async fn accept_ride(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(ride_id): Path<RideId>,
) -> ApiResult<Json<Ride>> {
    let ride = blocking(move || Ok(state.rides.accept_ride(&caller, &ride_id)?)).await?;
    Ok(Json(ride))
}

pub async fn complete_ride(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(ride_id): Path<RideId>,
) -> ApiResult<Json<Ride>> {
    let ride = blocking(move || Ok(state.rides.complete_ride(&caller, &ride_id)?)).await?;
    Ok(Json(ride))
}
