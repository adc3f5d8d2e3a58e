//! HTTP surface over the ride service.
//!
//! Identity comes from the bearer token; every ride route passes it
//! explicitly into [`RideService`], which applies the role policy.
pub mod error;
pub mod extract;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::auth::AuthService;
use crate::auth::jwt::JwtConfig;
use crate::error::StoreError;
use crate::service::RideService;
use crate::store::SledRideStore;
use crate::user::SledUserDirectory;

/// Shared state handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub rides: RideService<SledRideStore>,
    pub auth: Arc<AuthService>,
}

impl AppState {
    /// Open the ride store and user directory on `db`.
    pub fn open(db: &sled::Db, jwt: JwtConfig) -> Result<Self, StoreError> {
        let rides = RideService::new(Arc::new(SledRideStore::open(db)?));
        let directory = Arc::new(SledUserDirectory::open(db)?);

        Ok(Self {
            rides,
            auth: Arc::new(AuthService::new(directory, jwt)),
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::welcome))
        .route("/health", get(handlers::health))
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        .nest("/api/v1", ride_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn ride_routes() -> Router<AppState> {
    Router::new()
        .route("/rides", post(handlers::request_ride))
        .route("/user/rides", get(handlers::my_rides))
        .route("/driver/rides/requests", get(handlers::pending_rides))
        .route("/driver/rides/{ride_id}/accept", post(handlers::accept_ride))
        .route("/rides/{ride_id}/complete", post(handlers::complete_ride))
}
