//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for accounts and the transaction ledger
//! - Bearer token authentication middleware
//! - Error-to-response mapping

pub mod error;
pub mod middleware;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tally_core::ledger::LedgerService;
use tally_db::SeaLedgerStore;
use tally_shared::JwtService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Ledger core over the database store.
    pub ledger: Arc<LedgerService<SeaLedgerStore>>,
}

impl AppState {
    /// Builds the state from a connection pool and a token service.
    #[must_use]
    pub fn new(db: DatabaseConnection, jwt_service: JwtService) -> Self {
        let ledger = LedgerService::new(Arc::new(SeaLedgerStore::new(db.clone())));
        Self {
            db: Arc::new(db),
            jwt_service: Arc::new(jwt_service),
            ledger: Arc::new(ledger),
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support;
