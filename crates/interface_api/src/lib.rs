//! HTTP API for the claims pipeline
//!
//! Exposes the four fixed operations over axum: claim registration, status
//! check, pipeline run, and the manager decision override. Handlers hold an
//! `Arc<ClaimService>`; everything behind it is injected, so tests run the
//! full router against in-memory ports.

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use domain_claims::ClaimService;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ClaimService>,
}

impl AppState {
    pub fn new(service: Arc<ClaimService>) -> Self {
        Self { service }
    }
}

/// Builds the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/claims/register", post(handlers::claims::register))
        .route(
            "/claims/:transaction_id/status",
            get(handlers::claims::status),
        )
        .route(
            "/claims/:transaction_id/process",
            post(handlers::claims::process),
        )
        .route(
            "/claims/:transaction_id/decision",
            post(handlers::claims::decision),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
