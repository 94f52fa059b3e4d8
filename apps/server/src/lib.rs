// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IPO Relay Server - read-through relay for the cached IPO list.
//!
//! An external job scrapes the current IPO issues and writes them to Redis
//! as a JSON string. This server hands that string to callers unchanged.
//!
//! # Endpoints
//!
//! - `GET /` - API information
//! - `GET /api/ipos` - Cached IPO list (`503` while the cache is empty)
//! - `GET /api/health` - Health check, including store reachability

use axum::{http::StatusCode, routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod routes;
pub mod services;

pub use config::Config;
pub use error::ApiError;
pub use services::{MemoryStore, PayloadStore, RedisStore, StoreError};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PayloadStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn PayloadStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

/// Build the router with all endpoints and middleware.
pub fn app(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        // Root endpoint - API information
        .route("/", get(routes::health::info))
        // Health check
        .route("/api/health", get(routes::health::check))
        // Relay
        .route("/api/ipos", get(routes::ipos::list))
        // Middleware
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind the configured host and port.
///
/// `host` may be an IPv4 or IPv6 literal or a resolvable name.
pub async fn bind(config: &Config) -> std::io::Result<TcpListener> {
    TcpListener::bind((config.host.as_str(), config.port)).await
}
