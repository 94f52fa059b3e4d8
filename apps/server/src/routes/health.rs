// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Health check endpoint.

use crate::services::bounded;
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
    pub version: &'static str,
    pub service: &'static str,
}

/// API information response.
#[derive(Debug, Serialize)]
pub struct ApiInfoResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub endpoints: Vec<EndpointInfo>,
}

/// Endpoint information.
#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

/// GET /api/health - Health check endpoint.
///
/// Pings the store; reports 503 while it is unreachable.
pub async fn check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let ping = bounded(state.config.store_timeout(), state.store.ping()).await;
    let (code, status, store) = match ping {
        Ok(()) => (StatusCode::OK, "healthy", "reachable"),
        Err(e) => {
            tracing::warn!(error = %e, "Health check: store unreachable");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", "unreachable")
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            store,
            version: env!("CARGO_PKG_VERSION"),
            service: "ipo-relay-server",
        }),
    )
}

/// GET / - API information endpoint.
pub async fn info() -> Json<ApiInfoResponse> {
    Json(ApiInfoResponse {
        service: "ipo-relay-server",
        version: env!("CARGO_PKG_VERSION"),
        description: "Relays the cached IPO list from Redis",
        endpoints: vec![
            EndpointInfo {
                method: "GET",
                path: "/api/ipos",
                description: "Cached IPO list (503 while syncing)",
            },
            EndpointInfo {
                method: "GET",
                path: "/api/health",
                description: "Health check endpoint",
            },
        ],
    })
}
