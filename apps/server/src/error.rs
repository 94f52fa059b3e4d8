// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types and handling for the server.

use crate::services::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Shown to callers while the writer has not populated the cache yet.
pub const SYNCING_MESSAGE: &str = "Data syncing, please try again in a moment.";

/// Shown to callers for any store failure. Details stay in the logs.
pub const STORE_ERROR_MESSAGE: &str = "Redis error";

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The cache key is absent; the caller should retry shortly.
    #[error("cache key not populated yet")]
    DataSyncing,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Body for transient unavailability.
#[derive(Debug, Serialize)]
pub struct SyncingResponse {
    pub message: &'static str,
}

/// Body for hard failures.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::DataSyncing => (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(SyncingResponse {
                    message: SYNCING_MESSAGE,
                }),
            )
                .into_response(),
            ApiError::Store(err) => {
                tracing::error!(error = %err, "Store read failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: STORE_ERROR_MESSAGE,
                    }),
                )
                    .into_response()
            }
        }
    }
}
