// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IPO list relay endpoint.

use crate::error::ApiError;
use crate::services::bounded;
use crate::AppState;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

/// GET /api/ipos - Relay the cached IPO list.
///
/// The stored value is sent back byte for byte. It is never parsed, so the
/// writer is free to change its shape.
pub async fn list(State(state): State<AppState>) -> Result<Response, ApiError> {
    let key = state.config.cache_key.as_str();

    let payload = bounded(state.config.store_timeout(), state.store.fetch(key))
        .await?
        .ok_or_else(|| {
            tracing::info!(key = %key, "Cache MISS");
            ApiError::DataSyncing
        })?;

    tracing::debug!(key = %key, size = payload.len(), "Cache HIT");

    Ok(([(header::CONTENT_TYPE, "application/json")], payload).into_response())
}
