// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Payload store abstraction shared by the relay handlers.

use async_trait::async_trait;
use bytes::Bytes;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Failure talking to the shared store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store did not answer within {0:?}")]
    Timeout(Duration),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Read-only view of the key-value store the external writer populates.
///
/// Implementations must be safe to share across concurrent requests.
#[async_trait]
pub trait PayloadStore: Send + Sync {
    /// Read the raw value under `key`, or `None` if the key does not exist.
    async fn fetch(&self, key: &str) -> Result<Option<Bytes>, StoreError>;

    /// Round-trip to the store to confirm it is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Run a store call with an upper bound on how long it may take.
///
/// An elapsed bound is reported as [`StoreError::Timeout`].
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}
