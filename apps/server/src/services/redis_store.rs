// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Redis-backed payload store.

use super::store::{PayloadStore, StoreError};
use crate::config::Config;
use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};

/// Store backed by a multiplexed, auto-reconnecting Redis connection.
///
/// Cloning is cheap and every clone shares the same underlying connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis and confirm it answers `PING`.
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let client = redis::Client::open(connection_info(config))?;
        let conn = ConnectionManager::new_with_config(client, manager_config(config)).await?;
        let store = Self { conn };
        store.ping().await?;

        tracing::debug!(
            host = %config.redis_host,
            port = config.redis_port,
            db = config.redis_db,
            "Connected to Redis"
        );

        Ok(store)
    }
}

/// Reconnect schedule and per-call bounds, all in milliseconds.
///
/// Keeps a dropped connection from parking callers behind a long backoff.
pub fn manager_config(config: &Config) -> ConnectionManagerConfig {
    ConnectionManagerConfig::new()
        .set_number_of_retries(config.store_reconnect_retries)
        .set_max_delay(config.store_reconnect_max_delay_ms)
        .set_connection_timeout(config.store_connect_timeout())
        .set_response_timeout(config.store_timeout())
}

/// Connection parameters for the configured host, port, password and database.
pub fn connection_info(config: &Config) -> ConnectionInfo {
    ConnectionInfo {
        addr: ConnectionAddr::Tcp(config.redis_host.clone(), config.redis_port),
        redis: RedisConnectionInfo {
            db: config.redis_db,
            password: config.redis_password.clone(),
            ..Default::default()
        },
    }
}

#[async_trait]
impl PayloadStore for RedisStore {
    async fn fetch(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value.map(Bytes::from))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
