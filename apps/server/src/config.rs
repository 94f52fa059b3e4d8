// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

/// Server configuration.
#[derive(Clone)]
pub struct Config {
    /// Interface to bind.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Redis host.
    pub redis_host: String,
    /// Redis port.
    pub redis_port: u16,
    /// Optional Redis password.
    pub redis_password: Option<String>,
    /// Redis logical database index.
    pub redis_db: i64,
    /// Key the external writer stores the IPO list under.
    pub cache_key: String,
    /// Upper bound for a single store read, in milliseconds.
    pub store_timeout_ms: u64,
    /// Upper bound for the startup connectivity check, in milliseconds.
    pub store_connect_timeout_ms: u64,
    /// Reconnect attempts after the store connection drops.
    pub store_reconnect_retries: usize,
    /// Longest pause between reconnect attempts, in milliseconds.
    pub store_reconnect_max_delay_ms: u64,
    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// Unset or unparseable values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(lookup("PORT"), 8080),
            redis_host: lookup("REDIS_HOST").unwrap_or_else(|| "localhost".into()),
            redis_port: parse_or(lookup("REDIS_PORT"), 6379),
            redis_password: lookup("REDIS_PASSWORD").filter(|s| !s.is_empty()),
            // The writer uses database 1.
            redis_db: parse_or(lookup("REDIS_DB"), 1),
            cache_key: lookup("IPO_CACHE_KEY")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "ipo_list".into()),
            store_timeout_ms: parse_or(lookup("STORE_TIMEOUT_MS"), 300),
            store_connect_timeout_ms: parse_or(lookup("STORE_CONNECT_TIMEOUT_MS"), 5000),
            store_reconnect_retries: parse_or(lookup("STORE_RECONNECT_RETRIES"), 2),
            store_reconnect_max_delay_ms: parse_or(lookup("STORE_RECONNECT_MAX_DELAY_MS"), 500),
            request_timeout_secs: parse_or(lookup("REQUEST_TIMEOUT_SECS"), 30),
        }
    }

    /// Bound applied to each store read.
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Bound applied to the startup connectivity check.
    pub fn store_connect_timeout(&self) -> Duration {
        Duration::from_millis(self.store_connect_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Redacts `redis_password`.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("redis_host", &self.redis_host)
            .field("redis_port", &self.redis_port)
            .field("redis_password", &self.redis_password.as_ref().map(|_| "***"))
            .field("redis_db", &self.redis_db)
            .field("cache_key", &self.cache_key)
            .field("store_timeout_ms", &self.store_timeout_ms)
            .field("store_connect_timeout_ms", &self.store_connect_timeout_ms)
            .field("store_reconnect_retries", &self.store_reconnect_retries)
            .field("store_reconnect_max_delay_ms", &self.store_reconnect_max_delay_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}
