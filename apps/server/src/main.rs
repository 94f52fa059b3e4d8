// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use anyhow::Context;
use ipo_relay_server::services::bounded;
use ipo_relay_server::{app, bind, AppState, Config, RedisStore};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = tracing_subscriber::fmt().with_env_filter(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "info,tower_http=debug,ipo_relay_server=debug".into()),
    );
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        subscriber.json().init();
    } else {
        subscriber.pretty().init();
    }

    let config = Config::from_env();

    tracing::info!(
        port = config.port,
        redis_host = %config.redis_host,
        redis_port = config.redis_port,
        redis_db = config.redis_db,
        cache_key = %config.cache_key,
        store_timeout_ms = config.store_timeout_ms,
        "Starting IPO Relay Server"
    );

    // Refuse to serve without a working store
    let store = bounded(config.store_connect_timeout(), RedisStore::connect(&config))
        .await
        .with_context(|| {
            format!(
                "failed to connect to Redis at {}:{}",
                config.redis_host, config.redis_port
            )
        })?;

    let listener = bind(&config).await.with_context(|| {
        format!("failed to bind {}:{}", config.host, config.port)
    })?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    let state = AppState::new(Arc::new(store), config);
    let router = app(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
