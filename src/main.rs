// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FounderConnect API Server
//!
//! Signs students in against the hosted identity provider and serves
//! profiles, founders and campus events to the web frontend.

use founder_connect::{
    config::{BackendMode, Config},
    db::{DataStore, MemoryDb, PostgrestDb},
    services::{spawn_profile_listener, GoTrueClient, IdentityProvider, MemoryIdentityProvider},
    AppState,
};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often idle client storage and unused refresh locks are swept.
const SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        university = %config.university,
        direct_auth_accounts = config.direct_auth_accounts.len(),
        "Starting FounderConnect API"
    );

    let (identity, db): (Arc<dyn IdentityProvider>, Arc<dyn DataStore>) =
        match config.backend_mode {
            BackendMode::Remote => {
                tracing::info!(backend = %config.backend_url, "Using hosted backend");
                (
                    Arc::new(GoTrueClient::new(
                        &config.backend_url,
                        &config.backend_anon_key,
                    )?),
                    Arc::new(PostgrestDb::new(
                        &config.backend_url,
                        &config.backend_anon_key,
                    )?),
                )
            }
            BackendMode::Memory => {
                tracing::warn!("Using in-memory backend, data is lost on restart");
                (
                    Arc::new(MemoryIdentityProvider::new()),
                    Arc::new(MemoryDb::new()),
                )
            }
        };

    // Build shared state
    let state = Arc::new(AppState::new(config.clone(), identity, db)?);

    // Provision profiles on sign-in events
    spawn_profile_listener(&state.events, state.profiles.clone());

    spawn_sweeper(state.clone(), Duration::from_secs(config.client_idle_ttl_secs));

    // Build router
    let app = founder_connect::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Periodically evict idle client storage and prune per-user locks.
fn spawn_sweeper(state: Arc<AppState>, max_idle: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let evicted = state.clients.evict_idle(max_idle);
            state.bootstrap.prune_refresh_locks();
            state.profiles.prune_locks();
            if evicted > 0 {
                tracing::info!(
                    evicted,
                    remaining = state.clients.len(),
                    "Evicted idle client storage"
                );
            }
        }
    });
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("founder_connect=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
