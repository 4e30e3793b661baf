// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr};

use relational_guard::{
    api::router,
    config::{
        GuardConfig, DEFAULT_LOG_FILTER, HOST_ENV, LOG_FORMAT_ENV, PORT_ENV, SEED_API_KEY_ENV,
        SEED_API_KEY_ROLES_ENV,
    },
    state::AppState,
    store::{InMemoryDirectory, StoredReferenceToken},
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = GuardConfig::from_env().expect("Invalid guard configuration");
    tracing::info!(?config, "Loaded guard configuration");

    let mut directory = InMemoryDirectory::new();
    if let Ok(key) = env::var(SEED_API_KEY_ENV) {
        let roles = env::var(SEED_API_KEY_ROLES_ENV).unwrap_or_else(|_| "svc".to_string());
        tracing::info!(%roles, "Seeding API key");
        directory.insert_reference_token(StoredReferenceToken::new(key, "seed", roles));
    }

    let state = AppState::new(config, directory).expect("Failed to build guard");
    let app = router(state);

    let host = env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var(PORT_ENV)
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!(%addr, "Relational Guard listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}
