// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{process::ExitCode, sync::Arc};

use account_gate_server::{
    api::router,
    auth::{
        CredentialBackend, DelegatedBackend, HashError, IdentityProviderClient, LocalBackend,
        PasswordHasher, ProviderError,
    },
    config::{BackendConfig, Config, ConfigError},
    logging,
    state::AppState,
    storage::{CredentialStore, RedbStore, StoreError},
};
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to create data directory: {0}")]
    DataDir(#[source] std::io::Error),

    #[error("failed to open credential store: {0}")]
    Store(#[from] StoreError),

    #[error("invalid password hashing cost: {0}")]
    Hash(#[from] HashError),

    #[error("invalid identity provider configuration: {0}")]
    Provider(#[from] ProviderError),

    #[error("failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", StartupError::from(e));
            return ExitCode::FAILURE;
        }
    };

    logging::init(config.log_format);

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), StartupError> {
    std::fs::create_dir_all(&config.data_dir).map_err(StartupError::DataDir)?;

    let db_path = config.database_path();
    let store: Arc<dyn CredentialStore> = Arc::new(RedbStore::open(&db_path)?);
    info!(path = %db_path.display(), "credential store opened");

    let backend: Arc<dyn CredentialBackend> = match &config.backend {
        BackendConfig::Local => Arc::new(LocalBackend::new(
            store.clone(),
            PasswordHasher::new(config.hash_cost)?,
        )),
        BackendConfig::Delegated { url, timeout } => {
            let client = IdentityProviderClient::new(url, *timeout)?;
            info!(provider = %client.base_url(), "delegating credentials to identity provider");
            Arc::new(DelegatedBackend::new(client))
        }
    };

    let backend_kind = backend.kind();
    let state = AppState::new(store, backend)
        .with_identity_policy(config.identity_policy)
        .with_request_timeout(config.request_timeout);
    let app = router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(StartupError::Bind)?;

    info!(
        %addr,
        backend = backend_kind.as_str(),
        identity_policy = config.identity_policy.as_str(),
        "Account Gate server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
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
                error!(error = %e, "failed to install SIGTERM handler");
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

    info!("Graceful shutdown initiated");
}
