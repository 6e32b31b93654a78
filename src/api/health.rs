// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;

use crate::error::ApiError;
use crate::models::StatusResponse;
use crate::state::AppState;

/// Readiness response with individual component status.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Credential store availability.
    pub store: String,
    /// Active credential backend (`local` or `delegated`).
    pub backend: String,
}

/// Simple health check response for liveness probes.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

fn store_ok(state: &AppState) -> bool {
    match state.store.health_check() {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "credential store health check failed");
            false
        }
    }
}

/// Public health endpoint.
///
/// Returns 200 `{code, message}` if the store answers, 503 otherwise.
pub async fn health(State(state): State<AppState>) -> Result<Json<StatusResponse>, ApiError> {
    if store_ok(&state) {
        Ok(Json(StatusResponse::ok()))
    } else {
        Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "unavailable",
            "Credential store unavailable",
        ))
    }
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running.
/// Does not check dependencies - use readiness for that.
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Readiness probe handler.
///
/// Returns 200 only if the credential store is available.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let all_ok = store_ok(&state);

    let response = ReadyResponse {
        status: if all_ok { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            store: if all_ok { "ok" } else { "unavailable" }.to_string(),
            backend: state.auth.backend_kind().as_str().to_string(),
        },
    };

    let status = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
