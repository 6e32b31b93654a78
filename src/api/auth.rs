// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    auth::{Confirmation, Principal, SignupParams, IDENTITY_HEADER},
    error::ApiError,
    models::{LoginRequest, LoginResponse, SignupRequest},
    state::AppState,
};

type IdentityHeader = [(&'static str, String); 1];

fn identity_header(guid: uuid::Uuid) -> IdentityHeader {
    [(IDENTITY_HEADER, guid.to_string())]
}

fn validate_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("A valid email is required"));
    }
    if password.is_empty() {
        return Err(ApiError::bad_request("Password must not be empty"));
    }
    Ok(())
}

pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Confirmation>), ApiError> {
    validate_credentials(&request.email, &request.password)?;

    let confirmation = state
        .auth
        .signup(SignupParams {
            email: request.email,
            password: request.password,
            name: request.name,
            occupation: request.occupation,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(confirmation)))
}

/// Verify credentials; the GUID is returned in the body and in `X-User`.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<(IdentityHeader, Json<LoginResponse>), ApiError> {
    validate_credentials(&request.email, &request.password)?;

    let user_guid = state.auth.login(&request.email, &request.password).await?;
    Ok((identity_header(user_guid), Json(LoginResponse { user_guid })))
}

/// Check whether the caller's asserted identity has a session.
pub async fn session(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<(IdentityHeader, Json<LoginResponse>), ApiError> {
    let Some(guid) = principal.guid() else {
        return Err(ApiError::unauthorized("Not authenticated"));
    };

    match state.auth.auth(guid)? {
        Principal::Identified(user_guid) => {
            Ok((identity_header(user_guid), Json(LoginResponse { user_guid })))
        }
        Principal::Anonymous => Err(ApiError::unauthorized("Not authenticated")),
    }
}
