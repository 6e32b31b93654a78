// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    auth::Principal,
    error::ApiError,
    models::{StatusResponse, UserData, UserProfileRequest},
    state::AppState,
};

fn parse_guid(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid user guid"))
}

pub async fn create_user(
    principal: Principal,
    State(state): State<AppState>,
    Json(request): Json<UserProfileRequest>,
) -> Result<(StatusCode, Json<StatusResponse>), ApiError> {
    let (_, status) = state.users.create_user(&principal, request)?;
    Ok((StatusCode::CREATED, Json(status)))
}

pub async fn get_user(
    principal: Principal,
    Path(guid): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<UserData>, ApiError> {
    let guid = parse_guid(&guid)?;
    Ok(Json(state.users.get_user(&principal, guid)?))
}

pub async fn update_user(
    principal: Principal,
    Path(guid): Path<String>,
    State(state): State<AppState>,
    Json(request): Json<UserProfileRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    let guid = parse_guid(&guid)?;
    Ok(Json(state.users.update_user(&principal, guid, request)?))
}

pub async fn delete_user(
    principal: Principal,
    Path(guid): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, ApiError> {
    let guid = parse_guid(&guid)?;
    Ok(Json(state.users.delete_user(&principal, guid)?))
}
