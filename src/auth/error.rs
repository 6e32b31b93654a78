// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.
//!
//! Business outcomes (`InvalidCredentials`, `NoSuchUser`, `EmailAlreadyUsed`,
//! `NoPermission`, `MalformedIdentity`) are expected and answered with a
//! distinguishing code. `Infra` wraps a failing dependency together with the
//! operation that hit it; callers only ever see a generic message for it.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::password::HashError;
use super::provider::ProviderError;
use crate::error::ApiError;
use crate::storage::StoreError;

/// Failure of a dependency the auth core relies on.
#[derive(Debug, thiserror::Error)]
pub enum InfraError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Hash(#[from] HashError),

    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Authentication error type.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Password does not match, or the identity provider refused the login
    #[error("Not correct password or email")]
    InvalidCredentials,
    /// No active account for the email or GUID
    #[error("No such user registered")]
    NoSuchUser,
    /// An active account already holds the email
    #[error("Email is already registered. Please login")]
    EmailAlreadyUsed,
    /// Principal may not act on the resource
    #[error("No permission to perform action")]
    NoPermission,
    /// Identity header present but not a user identifier (reject policy only)
    #[error("Identity header is not a valid user identifier")]
    MalformedIdentity,
    /// Dependency failure, wrapped with the operation that hit it
    #[error("{operation}: {source}")]
    Infra {
        operation: &'static str,
        #[source]
        source: InfraError,
    },
}

impl AuthError {
    /// Wrap a dependency failure with operation context.
    pub fn infra(operation: &'static str, source: impl Into<InfraError>) -> Self {
        AuthError::Infra {
            operation,
            source: source.into(),
        }
    }

    /// Whether this is an expected business outcome rather than a fault.
    pub fn is_business(&self) -> bool {
        !matches!(self, AuthError::Infra { .. })
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::NoSuchUser => "no_such_user",
            AuthError::EmailAlreadyUsed => "email_already_used",
            AuthError::NoPermission => "no_permission",
            AuthError::MalformedIdentity => "malformed_identity",
            AuthError::Infra { .. } => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::NoSuchUser => StatusCode::NOT_FOUND,
            AuthError::EmailAlreadyUsed => StatusCode::CONFLICT,
            AuthError::NoPermission => StatusCode::FORBIDDEN,
            AuthError::MalformedIdentity => StatusCode::BAD_REQUEST,
            AuthError::Infra { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
