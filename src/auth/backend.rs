// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential backends.
//!
//! A backend decides how credentials are registered and verified. One is
//! chosen at startup from `CREDENTIAL_BACKEND`:
//!
//! - [`LocalBackend`] hashes with Argon2 and verifies against the store
//! - [`DelegatedBackend`] forwards both operations to a remote identity
//!   provider and stores no password locally

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::password::{PasswordHash, PasswordHasher};
use super::provider::{IdentityProviderClient, ProviderError};
use super::AuthError;
use crate::storage::CredentialStore;

/// Which backend variant is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Local,
    Delegated,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Delegated => "delegated",
        }
    }
}

/// Outcome of registering new credentials.
#[derive(Debug, Clone)]
pub struct Registration {
    /// GUID the new user record must be keyed by
    pub guid: Uuid,
    /// Hash to persist locally (`None` when the provider keeps credentials)
    pub password_hash: Option<PasswordHash>,
}

/// Strategy for registering and verifying credentials.
///
/// Emails passed in are already normalised.
#[async_trait]
pub trait CredentialBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Prepare credentials for a new account.
    async fn register(&self, email: &str, password: &str) -> Result<Registration, AuthError>;

    /// Verify credentials and return the subject GUID.
    async fn authenticate(&self, email: &str, password: &str) -> Result<Uuid, AuthError>;
}

// =============================================================================
// Local
// =============================================================================

/// Hash-and-verify against the credential store.
pub struct LocalBackend {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
}

impl LocalBackend {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }
}

#[async_trait]
impl CredentialBackend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn register(&self, _email: &str, password: &str) -> Result<Registration, AuthError> {
        let hasher = self.hasher.clone();
        let password = password.to_owned();

        // Argon2 is CPU-bound; keep it off the async workers.
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::infra("hashing password", e))?
            .map_err(|e| AuthError::infra("hashing password", e))?;

        Ok(Registration {
            guid: Uuid::new_v4(),
            password_hash: Some(hash),
        })
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Uuid, AuthError> {
        let user = self
            .store
            .get_user_by_email(email)
            .map_err(|e| AuthError::infra("getting user by email", e))?
            .ok_or(AuthError::NoSuchUser)?;

        // Profiles without a stored hash cannot log in locally.
        let Some(hash) = user.password_hash else {
            return Err(AuthError::InvalidCredentials);
        };

        let hasher = self.hasher.clone();
        let password = password.to_owned();
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&hash, &password))
            .await
            .map_err(|e| AuthError::infra("verifying password", e))?;

        if verified {
            Ok(user.guid)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }
}

// =============================================================================
// Delegated
// =============================================================================

/// Verify credentials at a remote identity provider.
pub struct DelegatedBackend {
    client: IdentityProviderClient,
}

impl DelegatedBackend {
    pub fn new(client: IdentityProviderClient) -> Self {
        Self { client }
    }
}

fn provider_error(operation: &'static str, error: ProviderError) -> AuthError {
    match error {
        ProviderError::Unauthorized => AuthError::InvalidCredentials,
        other => AuthError::infra(operation, other),
    }
}

#[async_trait]
impl CredentialBackend for DelegatedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Delegated
    }

    async fn register(&self, email: &str, password: &str) -> Result<Registration, AuthError> {
        let guid = self
            .client
            .signup(email, password)
            .await
            .map_err(|e| provider_error("identity provider signup", e))?;

        Ok(Registration {
            guid,
            password_hash: None,
        })
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Uuid, AuthError> {
        self.client
            .login(email, password)
            .await
            .map_err(|e| provider_error("identity provider login", e))
    }
}
