// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{sync::Arc, time::Duration};

use crate::auth::{
    AuthService, CredentialBackend, IdentityHeaderPolicy, LocalBackend, PasswordHasher,
};
use crate::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::storage::{CredentialStore, InMemoryStore};
use crate::users::UserService;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub identity_policy: IdentityHeaderPolicy,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(store: Arc<dyn CredentialStore>, backend: Arc<dyn CredentialBackend>) -> Self {
        Self {
            auth: Arc::new(AuthService::new(store.clone(), backend)),
            users: Arc::new(UserService::new(store.clone())),
            store,
            identity_policy: IdentityHeaderPolicy::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_identity_policy(mut self, policy: IdentityHeaderPolicy) -> Self {
        self.identity_policy = policy;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// In-memory store with the local backend.
impl Default for AppState {
    fn default() -> Self {
        let store: Arc<dyn CredentialStore> = Arc::new(InMemoryStore::new());
        let backend = Arc::new(LocalBackend::new(store.clone(), PasswordHasher::default()));
        Self::new(store, backend)
    }
}
