// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signup, login and session resolution.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::backend::{BackendKind, CredentialBackend};
use super::{AuthError, Principal};
use crate::storage::{normalize_email, CredentialStore, NewUser, StoreError};

/// Input to [`AuthService::signup`].
#[derive(Clone)]
pub struct SignupParams {
    pub email: String,
    pub password: String,
    pub name: String,
    pub occupation: String,
}

/// Successful signup acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Confirmation {
    pub code: String,
    pub message: String,
    pub user_guid: Uuid,
}

impl Confirmation {
    fn created(user_guid: Uuid) -> Self {
        Self {
            code: "01".to_string(),
            message: "Successfully created".to_string(),
            user_guid,
        }
    }
}

/// Orchestrates the credential backend and the store.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    backend: Arc<dyn CredentialBackend>,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, backend: Arc<dyn CredentialBackend>) -> Self {
        Self { store, backend }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    /// Register a new account.
    ///
    /// # Errors
    /// - `EmailAlreadyUsed` if an active user holds the email, including when
    ///   a concurrent signup wins the store's uniqueness check
    /// - `Infra` on store, hashing or provider failure
    pub async fn signup(&self, params: SignupParams) -> Result<Confirmation, AuthError> {
        let email = normalize_email(&params.email);

        let existing = self
            .store
            .get_user_by_email(&email)
            .map_err(|e| AuthError::infra("getting user by email", e))?;
        if existing.is_some() {
            debug!("signup rejected: email already registered");
            return Err(AuthError::EmailAlreadyUsed);
        }

        let registration = self.backend.register(&email, &params.password).await?;
        let guid = registration.guid;

        let inserted = self.store.insert_user(NewUser {
            guid,
            email: Some(email),
            password_hash: registration.password_hash,
            name: params.name,
            occupation: params.occupation,
        });

        match inserted {
            Ok(user) => {
                info!(
                    user_guid = %user.guid,
                    backend = self.backend.kind().as_str(),
                    "user signed up"
                );
                Ok(Confirmation::created(user.guid))
            }
            Err(StoreError::EmailTaken) => {
                if self.backend.kind() == BackendKind::Delegated {
                    warn!(
                        user_guid = %guid,
                        "lost signup race after provider registration; remote account has no local user"
                    );
                }
                Err(AuthError::EmailAlreadyUsed)
            }
            Err(e) => {
                // A remote registration cannot be rolled back from here.
                if self.backend.kind() == BackendKind::Delegated {
                    error!(
                        user_guid = %guid,
                        error = %e,
                        "provider account created but local insert failed; needs manual reconciliation"
                    );
                }
                Err(AuthError::infra("inserting user", e))
            }
        }
    }

    /// Verify credentials and open a session.
    ///
    /// # Errors
    /// - `NoSuchUser` if no active account has the email (local backend)
    /// - `InvalidCredentials` on a wrong password
    /// - `Infra` on store or provider failure
    pub async fn login(&self, email: &str, password: &str) -> Result<Uuid, AuthError> {
        let email = normalize_email(email);

        let guid = match self.backend.authenticate(&email, password).await {
            Ok(guid) => guid,
            Err(e) => {
                if e.is_business() {
                    debug!(error_code = e.error_code(), "login rejected");
                }
                return Err(e);
            }
        };

        self.store
            .insert_session(guid)
            .map_err(|e| AuthError::infra("inserting session", e))?;

        info!(user_guid = %guid, "user logged in");
        Ok(guid)
    }

    /// Resolve the principal for `guid` from its session.
    ///
    /// No session is a normal state and yields `Anonymous`.
    pub fn auth(&self, guid: Uuid) -> Result<Principal, AuthError> {
        let session = self
            .store
            .get_session(guid)
            .map_err(|e| AuthError::infra("checking is user auth", e))?;

        Ok(match session {
            Some(_) => Principal::Identified(guid),
            None => Principal::Anonymous,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mockito::Server;
    use serde_json::json;

    use super::*;
    use crate::auth::backend::{DelegatedBackend, LocalBackend, Registration};
    use crate::auth::password::{HashCost, PasswordHasher};
    use crate::auth::provider::IdentityProviderClient;
    use crate::storage::{InMemoryStore, ProfileUpdate, Session, StoreResult, User};

    fn cheap_hasher() -> PasswordHasher {
        PasswordHasher::new(HashCost {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    fn local_service() -> (AuthService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let backend = Arc::new(LocalBackend::new(store.clone(), cheap_hasher()));
        (AuthService::new(store.clone(), backend), store)
    }

    fn signup(email: &str, password: &str) -> SignupParams {
        SignupParams {
            email: email.to_string(),
            password: password.to_string(),
            name: "Ada".to_string(),
            occupation: "Engineer".to_string(),
        }
    }

    #[tokio::test]
    async fn second_signup_with_same_email_fails() {
        let (service, _store) = local_service();
        let confirmation = service.signup(signup("a@b.com", "pw1")).await.unwrap();
        assert_eq!(confirmation.code, "01");

        let result = service.signup(signup("a@b.com", "pw2")).await;
        assert!(matches!(result, Err(AuthError::EmailAlreadyUsed)));
    }

    #[tokio::test]
    async fn email_comparison_ignores_case_and_whitespace() {
        let (service, _store) = local_service();
        service.signup(signup("A@B.com", "pw1")).await.unwrap();

        let result = service.signup(signup(" a@b.COM ", "pw2")).await;
        assert!(matches!(result, Err(AuthError::EmailAlreadyUsed)));
        assert!(service.login("a@b.com", "pw1").await.is_ok());
    }

    #[tokio::test]
    async fn password_is_never_stored_raw() {
        let (service, store) = local_service();
        service.signup(signup("a@b.com", "pw1")).await.unwrap();

        let user = store.get_user_by_email("a@b.com").unwrap().unwrap();
        let hash = user.password_hash.unwrap();
        assert_ne!(hash.as_str(), "pw1");
        assert!(!hash.as_str().contains("pw1"));
    }

    #[tokio::test]
    async fn login_opens_session_and_auth_resolves_it() {
        let (service, _store) = local_service();
        let confirmation = service.signup(signup("a@b.com", "pw1")).await.unwrap();

        assert_eq!(
            service.auth(confirmation.user_guid).unwrap(),
            Principal::Anonymous
        );

        let guid = service.login("a@b.com", "pw1").await.unwrap();
        assert_eq!(guid, confirmation.user_guid);
        assert_eq!(service.auth(guid).unwrap(), Principal::Identified(guid));

        // Logging in again is not an error
        assert_eq!(service.login("a@b.com", "pw1").await.unwrap(), guid);
    }

    #[tokio::test]
    async fn wrong_password_creates_no_session() {
        let (service, store) = local_service();
        let confirmation = service.signup(signup("a@b.com", "pw1")).await.unwrap();

        let result = service.login("a@b.com", "wrong").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert_eq!(store.session_count(), 0);
        assert_eq!(
            service.auth(confirmation.user_guid).unwrap(),
            Principal::Anonymous
        );
    }

    #[tokio::test]
    async fn unknown_email_is_no_such_user() {
        let (service, _store) = local_service();
        let result = service.login("nobody@b.com", "pw").await;
        assert!(matches!(result, Err(AuthError::NoSuchUser)));
    }

    #[tokio::test]
    async fn soft_deleted_email_can_sign_up_again() {
        let (service, store) = local_service();
        let first = service.signup(signup("a@b.com", "pw1")).await.unwrap();
        store.delete_user(first.user_guid).unwrap();

        assert!(matches!(
            service.login("a@b.com", "pw1").await,
            Err(AuthError::NoSuchUser)
        ));

        let second = service.signup(signup("a@b.com", "pw2")).await.unwrap();
        assert_ne!(first.user_guid, second.user_guid);
        assert_eq!(
            service.login("a@b.com", "pw2").await.unwrap(),
            second.user_guid
        );
    }

    #[tokio::test]
    async fn deleted_account_loses_its_session() {
        let (service, store) = local_service();
        service.signup(signup("a@b.com", "pw1")).await.unwrap();
        let guid = service.login("a@b.com", "pw1").await.unwrap();
        assert_eq!(service.auth(guid).unwrap(), Principal::Identified(guid));

        store.delete_user(guid).unwrap();
        assert_eq!(service.auth(guid).unwrap(), Principal::Anonymous);

        // A new owner of the email does not revive the old identity
        service.signup(signup("a@b.com", "pw2")).await.unwrap();
        service.login("a@b.com", "pw2").await.unwrap();
        assert_eq!(service.auth(guid).unwrap(), Principal::Anonymous);
    }

    /// Store whose email lookup misses, so the insert hits the uniqueness
    /// constraint the way a concurrent signup would.
    struct RacingStore {
        inner: InMemoryStore,
    }

    impl CredentialStore for RacingStore {
        fn get_user_by_email(&self, _email: &str) -> StoreResult<Option<User>> {
            Ok(None)
        }
        fn get_user(&self, guid: Uuid) -> StoreResult<Option<User>> {
            self.inner.get_user(guid)
        }
        fn get_session(&self, guid: Uuid) -> StoreResult<Option<Session>> {
            self.inner.get_session(guid)
        }
        fn insert_user(&self, user: NewUser) -> StoreResult<User> {
            self.inner.insert_user(user)
        }
        fn insert_session(&self, guid: Uuid) -> StoreResult<Session> {
            self.inner.insert_session(guid)
        }
        fn update_user(&self, guid: Uuid, update: &ProfileUpdate) -> StoreResult<User> {
            self.inner.update_user(guid, update)
        }
        fn delete_user(&self, guid: Uuid) -> StoreResult<()> {
            self.inner.delete_user(guid)
        }
        fn health_check(&self) -> StoreResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn uniqueness_violation_maps_to_email_already_used() {
        let store = Arc::new(RacingStore {
            inner: InMemoryStore::new(),
        });
        let backend = Arc::new(LocalBackend::new(store.clone(), cheap_hasher()));
        let service = AuthService::new(store, backend);

        service.signup(signup("a@b.com", "pw1")).await.unwrap();
        let result = service.signup(signup("a@b.com", "pw2")).await;
        assert!(matches!(result, Err(AuthError::EmailAlreadyUsed)));
    }

    /// Backend that hands out a fixed GUID, to force a store conflict.
    struct FixedGuidBackend(Uuid);

    #[async_trait::async_trait]
    impl CredentialBackend for FixedGuidBackend {
        fn kind(&self) -> BackendKind {
            BackendKind::Delegated
        }
        async fn register(&self, _email: &str, _password: &str) -> Result<Registration, AuthError> {
            Ok(Registration {
                guid: self.0,
                password_hash: None,
            })
        }
        async fn authenticate(&self, _email: &str, _password: &str) -> Result<Uuid, AuthError> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn failed_local_insert_after_remote_signup_is_surfaced() {
        let store = Arc::new(InMemoryStore::new());
        let guid = Uuid::new_v4();
        let service = AuthService::new(store.clone(), Arc::new(FixedGuidBackend(guid)));

        service.signup(signup("a@b.com", "pw1")).await.unwrap();
        let result = service.signup(signup("c@d.com", "pw1")).await;
        assert!(matches!(result, Err(AuthError::Infra { .. })));
        assert!(store.get_user_by_email("c@d.com").unwrap().is_none());
    }

    #[tokio::test]
    async fn delegated_signup_and_login() {
        let mut server = Server::new_async().await;
        let guid = Uuid::new_v4();
        server
            .mock("POST", "/api/signup")
            .with_status(200)
            .with_body(json!({"user_guid": guid}).to_string())
            .create_async()
            .await;
        server
            .mock("POST", "/api/login")
            .with_status(200)
            .with_body(json!({"user_guid": guid}).to_string())
            .create_async()
            .await;

        let store = Arc::new(InMemoryStore::new());
        let client = IdentityProviderClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let service = AuthService::new(store.clone(), Arc::new(DelegatedBackend::new(client)));

        let confirmation = service.signup(signup("a@b.com", "pw1")).await.unwrap();
        assert_eq!(confirmation.user_guid, guid);

        let user = store.get_user(guid).unwrap().unwrap();
        assert!(user.password_hash.is_none());
        assert_eq!(user.email.as_deref(), Some("a@b.com"));

        assert_eq!(service.login("a@b.com", "pw1").await.unwrap(), guid);
        assert_eq!(service.auth(guid).unwrap(), Principal::Identified(guid));
    }
}
