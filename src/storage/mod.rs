// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Credential Storage Module
//!
//! Persists user accounts and login sessions behind the narrow
//! [`CredentialStore`] interface consumed by the auth core.
//!
//! ## Implementations
//!
//! - [`RedbStore`] - embedded ACID database file under `DATA_DIR`
//! - [`InMemoryStore`] - process-local maps, used by tests and local runs
//!
//! ## Uniqueness
//!
//! The store is the authority for email uniqueness. Both implementations
//! check and claim the email index inside a single critical section
//! (a redb write transaction, or one lock acquisition), so two concurrent
//! signups for the same email cannot both succeed. The index only covers
//! users that are not soft-deleted.

pub mod memory;
pub mod records;
pub mod redb_store;

use uuid::Uuid;

pub use memory::InMemoryStore;
pub use records::{normalize_email, NewUser, ProfileUpdate, Session, User};
pub use redb_store::RedbStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email is already registered")]
    EmailTaken,

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage contract for accounts and sessions.
///
/// Calls are synchronous; implementations must be safe to share across
/// concurrent requests.
pub trait CredentialStore: Send + Sync {
    /// Find the active (not soft-deleted) user registered under `email`.
    ///
    /// `email` must already be normalised with [`normalize_email`].
    fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Find a user by GUID, including soft-deleted rows.
    fn get_user(&self, guid: Uuid) -> StoreResult<Option<User>>;

    /// Find the session recorded for `guid`.
    fn get_session(&self, guid: Uuid) -> StoreResult<Option<Session>>;

    /// Insert a user.
    ///
    /// # Errors
    /// `StoreError::EmailTaken` if an active user already holds the email,
    /// `StoreError::AlreadyExists` if the GUID is already used.
    fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    /// Record that `guid` logged in. Returns the existing session when one
    /// is already present.
    fn insert_session(&self, guid: Uuid) -> StoreResult<Session>;

    /// Replace the profile fields of an active user.
    ///
    /// # Errors
    /// `StoreError::NotFound` if the user is missing or soft-deleted.
    fn update_user(&self, guid: Uuid, update: &ProfileUpdate) -> StoreResult<User>;

    /// Soft-delete a user, release its email and drop its session.
    /// Deleting an already deleted user succeeds.
    ///
    /// # Errors
    /// `StoreError::NotFound` if no row exists for `guid`.
    fn delete_user(&self, guid: Uuid) -> StoreResult<()>;

    /// Verify the backing storage is usable.
    fn health_check(&self) -> StoreResult<()>;
}
