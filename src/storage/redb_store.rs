// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded account database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: guid → serialized User
//! - `email_index`: normalised email → guid (active users only)
//! - `sessions`: guid → serialized Session

use std::path::Path;

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use uuid::Uuid;

use super::{CredentialStore, NewUser, ProfileUpdate, Session, StoreError, StoreResult, User};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: guid → serialized User (JSON bytes).
const USERS: TableDefinition<&str, &[u8]> = TableDefinition::new("users");

/// Unique index: normalised email → guid of the active owner.
const EMAIL_INDEX: TableDefinition<&str, &str> = TableDefinition::new("email_index");

/// Sessions: guid → serialized Session (JSON bytes).
const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

// =============================================================================
// RedbStore
// =============================================================================

/// Durable credential store.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(EMAIL_INDEX)?;
            let _ = write_txn.open_table(SESSIONS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}

fn parse_guid(raw: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| StoreError::Corrupt(format!("bad guid {raw:?}: {e}")))
}

impl CredentialStore for RedbStore {
    fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(EMAIL_INDEX)?;
        let guid = match index.get(email)? {
            Some(value) => parse_guid(value.value())?,
            None => return Ok(None),
        };

        let users = read_txn.open_table(USERS)?;
        let key = guid.to_string();
        let user: User = match users.get(key.as_str())? {
            Some(value) => serde_json::from_slice(value.value())?,
            None => {
                return Err(StoreError::Corrupt(format!(
                    "email index points at missing user {key}"
                )))
            }
        };

        Ok((!user.is_deleted).then_some(user))
    }

    fn get_user(&self, guid: Uuid) -> StoreResult<Option<User>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USERS)?;
        match table.get(guid.to_string().as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn get_session(&self, guid: Uuid) -> StoreResult<Option<Session>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SESSIONS)?;
        match table.get(guid.to_string().as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let user = user.into_user();
        let key = user.guid.to_string();
        let json = serde_json::to_vec(&user)?;

        // Uniqueness checks and the insert share one write transaction;
        // redb serialises writers, so the check cannot race.
        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            if users.get(key.as_str())?.is_some() {
                return Err(StoreError::AlreadyExists(format!("User {key}")));
            }

            if let Some(email) = &user.email {
                let mut index = write_txn.open_table(EMAIL_INDEX)?;
                if index.get(email.as_str())?.is_some() {
                    return Err(StoreError::EmailTaken);
                }
                index.insert(email.as_str(), key.as_str())?;
            }

            users.insert(key.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;

        Ok(user)
    }

    fn insert_session(&self, guid: Uuid) -> StoreResult<Session> {
        let key = guid.to_string();

        let write_txn = self.db.begin_write()?;
        let session = {
            let mut table = write_txn.open_table(SESSIONS)?;
            let existing = table.get(key.as_str())?.map(|v| v.value().to_vec());
            match existing {
                Some(bytes) => serde_json::from_slice(&bytes)?,
                None => {
                    let session = Session::new(guid);
                    let json = serde_json::to_vec(&session)?;
                    table.insert(key.as_str(), json.as_slice())?;
                    session
                }
            }
        };
        write_txn.commit()?;

        Ok(session)
    }

    fn update_user(&self, guid: Uuid, update: &ProfileUpdate) -> StoreResult<User> {
        let key = guid.to_string();

        let write_txn = self.db.begin_write()?;
        let user = {
            let mut table = write_txn.open_table(USERS)?;

            // Read existing value and deserialize before mutating
            let existing_bytes = table
                .get(key.as_str())?
                .map(|v| v.value().to_vec())
                .ok_or_else(|| StoreError::NotFound(format!("User {key}")))?;

            let mut user: User = serde_json::from_slice(&existing_bytes)?;
            if user.is_deleted {
                return Err(StoreError::NotFound(format!("User {key}")));
            }

            user.name = update.name.clone();
            user.occupation = update.occupation.clone();
            user.updated_at = Utc::now();

            let json = serde_json::to_vec(&user)?;
            table.insert(key.as_str(), json.as_slice())?;
            user
        };
        write_txn.commit()?;

        Ok(user)
    }

    fn delete_user(&self, guid: Uuid) -> StoreResult<()> {
        let key = guid.to_string();

        let write_txn = self.db.begin_write()?;
        {
            let mut users = write_txn.open_table(USERS)?;
            let existing_bytes = users
                .get(key.as_str())?
                .map(|v| v.value().to_vec())
                .ok_or_else(|| StoreError::NotFound(format!("User {key}")))?;

            let mut user: User = serde_json::from_slice(&existing_bytes)?;
            if user.is_deleted {
                return Ok(());
            }

            user.is_deleted = true;
            user.updated_at = Utc::now();
            let json = serde_json::to_vec(&user)?;
            users.insert(key.as_str(), json.as_slice())?;

            if let Some(email) = &user.email {
                let mut index = write_txn.open_table(EMAIL_INDEX)?;
                let owner = index.get(email.as_str())?.map(|v| v.value().to_string());
                if owner.as_deref() == Some(key.as_str()) {
                    index.remove(email.as_str())?;
                }
            }

            let mut sessions = write_txn.open_table(SESSIONS)?;
            sessions.remove(key.as_str())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    fn health_check(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(USERS)?;
        Ok(())
    }
}
