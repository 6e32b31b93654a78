// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory credential store.
//!
//! Nothing survives a restart. Used by the test suites and by embedders
//! that need no durability.

use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{CredentialStore, NewUser, ProfileUpdate, Session, StoreError, StoreResult, User};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    email_index: HashMap<String, Uuid>,
    sessions: HashMap<Uuid, Session>,
}

#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored sessions.
    pub fn session_count(&self) -> usize {
        self.tables.read().sessions.len()
    }
}

impl CredentialStore for InMemoryStore {
    fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read();
        Ok(tables
            .email_index
            .get(email)
            .and_then(|guid| tables.users.get(guid))
            .filter(|user| !user.is_deleted)
            .cloned())
    }

    fn get_user(&self, guid: Uuid) -> StoreResult<Option<User>> {
        Ok(self.tables.read().users.get(&guid).cloned())
    }

    fn get_session(&self, guid: Uuid) -> StoreResult<Option<Session>> {
        Ok(self.tables.read().sessions.get(&guid).cloned())
    }

    fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write();

        if tables.users.contains_key(&user.guid) {
            return Err(StoreError::AlreadyExists(format!("User {}", user.guid)));
        }
        if let Some(email) = &user.email {
            if tables.email_index.contains_key(email) {
                return Err(StoreError::EmailTaken);
            }
        }

        let user = user.into_user();
        if let Some(email) = &user.email {
            tables.email_index.insert(email.clone(), user.guid);
        }
        tables.users.insert(user.guid, user.clone());
        Ok(user)
    }

    fn insert_session(&self, guid: Uuid) -> StoreResult<Session> {
        let mut tables = self.tables.write();
        Ok(tables
            .sessions
            .entry(guid)
            .or_insert_with(|| Session::new(guid))
            .clone())
    }

    fn update_user(&self, guid: Uuid, update: &ProfileUpdate) -> StoreResult<User> {
        let mut tables = self.tables.write();
        let user = tables
            .users
            .get_mut(&guid)
            .filter(|user| !user.is_deleted)
            .ok_or_else(|| StoreError::NotFound(format!("User {guid}")))?;

        user.name = update.name.clone();
        user.occupation = update.occupation.clone();
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    fn delete_user(&self, guid: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let user = tables
            .users
            .get_mut(&guid)
            .ok_or_else(|| StoreError::NotFound(format!("User {guid}")))?;

        if user.is_deleted {
            return Ok(());
        }
        user.is_deleted = true;
        user.updated_at = Utc::now();
        let email = user.email.clone();

        if let Some(email) = email {
            if tables.email_index.get(&email) == Some(&guid) {
                tables.email_index.remove(&email);
            }
        }
        tables.sessions.remove(&guid);
        Ok(())
    }

    fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}
