// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Records persisted by the credential store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::PasswordHash;

/// A user account row.
///
/// Rows are never physically removed; deletion sets `is_deleted`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Immutable identity, generated at creation (or assigned by the
    /// delegated identity provider).
    pub guid: Uuid,
    /// Normalised login email. `None` for profiles created without
    /// credentials.
    pub email: Option<String>,
    /// Argon2 PHC string. `None` when credentials live at the delegated
    /// provider.
    pub password_hash: Option<PasswordHash>,
    pub name: String,
    pub occupation: String,
    /// Soft-delete flag
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Proof that an identity has successfully logged in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user_guid: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_guid: Uuid) -> Self {
        Self {
            user_guid,
            created_at: Utc::now(),
        }
    }
}

/// Fields required to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub guid: Uuid,
    pub email: Option<String>,
    pub password_hash: Option<PasswordHash>,
    pub name: String,
    pub occupation: String,
}

impl NewUser {
    pub(crate) fn into_user(self) -> User {
        let now = Utc::now();
        User {
            guid: self.guid,
            email: self.email,
            password_hash: self.password_hash,
            name: self.name,
            occupation: self.occupation,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Mutable profile fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: String,
    pub occupation: String,
}

/// Canonical form used for every email comparison and index key.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
