// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API.
//!
//! Request types that carry a password implement `Debug` by hand so the
//! password can never reach a log line.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::User;

/// Success code shared by every status response.
pub const STATUS_OK_CODE: &str = "01";

// =============================================================================
// Auth Models
// =============================================================================

#[derive(Clone, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub occupation: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("name", &self.name)
            .field("occupation", &self.occupation)
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of a successful login or session check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub user_guid: Uuid,
}

// =============================================================================
// Status Models
// =============================================================================

/// `{code, message}` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusResponse {
    pub code: String,
    pub message: String,
}

impl StatusResponse {
    fn with_message(message: &str) -> Self {
        Self {
            code: STATUS_OK_CODE.to_string(),
            message: message.to_string(),
        }
    }

    pub fn ok() -> Self {
        Self::with_message("OK")
    }

    pub fn created() -> Self {
        Self::with_message("Successfully created")
    }

    pub fn updated() -> Self {
        Self::with_message("Successfully updated")
    }

    pub fn deleted() -> Self {
        Self::with_message("Successfully deleted")
    }
}

// =============================================================================
// User Models
// =============================================================================

/// Public view of a user profile.
///
/// Email and password hash are never exposed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserData {
    pub guid: Uuid,
    pub name: String,
    pub occupation: String,
    pub is_deleted: bool,
}

impl From<User> for UserData {
    fn from(user: User) -> Self {
        Self {
            guid: user.guid,
            name: user.name,
            occupation: user.occupation,
            is_deleted: user.is_deleted,
        }
    }
}

/// Profile fields for create and update; omitted fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_debug_hides_password() {
        let login: LoginRequest =
            serde_json::from_str(r#"{"email":"a@b.com","password":"hunter2"}"#).unwrap();
        let debug = format!("{login:?}");
        assert!(debug.contains("a@b.com"));
        assert!(!debug.contains("hunter2"));

        let signup: SignupRequest =
            serde_json::from_str(r#"{"email":"a@b.com","password":"hunter2"}"#).unwrap();
        assert!(signup.name.is_empty());
        assert!(!format!("{signup:?}").contains("hunter2"));
    }

    #[test]
    fn user_data_omits_credentials() {
        let user = crate::storage::NewUser {
            guid: Uuid::new_v4(),
            email: Some("a@b.com".to_string()),
            password_hash: None,
            name: "Ada".to_string(),
            occupation: "Engineer".to_string(),
        }
        .into_user();

        let json = serde_json::to_value(UserData::from(user.clone())).unwrap();
        assert_eq!(json["guid"], user.guid.to_string());
        assert_eq!(json["name"], "Ada");
        assert!(json.get("email").is_none());
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn status_responses_share_code() {
        assert_eq!(StatusResponse::ok().code, "01");
        assert_eq!(StatusResponse::deleted().message, "Successfully deleted");
    }
}
