// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-user profile operations.
//!
//! Every operation authorizes the principal before the store is read.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::auth::{AuthError, Principal, ResourceAuthorizer};
use crate::models::{StatusResponse, UserData, UserProfileRequest};
use crate::storage::{CredentialStore, NewUser, ProfileUpdate, StoreError};

fn store_error(operation: &'static str, error: StoreError) -> AuthError {
    match error {
        StoreError::NotFound(_) => AuthError::NoSuchUser,
        other => AuthError::infra(operation, other),
    }
}

pub struct UserService {
    store: Arc<dyn CredentialStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    /// Read a profile. Soft-deleted profiles are returned with `is_deleted`.
    pub fn get_user(&self, principal: &Principal, guid: Uuid) -> Result<UserData, AuthError> {
        ResourceAuthorizer::authorize_owner(principal, guid)?;

        self.store
            .get_user(guid)
            .map_err(|e| AuthError::infra("getting user", e))?
            .map(UserData::from)
            .ok_or(AuthError::NoSuchUser)
    }

    /// Merge the provided fields into the profile.
    ///
    /// # Errors
    /// `NoSuchUser` when the user is missing or soft-deleted.
    pub fn update_user(
        &self,
        principal: &Principal,
        guid: Uuid,
        request: UserProfileRequest,
    ) -> Result<StatusResponse, AuthError> {
        ResourceAuthorizer::authorize_owner(principal, guid)?;

        let current = self
            .store
            .get_user(guid)
            .map_err(|e| AuthError::infra("getting user", e))?
            .filter(|user| !user.is_deleted)
            .ok_or(AuthError::NoSuchUser)?;

        let update = ProfileUpdate {
            name: request.name.unwrap_or(current.name),
            occupation: request.occupation.unwrap_or(current.occupation),
        };

        self.store
            .update_user(guid, &update)
            .map_err(|e| store_error("updating user", e))?;

        info!(user_guid = %guid, "user profile updated");
        Ok(StatusResponse::updated())
    }

    /// Soft-delete the profile. Deleting twice succeeds.
    pub fn delete_user(&self, principal: &Principal, guid: Uuid) -> Result<StatusResponse, AuthError> {
        ResourceAuthorizer::authorize_owner(principal, guid)?;

        self.store
            .delete_user(guid)
            .map_err(|e| store_error("deleting user", e))?;

        info!(user_guid = %guid, "user deleted");
        Ok(StatusResponse::deleted())
    }

    /// Create a profile without credentials under a fresh GUID.
    pub fn create_user(
        &self,
        principal: &Principal,
        request: UserProfileRequest,
    ) -> Result<(Uuid, StatusResponse), AuthError> {
        let creator = ResourceAuthorizer::authorize_create(principal)?;

        let user = self
            .store
            .insert_user(NewUser {
                guid: Uuid::new_v4(),
                email: None,
                password_hash: None,
                name: request.name.unwrap_or_default(),
                occupation: request.occupation.unwrap_or_default(),
            })
            .map_err(|e| AuthError::infra("inserting user", e))?;

        info!(user_guid = %user.guid, created_by = %creator, "user profile created");
        Ok((user.guid, StatusResponse::created()))
    }
}
