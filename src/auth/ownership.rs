// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership checks for per-user resources.
//!
//! Every read, update or delete of a per-user resource passes through
//! [`ResourceAuthorizer::authorize_owner`] before the store is touched.

use tracing::debug;
use uuid::Uuid;

use super::{AuthError, Principal};

pub struct ResourceAuthorizer;

impl ResourceAuthorizer {
    /// Allow only the principal that owns the resource.
    ///
    /// # Errors
    /// `NoPermission` for `Anonymous` or a different identity.
    pub fn authorize_owner(principal: &Principal, owner: Uuid) -> Result<Uuid, AuthError> {
        match principal {
            Principal::Identified(guid) if *guid == owner => Ok(*guid),
            Principal::Identified(guid) => {
                debug!(user_guid = %guid, owner = %owner, "ownership check denied");
                Err(AuthError::NoPermission)
            }
            Principal::Anonymous => {
                debug!(owner = %owner, "anonymous caller denied");
                Err(AuthError::NoPermission)
            }
        }
    }

    /// Allow any identified principal; nothing exists yet to own.
    pub fn authorize_create(principal: &Principal) -> Result<Uuid, AuthError> {
        principal.guid().ok_or_else(|| {
            debug!("anonymous caller denied create");
            AuthError::NoPermission
        })
    }
}
