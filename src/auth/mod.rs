// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Credential authentication and request-scoped authorization.
//!
//! ## Flow
//!
//! 1. `POST /public/signup` registers credentials through the configured
//!    [`CredentialBackend`] and inserts the user row
//! 2. `POST /public/login` verifies credentials, records a session and
//!    returns the user GUID in the `X-User` header
//! 3. A perimeter component forwards `X-User` on later requests;
//!    [`identity_middleware`] turns it into a [`Principal`]
//! 4. Per-user operations call [`ResourceAuthorizer`] before touching the
//!    store
//!
//! ## Security
//!
//! - Passwords are hashed with Argon2id; raw passwords are never stored or
//!   logged
//! - `X-User` is not verified cryptographically and must only be trusted
//!   behind a gateway that sets or strips it
//! - Sessions have no expiry or revocation

pub mod backend;
pub mod error;
pub mod middleware;
pub mod ownership;
pub mod password;
pub mod principal;
pub mod provider;
pub mod service;

pub use backend::{BackendKind, CredentialBackend, DelegatedBackend, LocalBackend};
pub use error::{AuthError, InfraError};
pub use middleware::{identity_middleware, IdentityHeaderPolicy, IDENTITY_HEADER};
pub use ownership::ResourceAuthorizer;
pub use password::{HashCost, HashError, PasswordHash, PasswordHasher};
pub use principal::Principal;
pub use provider::{IdentityProviderClient, ProviderError};
pub use service::{AuthService, Confirmation, SignupParams};
