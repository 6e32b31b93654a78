// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account Gate - credential authentication and ownership service
//!
//! Signup, login and session checks for user accounts, with the caller's
//! identity carried between services in the `X-User` header.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Credential backends, identity middleware, ownership checks
//! - `storage` - Credential store (redb, in-memory)
//! - `users` - Per-user profile operations

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;
pub mod users;
