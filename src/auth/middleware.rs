// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Identity injection middleware.
//!
//! Reads the caller-asserted identity from the `X-User` header and attaches a
//! [`Principal`] to the request extensions. The header is trusted as-is: it
//! must be set or stripped by a perimeter component the deployer controls.
//!
//! ## Header handling
//!
//! | Header | Principal |
//! |--------|-----------|
//! | absent or empty | `Anonymous` |
//! | a non-nil UUID | `Identified(guid)` |
//! | anything else | per [`IdentityHeaderPolicy`] |

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;
use uuid::Uuid;

use super::{AuthError, Principal};

/// Header carrying the caller identity, in both directions.
pub const IDENTITY_HEADER: &str = "x-user";

/// What to do with an identity header that does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentityHeaderPolicy {
    /// Continue as `Anonymous`
    #[default]
    Downgrade,
    /// Answer 400 `malformed_identity`
    Reject,
}

impl IdentityHeaderPolicy {
    /// Parse the `IDENTITY_HEADER_POLICY` value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "downgrade" => Some(Self::Downgrade),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Downgrade => "downgrade",
            Self::Reject => "reject",
        }
    }
}

fn parse_identity(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok().filter(|guid| !guid.is_nil())
}

/// Resolve the principal asserted by `headers`.
///
/// # Errors
/// Returns `MalformedIdentity` only under [`IdentityHeaderPolicy::Reject`].
pub fn resolve_principal(
    headers: &HeaderMap,
    policy: IdentityHeaderPolicy,
) -> Result<Principal, AuthError> {
    let Some(value) = headers.get(IDENTITY_HEADER) else {
        return Ok(Principal::Anonymous);
    };

    if value.is_empty() {
        return Ok(Principal::Anonymous);
    }

    match value.to_str().ok().and_then(parse_identity) {
        Some(guid) => Ok(Principal::Identified(guid)),
        None => match policy {
            IdentityHeaderPolicy::Downgrade => {
                debug!("discarding malformed identity header");
                Ok(Principal::Anonymous)
            }
            IdentityHeaderPolicy::Reject => Err(AuthError::MalformedIdentity),
        },
    }
}

/// Attach the request's [`Principal`].
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/user/{guid}", get(get_user))
///     .layer(axum::middleware::from_fn_with_state(
///         IdentityHeaderPolicy::Downgrade,
///         identity_middleware,
///     ));
/// ```
pub async fn identity_middleware(
    State(policy): State<IdentityHeaderPolicy>,
    mut request: Request,
    next: Next,
) -> Response {
    match resolve_principal(request.headers(), policy) {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
