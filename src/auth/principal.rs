// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The resolved caller identity for one request.
//!
//! Handlers take `Principal` as an explicit extractor argument and pass it
//! on to every service call that needs it:
//!
//! ```rust,ignore
//! async fn get_user(principal: Principal, State(state): State<AppState>) { ... }
//! ```

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Caller identity, set once by the identity middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Principal {
    #[default]
    Anonymous,
    Identified(Uuid),
}

impl Principal {
    pub fn guid(&self) -> Option<Uuid> {
        match self {
            Principal::Anonymous => None,
            Principal::Identified(guid) => Some(*guid),
        }
    }

    pub fn is_identified(&self) -> bool {
        matches!(self, Principal::Identified(_))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Principal {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Requests that bypassed the middleware carry no identity.
        Ok(parts
            .extensions
            .get::<Principal>()
            .copied()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts() -> Parts {
        Request::builder().uri("/test").body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn defaults_to_anonymous_without_extension() {
        let mut parts = parts();
        let principal = Principal::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(principal, Principal::Anonymous);
        assert!(principal.guid().is_none());
    }

    #[tokio::test]
    async fn reads_principal_from_extensions() {
        let guid = Uuid::new_v4();
        let mut parts = parts();
        parts.extensions.insert(Principal::Identified(guid));

        let principal = Principal::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(principal.is_identified());
        assert_eq!(principal.guid(), Some(guid));
    }
}
