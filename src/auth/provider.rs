// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for a delegated identity provider.
//!
//! ## Protocol
//!
//! - `POST {base}/api/login` and `POST {base}/api/signup`
//! - Request body: `{"email": "...", "password": "..."}`
//! - Success (2xx) body: `{"user_guid": "<uuid>"}`
//! - 401 means the provider refused the credentials; any other status is a
//!   provider fault.
//!
//! Request bodies carry the raw password and are never logged.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;
use uuid::Uuid;

const LOGIN_ENDPOINT: &str = "api/login";
const SIGNUP_ENDPOINT: &str = "api/signup";

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("identity provider URL is invalid: {0}")]
    Url(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("identity provider rejected the credentials")]
    Unauthorized,

    #[error("identity provider answered {endpoint} with HTTP {status}")]
    UnexpectedStatus { endpoint: &'static str, status: u16 },

    #[error("identity provider request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("identity provider response from {endpoint} was invalid: {source}")]
    InvalidResponse {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Serialize)]
struct CredentialsBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct SubjectResponse {
    user_guid: Uuid,
}

#[derive(Debug, Clone)]
pub struct IdentityProviderClient {
    base_url: Url,
    http: Client,
}

impl IdentityProviderClient {
    /// Create a client for the provider rooted at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let mut base_url = Url::parse(base_url)?;
        // Keep any path prefix when joining endpoint paths.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ProviderError::Client)?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Verify credentials; returns the subject GUID.
    pub async fn login(&self, email: &str, password: &str) -> Result<Uuid, ProviderError> {
        self.post_credentials(LOGIN_ENDPOINT, email, password).await
    }

    /// Register credentials; returns the new subject GUID.
    pub async fn signup(&self, email: &str, password: &str) -> Result<Uuid, ProviderError> {
        self.post_credentials(SIGNUP_ENDPOINT, email, password).await
    }

    async fn post_credentials(
        &self,
        endpoint: &'static str,
        email: &str,
        password: &str,
    ) -> Result<Uuid, ProviderError> {
        let url = self.base_url.join(endpoint)?;
        debug!(%url, "calling identity provider");

        let response = self
            .http
            .post(url)
            .json(&CredentialsBody { email, password })
            .send()
            .await
            .map_err(|source| ProviderError::Transport { endpoint, source })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Unauthorized);
        }
        if !status.is_success() {
            warn!(
                endpoint,
                status = status.as_u16(),
                "identity provider returned non-success status"
            );
            return Err(ProviderError::UnexpectedStatus {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body: SubjectResponse = response
            .json()
            .await
            .map_err(|source| ProviderError::InvalidResponse { endpoint, source })?;

        Ok(body.user_guid)
    }
}
