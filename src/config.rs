// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup. Invalid
//! values abort startup with a [`ConfigError`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding `accounts.redb` | `./data` |
//! | `CREDENTIAL_BACKEND` | `local` or `delegated` | `local` |
//! | `IDENTITY_PROVIDER_URL` | Base URL of the identity provider | Required when delegated |
//! | `IDENTITY_PROVIDER_TIMEOUT_SECS` | Provider request timeout | `10` |
//! | `IDENTITY_HEADER_POLICY` | Malformed `X-User` handling (`downgrade` or `reject`) | `downgrade` |
//! | `ARGON2_MEMORY_KIB` | Argon2 memory cost | argon2 default |
//! | `ARGON2_ITERATIONS` | Argon2 time cost | argon2 default |
//! | `ARGON2_PARALLELISM` | Argon2 lanes | argon2 default |
//! | `REQUEST_TIMEOUT_SECS` | Per-request timeout | `30` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use crate::auth::{HashCost, IdentityHeaderPolicy};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Directory for the account database. Created at startup if missing.
pub const DATA_DIR_ENV: &str = "DATA_DIR";

pub const CREDENTIAL_BACKEND_ENV: &str = "CREDENTIAL_BACKEND";
pub const IDENTITY_PROVIDER_URL_ENV: &str = "IDENTITY_PROVIDER_URL";
pub const IDENTITY_PROVIDER_TIMEOUT_ENV: &str = "IDENTITY_PROVIDER_TIMEOUT_SECS";
pub const IDENTITY_HEADER_POLICY_ENV: &str = "IDENTITY_HEADER_POLICY";
pub const ARGON2_MEMORY_ENV: &str = "ARGON2_MEMORY_KIB";
pub const ARGON2_ITERATIONS_ENV: &str = "ARGON2_ITERATIONS";
pub const ARGON2_PARALLELISM_ENV: &str = "ARGON2_PARALLELISM";
pub const REQUEST_TIMEOUT_ENV: &str = "REQUEST_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DATABASE_FILE: &str = "accounts.redb";
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default `RUST_LOG` filter when the variable is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} is required when CREDENTIAL_BACKEND=delegated")]
    Missing(&'static str),
}

/// How credentials are verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Local,
    Delegated { url: String, timeout: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub data_dir: PathBuf,
    pub backend: BackendConfig,
    pub identity_policy: IdentityHeaderPolicy,
    pub hash_cost: HashCost,
    pub request_timeout: Duration,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let host = match get(HOST_ENV) {
            Some(value) => parse_value(HOST_ENV, &value)?,
            None => IpAddr::from([0, 0, 0, 0]),
        };
        let port = parse_or(PORT_ENV, get(PORT_ENV), DEFAULT_PORT)?;

        let data_dir = get(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let backend = match get(CREDENTIAL_BACKEND_ENV)
            .map(|v| v.trim().to_ascii_lowercase())
            .as_deref()
        {
            None | Some("local") => BackendConfig::Local,
            Some("delegated") => {
                let url = get(IDENTITY_PROVIDER_URL_ENV)
                    .ok_or(ConfigError::Missing(IDENTITY_PROVIDER_URL_ENV))?;
                let secs = parse_or(
                    IDENTITY_PROVIDER_TIMEOUT_ENV,
                    get(IDENTITY_PROVIDER_TIMEOUT_ENV),
                    DEFAULT_PROVIDER_TIMEOUT_SECS,
                )?;
                BackendConfig::Delegated {
                    url,
                    timeout: Duration::from_secs(secs),
                }
            }
            Some(other) => {
                return Err(invalid(
                    CREDENTIAL_BACKEND_ENV,
                    other,
                    "expected `local` or `delegated`",
                ))
            }
        };

        let identity_policy = match get(IDENTITY_HEADER_POLICY_ENV) {
            Some(value) => IdentityHeaderPolicy::parse(&value).ok_or_else(|| {
                invalid(
                    IDENTITY_HEADER_POLICY_ENV,
                    &value,
                    "expected `downgrade` or `reject`",
                )
            })?,
            None => IdentityHeaderPolicy::default(),
        };

        let defaults = HashCost::default();
        let hash_cost = HashCost {
            memory_kib: parse_or(ARGON2_MEMORY_ENV, get(ARGON2_MEMORY_ENV), defaults.memory_kib)?,
            iterations: parse_or(
                ARGON2_ITERATIONS_ENV,
                get(ARGON2_ITERATIONS_ENV),
                defaults.iterations,
            )?,
            parallelism: parse_or(
                ARGON2_PARALLELISM_ENV,
                get(ARGON2_PARALLELISM_ENV),
                defaults.parallelism,
            )?,
        };

        let request_timeout = Duration::from_secs(parse_or(
            REQUEST_TIMEOUT_ENV,
            get(REQUEST_TIMEOUT_ENV),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "pretty" => LogFormat::Pretty,
                _ => {
                    return Err(invalid(
                        LOG_FORMAT_ENV,
                        &value,
                        "expected `json` or `pretty`",
                    ))
                }
            },
            None => LogFormat::default(),
        };

        Ok(Self {
            host,
            port,
            data_dir,
            backend,
            identity_policy,
            hash_cost,
            request_timeout,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}

fn invalid(var: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_value<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| invalid(var, value, e.to_string()))
}

fn parse_or<T>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(value) => parse_value(var, &value),
        None => Ok(default),
    }
}
