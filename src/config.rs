// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup; nothing here changes while requests are served.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `JWT_SECRET` | HMAC secret used to sign and verify tokens | Required |
//! | `JWT_ALGORITHM` | `HS256`, `HS384` or `HS512` | `HS256` |
//! | `JWT_ACCESS_LIFESPAN_SECS` | Lifetime of minted tokens | `900` |
//! | `JWT_LEEWAY_SECS` | Clock skew tolerance | `60` |
//! | `JWT_HEADER_NAME` | Header carrying the signed token | `Authorization` |
//! | `JWT_HEADER_TYPE` | Scheme prefix of that header | `Bearer` |
//! | `API_KEY_HEADER_NAME` | Header carrying a reference token id | `x-api-key` |
//! | `ROLES_DISABLED` | Disable role checks (role-gated routes then fail) | `false` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `SEED_API_KEY` | Reference token id seeded into the demo directory | None |
//! | `SEED_API_KEY_ROLES` | Roles of the seeded reference token | `svc` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::env;

use jsonwebtoken::Algorithm;

pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_ALGORITHM_ENV: &str = "JWT_ALGORITHM";
pub const JWT_ACCESS_LIFESPAN_ENV: &str = "JWT_ACCESS_LIFESPAN_SECS";
pub const JWT_LEEWAY_ENV: &str = "JWT_LEEWAY_SECS";
pub const JWT_HEADER_NAME_ENV: &str = "JWT_HEADER_NAME";
pub const JWT_HEADER_TYPE_ENV: &str = "JWT_HEADER_TYPE";
pub const API_KEY_HEADER_NAME_ENV: &str = "API_KEY_HEADER_NAME";
pub const ROLES_DISABLED_ENV: &str = "ROLES_DISABLED";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const SEED_API_KEY_ENV: &str = "SEED_API_KEY";
pub const SEED_API_KEY_ROLES_ENV: &str = "SEED_API_KEY_ROLES";

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Default lifetime of minted tokens (15 minutes).
pub const DEFAULT_ACCESS_LIFESPAN_SECS: i64 = 15 * 60;

/// Clock skew tolerance (60 seconds).
pub const DEFAULT_LEEWAY_SECS: u64 = 60;

pub const DEFAULT_HEADER_NAME: &str = "Authorization";
pub const DEFAULT_HEADER_TYPE: &str = "Bearer";
pub const DEFAULT_API_KEY_HEADER_NAME: &str = "x-api-key";

/// Invalid configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
    #[error("unsupported signing algorithm {0:?} (expected HS256, HS384 or HS512)")]
    UnsupportedAlgorithm(Algorithm),
}

/// Guard configuration.
#[derive(Clone)]
pub struct GuardConfig {
    /// HMAC secret
    pub secret: String,
    /// Signing algorithm (HMAC family only)
    pub algorithm: Algorithm,
    /// Lifetime of minted tokens in seconds
    pub access_lifespan_secs: i64,
    /// Clock skew tolerance in seconds
    pub leeway_secs: u64,
    /// Header carrying the signed token
    pub header_name: String,
    /// Scheme prefix expected in that header; empty means "whole value"
    pub header_type: String,
    /// Header carrying a reference token id
    pub key_header_name: String,
    /// When set, every role check fails loudly
    pub roles_disabled: bool,
}

impl std::fmt::Debug for GuardConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_lifespan_secs", &self.access_lifespan_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("header_name", &self.header_name)
            .field("header_type", &self.header_type)
            .field("key_header_name", &self.key_header_name)
            .field("roles_disabled", &self.roles_disabled)
            .finish()
    }
}

impl GuardConfig {
    /// Create a configuration with defaults and the given secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            access_lifespan_secs: DEFAULT_ACCESS_LIFESPAN_SECS,
            leeway_secs: DEFAULT_LEEWAY_SECS,
            header_name: DEFAULT_HEADER_NAME.to_string(),
            header_type: DEFAULT_HEADER_TYPE.to_string(),
            key_header_name: DEFAULT_API_KEY_HEADER_NAME.to_string(),
            roles_disabled: false,
        }
    }

    /// Set the signing algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the lifetime of minted tokens.
    pub fn with_access_lifespan(mut self, secs: i64) -> Self {
        self.access_lifespan_secs = secs;
        self
    }

    /// Set the clock skew tolerance.
    pub fn with_leeway(mut self, secs: u64) -> Self {
        self.leeway_secs = secs;
        self
    }

    /// Disable (or re-enable) role checks.
    pub fn with_roles_disabled(mut self, disabled: bool) -> Self {
        self.roles_disabled = disabled;
        self
    }

    /// Use a different bearer header name and scheme.
    pub fn with_header(mut self, name: impl Into<String>, header_type: impl Into<String>) -> Self {
        self.header_name = name.into();
        self.header_type = header_type.into();
        self
    }

    /// Use a different header for reference tokens.
    pub fn with_key_header(mut self, name: impl Into<String>) -> Self {
        self.key_header_name = name.into();
        self
    }

    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(JWT_SECRET_ENV)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        let mut config = Self::new(secret);

        if let Some(value) = lookup(JWT_ALGORITHM_ENV) {
            let algorithm = value.parse::<Algorithm>().map_err(|_| ConfigError::Invalid {
                name: JWT_ALGORITHM_ENV,
                value: value.clone(),
            })?;
            config.algorithm = validate_algorithm(algorithm)?;
        }
        if let Some(value) = lookup(JWT_ACCESS_LIFESPAN_ENV) {
            config.access_lifespan_secs = parse_var(JWT_ACCESS_LIFESPAN_ENV, &value)?;
        }
        if let Some(value) = lookup(JWT_LEEWAY_ENV) {
            config.leeway_secs = parse_var(JWT_LEEWAY_ENV, &value)?;
        }
        if let Some(value) = lookup(JWT_HEADER_NAME_ENV) {
            config.header_name = value;
        }
        if let Some(value) = lookup(JWT_HEADER_TYPE_ENV) {
            config.header_type = value;
        }
        if let Some(value) = lookup(API_KEY_HEADER_NAME_ENV) {
            config.key_header_name = value;
        }
        if let Some(value) = lookup(ROLES_DISABLED_ENV) {
            config.roles_disabled = parse_bool(ROLES_DISABLED_ENV, &value)?;
        }

        Ok(config)
    }
}

/// Only HMAC algorithms can be driven by a shared secret.
pub fn validate_algorithm(algorithm: Algorithm) -> Result<Algorithm, ConfigError> {
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(ConfigError::UnsupportedAlgorithm(other)),
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}
