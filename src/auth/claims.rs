// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims carried through a request.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::AuthError;

/// Claim names owned by [`Claims`] itself; custom claims may not reuse them.
pub const RESERVED_CLAIMS: [&str; 6] = ["sub", "rls", "iat", "exp", "jti", "is_api"];

/// Decoded, trusted payload describing an authenticated session.
///
/// Only the [`Guard`](super::Guard) produces these, either by validating a
/// signed token or by hydrating a reference token. Once stored in the
/// request scope they are shared behind an `Arc` and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: principal identity, or reference-token id for API sessions
    pub sub: String,

    /// Role names granted to the subject
    #[serde(rename = "rls", default)]
    pub roles: BTreeSet<String>,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Unique token identifier
    #[serde(default)]
    pub jti: String,

    /// Set when the claims were hydrated from a reference token
    #[serde(default)]
    pub is_api: bool,

    /// Application-specific claims
    #[serde(flatten)]
    pub custom: serde_json::Map<String, serde_json::Value>,
}

/// Reject custom claims that would shadow a registered member.
///
/// A flattened duplicate would serialize the key twice and produce a token
/// that no longer validates.
pub fn check_custom_claims(custom: &serde_json::Map<String, serde_json::Value>) -> Result<(), AuthError> {
    match custom.keys().find(|k| RESERVED_CLAIMS.contains(&k.as_str())) {
        Some(key) => Err(AuthError::Internal(format!(
            "custom claim `{key}` collides with a registered claim"
        ))),
        None => Ok(()),
    }
}
