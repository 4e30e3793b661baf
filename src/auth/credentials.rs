// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Raw credential extraction from request headers.
//!
//! Nothing here validates a credential; it only finds one. Both lookups are
//! exact header reads with no query-parameter fallback.

use axum::http::HeaderMap;

use super::AuthError;
use crate::config::GuardConfig;

/// Read the signed token from the bearer header.
///
/// Expects `<header_type> <token>` (by default `Authorization: Bearer <token>`).
/// A missing or empty header, or an empty token, is `MissingToken`; a header
/// with the wrong scheme is `InvalidAuthHeader`.
pub fn read_bearer_credential(headers: &HeaderMap, config: &GuardConfig) -> Result<String, AuthError> {
    let value = match headers.get(config.header_name.as_str()) {
        Some(value) => value.to_str().map_err(|_| AuthError::InvalidAuthHeader)?.trim(),
        None => return Err(AuthError::MissingToken),
    };
    if value.is_empty() {
        return Err(AuthError::MissingToken);
    }

    let token = if config.header_type.is_empty() {
        value
    } else {
        let (scheme, rest) = value.split_once(' ').unwrap_or((value, ""));
        if scheme != config.header_type {
            return Err(AuthError::InvalidAuthHeader);
        }
        rest.trim()
    };

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token.to_string())
}

/// Read a reference-token id from the key header.
///
/// Returns `None` when the header is absent or empty.
pub fn read_key_credential(headers: &HeaderMap, config: &GuardConfig) -> Result<Option<String>, AuthError> {
    match headers.get(config.key_header_name.as_str()) {
        Some(value) => {
            let value = value.to_str().map_err(|_| AuthError::InvalidAuthHeader)?.trim();
            Ok((!value.is_empty()).then(|| value.to_string()))
        }
        None => Ok(None),
    }
}
