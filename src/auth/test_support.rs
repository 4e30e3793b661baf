// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Fixtures shared by the auth test modules.

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use super::Guard;
use crate::config::GuardConfig;
use crate::store::{InMemoryDirectory, StoredPrincipal, StoredReferenceToken};

pub fn directory() -> Arc<InMemoryDirectory> {
    let mut dir = InMemoryDirectory::new();
    dir.insert_principal(StoredPrincipal::new("u1", "alice", "user"));
    dir.insert_principal(StoredPrincipal::new("u2", "root", "admin,user"));
    dir.insert_reference_token(StoredReferenceToken::new("tok-1", "ci", "admin,svc"));
    dir.insert_reference_token(StoredReferenceToken::new("tok-svc", "ci", "svc"));
    Arc::new(dir)
}

pub fn guard_with_config(config: GuardConfig) -> Guard {
    let dir = directory();
    Guard::new(config, dir.clone(), dir).expect("test guard config is valid")
}

pub fn guard() -> Guard {
    guard_with_config(GuardConfig::new("test-secret"))
}

/// A valid signed token for `sub` with `roles`.
pub fn signed_token(guard: &Guard, sub: &str, roles: &[&str]) -> String {
    let claims = guard.mint(
        sub,
        roles.iter().map(|r| r.to_string()),
        false,
        Default::default(),
    )
    .expect("test claims mint");
    guard.encode(&claims).expect("test token encodes")
}

pub fn headers_with(name: &str, value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_bytes(name.as_bytes()).expect("valid header name"),
        HeaderValue::from_str(value).expect("valid header value"),
    );
    headers
}

pub fn bearer(token: &str) -> HeaderMap {
    headers_with("authorization", &format!("Bearer {token}"))
}
