// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Read contracts for host-owned entities.
//!
//! The host application persists principals and reference tokens; the guard
//! only reads them through these traits. Role strings are stored comma-joined
//! and are only ever parsed here, so the rest of the crate sees proper sets.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use super::roles::parse_rolenames;

/// An adapter could not complete a lookup (I/O, connection, ...).
///
/// "Not found" is `Ok(None)`, not an error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("entity lookup failed: {0}")]
pub struct LookupError(pub String);

/// An authenticated actor.
pub trait Principal: Send + Sync {
    /// Unique, stable identifier
    fn identity(&self) -> String;

    /// Stored comma-joined role string
    fn roles(&self) -> Option<&str>;

    /// Role set derived from [`roles`](Self::roles).
    fn rolenames(&self) -> BTreeSet<String> {
        parse_rolenames(self.roles())
    }

    /// Legacy password-hash accessor.
    ///
    /// Kept for older lookup paths only; nothing in this crate reads it.
    fn password_hash(&self) -> Option<&str> {
        None
    }

    /// Extra claims to embed when a token is minted for this principal.
    fn custom_claims(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::new()
    }
}

/// A long-lived opaque credential, e.g. a service API key.
pub trait ReferenceToken: Send + Sync {
    /// External identifier; the only key safe for hydration
    fn id(&self) -> String;

    /// Human label. Not unique in host storage, never use it as a key.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Stored comma-joined role string
    fn roles(&self) -> Option<&str>;

    fn rolenames(&self) -> BTreeSet<String> {
        parse_rolenames(self.roles())
    }

    fn custom_claims(&self) -> serde_json::Map<String, serde_json::Value> {
        serde_json::Map::new()
    }
}

/// Principal lookups supplied by the host.
#[async_trait]
pub trait PrincipalLookup: Send + Sync {
    async fn by_identity(&self, identity: &str) -> Result<Option<Arc<dyn Principal>>, LookupError>;

    /// Lookup by the unique secondary key (user name).
    async fn by_name(&self, name: &str) -> Result<Option<Arc<dyn Principal>>, LookupError>;
}

/// Reference-token lookups supplied by the host.
///
/// There is deliberately no lookup by name: token names are not unique.
#[async_trait]
pub trait ReferenceTokenLookup: Send + Sync {
    async fn by_id(&self, id: &str) -> Result<Option<Arc<dyn ReferenceToken>>, LookupError>;
}
