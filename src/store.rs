// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory principal and reference-token directory.
//!
//! Backs the demo server and the test suite. Real deployments implement
//! [`PrincipalLookup`] and [`ReferenceTokenLookup`] over their own storage.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::adapters::{
    LookupError, Principal, PrincipalLookup, ReferenceToken, ReferenceTokenLookup,
};

/// A principal record as a host would persist it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPrincipal {
    pub id: String,
    pub username: String,
    /// Comma-joined role names
    pub roles: Option<String>,
    pub hashed_password: Option<String>,
}

impl StoredPrincipal {
    pub fn new(id: impl Into<String>, username: impl Into<String>, roles: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            roles: Some(roles.into()),
            hashed_password: None,
        }
    }
}

impl Principal for StoredPrincipal {
    fn identity(&self) -> String {
        self.id.clone()
    }

    fn roles(&self) -> Option<&str> {
        self.roles.as_deref()
    }

    fn password_hash(&self) -> Option<&str> {
        self.hashed_password.as_deref()
    }

    fn custom_claims(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut custom = serde_json::Map::new();
        custom.insert("username".to_string(), self.username.clone().into());
        custom
    }
}

/// A reference-token (API key) record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReferenceToken {
    pub id: String,
    /// Display name; several records may share one
    pub token_name: String,
    /// Comma-joined role names
    pub roles: Option<String>,
}

impl StoredReferenceToken {
    pub fn new(id: impl Into<String>, token_name: impl Into<String>, roles: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            token_name: token_name.into(),
            roles: Some(roles.into()),
        }
    }
}

impl ReferenceToken for StoredReferenceToken {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn name(&self) -> Option<&str> {
        Some(&self.token_name)
    }

    fn roles(&self) -> Option<&str> {
        self.roles.as_deref()
    }

    fn custom_claims(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut custom = serde_json::Map::new();
        custom.insert("token_name".to_string(), self.token_name.clone().into());
        custom
    }
}

#[derive(Default)]
pub struct InMemoryDirectory {
    principals: HashMap<String, Arc<StoredPrincipal>>,
    reference_tokens: HashMap<String, Arc<StoredReferenceToken>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_principal(&mut self, principal: StoredPrincipal) {
        self.principals
            .insert(principal.id.clone(), Arc::new(principal));
    }

    pub fn insert_reference_token(&mut self, token: StoredReferenceToken) {
        self.reference_tokens.insert(token.id.clone(), Arc::new(token));
    }

    pub fn principal_count(&self) -> usize {
        self.principals.len()
    }

    pub fn reference_token_count(&self) -> usize {
        self.reference_tokens.len()
    }
}

#[async_trait]
impl PrincipalLookup for InMemoryDirectory {
    async fn by_identity(&self, identity: &str) -> Result<Option<Arc<dyn Principal>>, LookupError> {
        Ok(self
            .principals
            .get(identity)
            .map(|p| p.clone() as Arc<dyn Principal>))
    }

    async fn by_name(&self, name: &str) -> Result<Option<Arc<dyn Principal>>, LookupError> {
        let mut matches = self.principals.values().filter(|p| p.username == name);
        match (matches.next(), matches.next()) {
            (Some(p), None) => Ok(Some(p.clone() as Arc<dyn Principal>)),
            (None, _) => Ok(None),
            (Some(_), Some(_)) => Err(LookupError(format!("principal name {name} is not unique"))),
        }
    }
}

#[async_trait]
impl ReferenceTokenLookup for InMemoryDirectory {
    async fn by_id(&self, id: &str) -> Result<Option<Arc<dyn ReferenceToken>>, LookupError> {
        Ok(self
            .reference_tokens
            .get(id)
            .map(|t| t.clone() as Arc<dyn ReferenceToken>))
    }
}
