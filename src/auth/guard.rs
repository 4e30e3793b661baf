// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The trusted authority that produces [`Claims`].
//!
//! ## Credential shapes
//!
//! - **Signed token** - a self-contained JWT, verified with [`Guard::validate`].
//! - **Reference token** - an opaque id (API key). It carries no signature,
//!   so [`Guard::hydrate`] looks the entity up and mints an equivalent claims
//!   value with `is_api = true`. Downstream code never needs to know which
//!   shape the caller used.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use super::adapters::{Principal, PrincipalLookup, ReferenceToken, ReferenceTokenLookup};
use super::claims::check_custom_claims;
use super::context;
use super::error::TokenError;
use super::{AuthError, Claims};
use crate::config::{validate_algorithm, ConfigError, GuardConfig};

struct GuardInner {
    config: GuardConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    principals: Arc<dyn PrincipalLookup>,
    reference_tokens: Arc<dyn ReferenceTokenLookup>,
}

/// Token validation, hydration and role policy.
///
/// Cheap to clone; all clones share the same keys and adapters.
#[derive(Clone)]
pub struct Guard {
    inner: Arc<GuardInner>,
}

impl std::fmt::Debug for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard")
            .field("algorithm", &self.inner.config.algorithm)
            .field("roles_disabled", &self.inner.config.roles_disabled)
            .finish_non_exhaustive()
    }
}

impl Guard {
    /// Create a guard.
    ///
    /// # Errors
    /// Returns `ConfigError` if the configured algorithm is not an HMAC one.
    pub fn new(
        config: GuardConfig,
        principals: Arc<dyn PrincipalLookup>,
        reference_tokens: Arc<dyn ReferenceTokenLookup>,
    ) -> Result<Self, ConfigError> {
        let algorithm = validate_algorithm(config.algorithm)?;
        if config.secret.is_empty() {
            return Err(ConfigError::Missing(crate::config::JWT_SECRET_ENV));
        }

        let mut validation = Validation::new(algorithm);
        validation.leeway = config.leeway_secs;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Ok(Self {
            inner: Arc::new(GuardInner {
                encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
                decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
                validation,
                config,
                principals,
                reference_tokens,
            }),
        })
    }

    pub fn config(&self) -> &GuardConfig {
        &self.inner.config
    }

    /// Whether role checks are globally disabled.
    pub fn roles_disabled(&self) -> bool {
        self.inner.config.roles_disabled
    }

    pub fn reference_tokens(&self) -> &dyn ReferenceTokenLookup {
        self.inner.reference_tokens.as_ref()
    }

    /// Verify a signed token and return its claims.
    pub fn validate(&self, raw: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(raw, &self.inner.decoding_key, &self.inner.validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::from_jwt(&e))
    }

    /// Exchange a reference-token id for claims.
    ///
    /// Only the primary id is used for the lookup.
    pub async fn hydrate(
        &self,
        reference_token_id: &str,
        lookup: &dyn ReferenceTokenLookup,
    ) -> Result<Claims, AuthError> {
        let token = lookup
            .by_id(reference_token_id)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::UnknownReferenceToken)?;

        self.mint(token.id(), token.rolenames(), true, token.custom_claims())
    }

    /// Build a fresh claims value valid for the configured lifespan.
    ///
    /// # Errors
    /// `Internal` if a custom claim reuses a registered claim name.
    pub fn mint(
        &self,
        sub: impl Into<String>,
        roles: impl IntoIterator<Item = String>,
        is_api: bool,
        custom: serde_json::Map<String, serde_json::Value>,
    ) -> Result<Claims, AuthError> {
        check_custom_claims(&custom)?;
        let iat = Utc::now().timestamp();
        Ok(Claims {
            sub: sub.into(),
            roles: roles.into_iter().collect(),
            iat,
            exp: iat + self.inner.config.access_lifespan_secs,
            jti: Uuid::new_v4().to_string(),
            is_api,
            custom,
        })
    }

    /// Sign claims into a compact JWT.
    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        check_custom_claims(&claims.custom)?;
        encode(
            &Header::new(self.inner.config.algorithm),
            claims,
            &self.inner.encoding_key,
        )
        .map_err(|e| AuthError::Internal(format!("failed to encode token: {e}")))
    }

    /// Mint and sign a token for a principal.
    pub fn encode_principal(&self, principal: &dyn Principal) -> Result<String, AuthError> {
        let claims = self.mint(
            principal.identity(),
            principal.rolenames(),
            false,
            principal.custom_claims(),
        )?;
        self.encode(&claims)
    }

    /// Mint and sign a token on behalf of a reference token.
    pub fn encode_reference_token(&self, token: &dyn ReferenceToken) -> Result<String, AuthError> {
        let claims = self.mint(token.id(), token.rolenames(), true, token.custom_claims())?;
        self.encode(&claims)
    }

    /// Look up a principal by its unique name.
    pub async fn principal_by_name(&self, name: &str) -> Result<Option<Arc<dyn Principal>>, AuthError> {
        self.inner
            .principals
            .by_name(name)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))
    }

    /// The principal behind the current request's claims.
    ///
    /// # Errors
    /// - `NoClaims` outside an authenticated scope
    /// - `Internal` for API sessions or when the principal no longer exists
    pub async fn current_principal(&self) -> Result<Arc<dyn Principal>, AuthError> {
        let claims = context::get_claims()?;
        if claims.is_api {
            return Err(AuthError::Internal(
                "current session was authenticated with a reference token".to_string(),
            ));
        }
        self.inner
            .principals
            .by_identity(&claims.sub)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or_else(|| AuthError::Internal(format!("principal {} not found", claims.sub)))
    }

    /// The reference token behind the current API session.
    pub async fn current_reference_token(&self) -> Result<Arc<dyn ReferenceToken>, AuthError> {
        let claims = context::get_claims()?;
        if !claims.is_api {
            return Err(AuthError::Internal(
                "current session was not authenticated with a reference token".to_string(),
            ));
        }
        self.inner
            .reference_tokens
            .by_id(&claims.sub)
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .ok_or(AuthError::UnknownReferenceToken)
    }
}
