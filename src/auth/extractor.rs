// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors over the request's claims scope.
//!
//! These read what the authentication middleware stored; they never look at
//! headers themselves. Use them in handlers behind one of the middleware
//! layers:
//!
//! ```rust,ignore
//! async fn me(Auth(claims): Auth) -> impl IntoResponse {
//!     Json(claims.sub.clone())
//! }
//! ```

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{context, AuthError, Claims};

/// Extractor for the authenticated caller's claims.
///
/// Rejects with `NoClaims` when the route is not behind an authentication
/// layer or the optional layer found no credential.
pub struct Auth(pub Arc<Claims>);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(_parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        context::current_claims().map(Auth)
    }
}

/// Optional authentication extractor.
///
/// Returns `None` if the caller did not authenticate.
pub struct OptionalAuth(pub Option<Arc<Claims>>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(_parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuth(context::current_claims().ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts() -> Parts {
        Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    fn claims() -> Claims {
        Claims {
            sub: "u1".to_string(),
            roles: Default::default(),
            iat: 0,
            exp: 0,
            jti: String::new(),
            is_api: false,
            custom: Default::default(),
        }
    }

    #[tokio::test]
    async fn auth_extractor_requires_claims() {
        let mut parts = parts();
        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::NoClaims)));
    }

    #[tokio::test]
    async fn auth_extractor_reads_scope() {
        context::scoped(async {
            context::set_claims(claims()).unwrap();
            let mut parts = parts();
            let Auth(found) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
            assert_eq!(found.sub, "u1");
        })
        .await;
    }

    #[tokio::test]
    async fn optional_auth_returns_none_without_claims() {
        let mut parts = parts();
        let OptionalAuth(found) = OptionalAuth::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(found.is_none());
    }
}
