// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware.
//!
//! ## Modes
//!
//! | Mode | Function | Axum middleware | No credential |
//! |------|----------|-----------------|---------------|
//! | Mandatory | [`auth_required`] | [`require_auth`] | `MissingToken` |
//! | Optional | [`auth_accepted`] | [`accept_auth`] | handler runs unauthenticated |
//! | Hybrid | [`auth_required_key_or_bearer`] | [`require_key_or_bearer`] | as Optional |
//!
//! The functions wrap any handler future, so they can be used outside of
//! axum; the middleware variants adapt them for `from_fn_with_state`.
//!
//! Every mode arms a [`ClaimsCleanup`] before resolving a credential, so the
//! claims slot is empty again when control leaves the wrapper, whatever the
//! outcome. Claims that are already present are reused without touching the
//! request headers.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/me", get(me))
//!     .route_layer(axum::middleware::from_fn_with_state(guard.clone(), require_auth))
//!     .layer(axum::middleware::from_fn(request_scope));
//! ```

use std::future::Future;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use super::context::{self, ClaimsCleanup};
use super::credentials::{read_bearer_credential, read_key_credential};
use super::{AuthError, Guard};

/// Whether a missing bearer credential is acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Required,
    Optional,
}

/// Resolve and validate the bearer credential unless claims already exist.
fn verify_and_store(guard: &Guard, headers: &HeaderMap, presence: Presence) -> Result<(), AuthError> {
    if context::has_claims() {
        tracing::debug!("Reusing claims already present in request scope");
        return Ok(());
    }

    let token = match read_bearer_credential(headers, guard.config()) {
        Ok(token) => token,
        Err(AuthError::MissingToken) if presence == Presence::Optional => {
            tracing::debug!("No bearer token, continuing unauthenticated");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let claims = guard.validate(&token).map_err(|e| {
        tracing::warn!(reason = %e, "Bearer token rejected");
        AuthError::from(e)
    })?;
    tracing::debug!(sub = %claims.sub, is_api = claims.is_api, "Authenticated bearer token");
    context::set_claims(claims)
}

/// Hydrate a reference token unless claims already exist.
async fn hydrate_and_store(guard: &Guard, reference_token_id: &str) -> Result<(), AuthError> {
    if context::has_claims() {
        tracing::debug!("Reusing claims already present in request scope");
        return Ok(());
    }

    let claims = guard
        .hydrate(reference_token_id, guard.reference_tokens())
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Reference token rejected"))?;
    tracing::debug!(sub = %claims.sub, is_api = claims.is_api, "Authenticated reference token");
    context::set_claims(claims)
}

/// Run `handler` with mandatory authentication.
///
/// # Errors
/// `MissingToken`, `InvalidAuthHeader` or a token validation error; the
/// handler does not run in that case.
pub async fn auth_required<F, Fut>(guard: &Guard, headers: &HeaderMap, handler: F) -> Result<Fut::Output, AuthError>
where
    F: FnOnce() -> Fut,
    Fut: Future,
{
    context::scoped(async move {
        let _cleanup = ClaimsCleanup::arm();
        verify_and_store(guard, headers, Presence::Required)?;
        Ok(handler().await)
    })
    .await
}

/// Run `handler`, authenticating the caller if a bearer token is present.
///
/// A missing token is not an error; an invalid or expired one is.
pub async fn auth_accepted<F, Fut>(guard: &Guard, headers: &HeaderMap, handler: F) -> Result<Fut::Output, AuthError>
where
    F: FnOnce() -> Fut,
    Fut: Future,
{
    context::scoped(async move {
        let _cleanup = ClaimsCleanup::arm();
        verify_and_store(guard, headers, Presence::Optional)?;
        Ok(handler().await)
    })
    .await
}

/// Run `handler`, authenticating with the key header if present, otherwise
/// behaving exactly like [`auth_accepted`].
pub async fn auth_required_key_or_bearer<F, Fut>(
    guard: &Guard,
    headers: &HeaderMap,
    handler: F,
) -> Result<Fut::Output, AuthError>
where
    F: FnOnce() -> Fut,
    Fut: Future,
{
    context::scoped(async move {
        let _cleanup = ClaimsCleanup::arm();
        match read_key_credential(headers, guard.config())? {
            Some(reference_token_id) => hydrate_and_store(guard, &reference_token_id).await?,
            None => verify_and_store(guard, headers, Presence::Optional)?,
        }
        Ok(handler().await)
    })
    .await
}

// ============================================================================
// Axum adapters
// ============================================================================

/// Open a claims scope for the whole request.
///
/// Wrappers open one on demand, so this layer is only needed when code
/// outside of the wrappers (other middleware, extractors) must share the
/// request's scope.
pub async fn request_scope(request: Request, next: Next) -> Response {
    context::scoped(next.run(request)).await
}

/// Mandatory authentication middleware.
pub async fn require_auth(State(guard): State<Guard>, request: Request, next: Next) -> Result<Response, AuthError> {
    let headers = request.headers().clone();
    auth_required(&guard, &headers, move || next.run(request)).await
}

/// Optional authentication middleware.
pub async fn accept_auth(State(guard): State<Guard>, request: Request, next: Next) -> Result<Response, AuthError> {
    let headers = request.headers().clone();
    auth_accepted(&guard, &headers, move || next.run(request)).await
}

/// Reference-token-or-bearer authentication middleware.
pub async fn require_key_or_bearer(
    State(guard): State<Guard>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let headers = request.headers().clone();
    auth_required_key_or_bearer(&guard, &headers, move || next.run(request)).await
}
