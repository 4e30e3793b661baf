// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role-based authorization.
//!
//! Role gates imply mandatory authentication: they run inside
//! [`auth_required`], which resolves the caller when needed and owns claims
//! cleanup. With roles disabled in the guard configuration every gate fails
//! with `RolesDisabled` before any credential is looked at.
//!
//! ```rust,ignore
//! let admin = Router::new()
//!     .route("/overview", get(overview))
//!     .route_layer(from_fn_with_state(RoleGate::all(guard.clone(), ["admin"]), require_roles));
//! ```

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use super::context;
use super::middleware::auth_required;
use super::roles::RoleRequirement;
use super::{AuthError, Guard};

/// Run `handler` only if the authenticated caller satisfies `requirement`.
pub async fn enforce_roles<F, Fut>(
    guard: &Guard,
    headers: &HeaderMap,
    requirement: &RoleRequirement,
    handler: F,
) -> Result<Fut::Output, AuthError>
where
    F: FnOnce() -> Fut,
    Fut: Future,
{
    if guard.roles_disabled() {
        tracing::warn!(%requirement, "Role check attempted while roles are disabled");
        return Err(AuthError::RolesDisabled);
    }

    auth_required(guard, headers, || async move {
        let roles = context::current_role_set()?;
        requirement.check(&roles).inspect_err(|_| {
            tracing::warn!(%requirement, granted = ?roles, "Role check failed");
        })?;
        Ok(handler().await)
    })
    .await?
}

/// Require every one of `names`. An empty list only requires authentication.
pub async fn roles_required<I, S, F, Fut>(
    guard: &Guard,
    headers: &HeaderMap,
    names: I,
    handler: F,
) -> Result<Fut::Output, AuthError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    F: FnOnce() -> Fut,
    Fut: Future,
{
    enforce_roles(guard, headers, &RoleRequirement::all(names), handler).await
}

/// Require at least one of `names`. An empty list can never be satisfied.
pub async fn roles_accepted<I, S, F, Fut>(
    guard: &Guard,
    headers: &HeaderMap,
    names: I,
    handler: F,
) -> Result<Fut::Output, AuthError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    F: FnOnce() -> Fut,
    Fut: Future,
{
    enforce_roles(guard, headers, &RoleRequirement::any(names), handler).await
}

/// State for the [`require_roles`] middleware.
#[derive(Clone, Debug)]
pub struct RoleGate {
    guard: Guard,
    requirement: Arc<RoleRequirement>,
}

impl RoleGate {
    pub fn new(guard: Guard, requirement: RoleRequirement) -> Self {
        Self {
            guard,
            requirement: Arc::new(requirement),
        }
    }

    /// Gate requiring all of `names`.
    pub fn all<I, S>(guard: Guard, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(guard, RoleRequirement::all(names))
    }

    /// Gate requiring any of `names`.
    pub fn any<I, S>(guard: Guard, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(guard, RoleRequirement::any(names))
    }
}

/// Role-gate middleware.
pub async fn require_roles(State(gate): State<RoleGate>, request: Request, next: Next) -> Result<Response, AuthError> {
    let headers = request.headers().clone();
    enforce_roles(&gate.guard, &headers, &gate.requirement, move || next.run(request)).await
}
