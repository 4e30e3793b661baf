// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request-scoped claims storage.
//!
//! Each request runs inside its own tokio task-local slot that holds at most
//! one [`Claims`] value. Nothing here is process-global: a concurrently
//! running request can never observe another request's claims, and the slot
//! is destroyed together with the request future.
//!
//! ## Lifecycle
//!
//! ```text
//! NoClaims ──(validate | hydrate)──▶ ClaimsPresent ──(handler returns,
//!                                                     fails or is dropped)──▶ NoClaims
//! ```
//!
//! Storing while claims are already present is a no-op, so nested wrappers
//! share a single resolution.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use super::{AuthError, Claims};

tokio::task_local! {
    static CLAIMS: RefCell<Option<Arc<Claims>>>;
}

/// Run `fut` inside a request scope.
///
/// An already active scope is reused so that nested wrappers see the same
/// slot; otherwise a fresh, empty scope is opened for the duration of `fut`.
pub async fn scoped<F: Future>(fut: F) -> F::Output {
    if in_scope() {
        fut.await
    } else {
        CLAIMS.scope(RefCell::new(None), fut).await
    }
}

/// Whether the caller is running inside a request scope.
pub fn in_scope() -> bool {
    CLAIMS.try_with(|_| ()).is_ok()
}

/// Whether the current scope holds claims.
pub fn has_claims() -> bool {
    CLAIMS
        .try_with(|slot| slot.borrow().is_some())
        .unwrap_or(false)
}

/// Store claims for the current scope unless some are already present.
pub fn set_claims(claims: Claims) -> Result<(), AuthError> {
    CLAIMS
        .try_with(|slot| {
            let mut slot = slot.borrow_mut();
            if slot.is_none() {
                *slot = Some(Arc::new(claims));
            }
        })
        .map_err(|_| AuthError::Internal("claims stored outside of a request scope".to_string()))
}

/// Get the claims stored for the current scope.
pub fn get_claims() -> Result<Arc<Claims>, AuthError> {
    CLAIMS
        .try_with(|slot| slot.borrow().clone())
        .ok()
        .flatten()
        .ok_or(AuthError::NoClaims)
}

/// Remove any claims from the current scope. Safe to call repeatedly and
/// outside of a scope.
pub fn clear_claims() {
    let _ = CLAIMS.try_with(|slot| slot.borrow_mut().take());
}

/// Clears the claims slot when dropped.
///
/// Wrappers arm one of these before resolving a credential, so the slot is
/// emptied on normal return, on error, while unwinding, and when the request
/// future is cancelled.
#[must_use = "claims are cleared when this guard is dropped"]
pub struct ClaimsCleanup {
    _private: (),
}

impl ClaimsCleanup {
    pub fn arm() -> Self {
        Self { _private: () }
    }
}

impl Drop for ClaimsCleanup {
    fn drop(&mut self) {
        clear_claims();
    }
}

// ============================================================================
// Handler-visible accessors
// ============================================================================

/// Claims of the authenticated caller.
pub fn current_claims() -> Result<Arc<Claims>, AuthError> {
    get_claims()
}

/// Subject identity of the authenticated caller.
pub fn current_identity() -> Result<String, AuthError> {
    Ok(get_claims()?.sub.clone())
}

/// Role set of the authenticated caller.
pub fn current_role_set() -> Result<BTreeSet<String>, AuthError> {
    Ok(get_claims()?.roles.clone())
}

/// Whether the caller authenticated with a reference token.
pub fn current_is_api() -> Result<bool, AuthError> {
    Ok(get_claims()?.is_api)
}

/// Application-specific claims of the authenticated caller.
pub fn current_custom_claims() -> Result<serde_json::Map<String, serde_json::Value>, AuthError> {
    Ok(get_claims()?.custom.clone())
}
