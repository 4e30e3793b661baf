// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Request-scoped authentication and role-based authorization.
//!
//! ## Auth Flow
//!
//! 1. A middleware layer reads a credential from the request:
//!    - `Authorization: Bearer <JWT>` (signed token), or
//!    - `x-api-key: <id>` (reference token, hybrid mode only)
//! 2. The [`Guard`]:
//!    - verifies the JWT signature and expiry, or
//!    - looks up the reference token and mints equivalent claims (`is_api`)
//! 3. Claims are stored in a task-local slot for the duration of the request
//! 4. Role gates check the stored role set (all-of / any-of)
//! 5. The handler runs; the slot is cleared on every exit path
//!
//! ## Security
//!
//! - Claims never outlive the wrapped handler
//! - Unknown API keys are reported exactly like invalid tokens
//! - Disabled roles make role-gated routes fail instead of opening them
//! - Clock skew tolerance is 60 seconds by default

pub mod adapters;
pub mod authorize;
pub mod claims;
pub mod context;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod guard;
pub mod middleware;
pub mod roles;

#[cfg(test)]
pub(crate) mod test_support;

pub use adapters::{LookupError, Principal, PrincipalLookup, ReferenceToken, ReferenceTokenLookup};
pub use authorize::{require_roles, roles_accepted, roles_required, RoleGate};
pub use claims::Claims;
pub use error::{AuthError, TokenError};
pub use extractor::{Auth, OptionalAuth};
pub use guard::Guard;
pub use middleware::{
    accept_auth, auth_accepted, auth_required, auth_required_key_or_bearer, request_scope,
    require_auth, require_key_or_bearer,
};
pub use roles::RoleRequirement;
