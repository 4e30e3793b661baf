// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session endpoints for authenticated and anonymous callers.

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::{Auth, AuthError, OptionalAuth},
    state::AppState,
};

/// The caller's current session.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Principal identity or reference-token id.
    pub subject: String,
    /// Granted roles, sorted.
    pub roles: Vec<String>,
    /// Whether the session came from an API key.
    pub is_api: bool,
    /// Expiry as a Unix timestamp.
    pub expires_at: i64,
    /// User name of the principal, when the session belongs to one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Greeting that adapts to whether the caller authenticated.
#[derive(Debug, Serialize, ToSchema)]
pub struct GreetingResponse {
    pub message: String,
    pub authenticated: bool,
}

/// Describe the authenticated caller.
#[utoipa::path(
    get,
    path = "/v1/me",
    tag = "Session",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "Missing, invalid or expired token")
    )
)]
pub async fn me(State(state): State<AppState>, Auth(claims): Auth) -> Result<Json<SessionResponse>, AuthError> {
    let username = if claims.is_api {
        None
    } else {
        match state.guard.current_principal().await {
            Ok(principal) => principal
                .custom_claims()
                .get("username")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            Err(e) => {
                tracing::warn!(sub = %claims.sub, error = %e, "Principal lookup failed, omitting username");
                None
            }
        }
    };

    Ok(Json(SessionResponse {
        subject: claims.sub.clone(),
        roles: claims.roles.iter().cloned().collect(),
        is_api: claims.is_api,
        expires_at: claims.exp,
        username,
    }))
}

/// Greet the caller; authentication is optional.
#[utoipa::path(
    get,
    path = "/v1/greeting",
    tag = "Session",
    responses(
        (status = 200, description = "Greeting", body = GreetingResponse),
        (status = 401, description = "A token was sent but is invalid or expired")
    )
)]
pub async fn greeting(OptionalAuth(claims): OptionalAuth) -> Json<GreetingResponse> {
    let response = match claims {
        Some(claims) => GreetingResponse {
            message: format!("Hello, {}", claims.sub),
            authenticated: true,
        },
        None => GreetingResponse {
            message: "Hello, anonymous".to_string(),
            authenticated: false,
        },
    };
    Json(response)
}
