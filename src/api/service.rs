// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Endpoints for service callers (API key or user session with `svc`).

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::{Auth, AuthError},
    state::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceStatusResponse {
    pub status: String,
    /// Subject of the caller.
    pub caller: String,
    /// Whether the caller used an API key.
    pub via_api_key: bool,
    /// Label of the API key, for API-key callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_name: Option<String>,
}

/// Service status, reachable with `x-api-key` or a bearer token.
#[utoipa::path(
    get,
    path = "/v1/service/status",
    tag = "Service",
    responses(
        (status = 200, description = "Service status", body = ServiceStatusResponse),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Caller lacks the svc role")
    )
)]
pub async fn service_status(
    State(state): State<AppState>,
    Auth(claims): Auth,
) -> Result<Json<ServiceStatusResponse>, AuthError> {
    let token_name = if claims.is_api {
        let token = state.guard.current_reference_token().await?;
        token.name().map(str::to_string)
    } else {
        None
    };

    Ok(Json(ServiceStatusResponse {
        status: "ok".to_string(),
        caller: claims.sub.clone(),
        via_api_key: claims.is_api,
        token_name,
    }))
}
