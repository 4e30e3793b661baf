// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role-gated endpoints.
//!
//! - `/v1/admin/overview` requires the `admin` role
//! - `/v1/reports` requires `admin` or `auditor`

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::{Auth, AuthError},
    state::AppState,
};

/// Directory overview for administrators.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOverviewResponse {
    /// Number of known principals.
    pub principals: usize,
    /// Number of known reference tokens.
    pub reference_tokens: usize,
    /// Whether role checks are disabled.
    pub roles_disabled: bool,
    /// Server uptime information.
    pub uptime_seconds: u64,
}

/// Report access summary.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReportsResponse {
    pub caller: String,
    pub roles: Vec<String>,
}

/// Administrative overview.
#[utoipa::path(
    get,
    path = "/v1/admin/overview",
    tag = "Admin",
    responses(
        (status = 200, description = "Overview", body = AdminOverviewResponse),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Caller is not an admin"),
        (status = 500, description = "Role checks are disabled")
    )
)]
pub async fn admin_overview(State(state): State<AppState>) -> Json<AdminOverviewResponse> {
    Json(AdminOverviewResponse {
        principals: state.directory.principal_count(),
        reference_tokens: state.directory.reference_token_count(),
        roles_disabled: state.guard.roles_disabled(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

/// Reports, open to admins and auditors.
#[utoipa::path(
    get,
    path = "/v1/reports",
    tag = "Admin",
    responses(
        (status = 200, description = "Report access", body = ReportsResponse),
        (status = 401, description = "Missing or invalid credentials"),
        (status = 403, description = "Caller is neither admin nor auditor")
    )
)]
pub async fn reports(Auth(claims): Auth) -> Result<Json<ReportsResponse>, AuthError> {
    Ok(Json(ReportsResponse {
        caller: claims.sub.clone(),
        roles: claims.roles.iter().cloned().collect(),
    }))
}
