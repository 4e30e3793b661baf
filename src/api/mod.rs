// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{accept_auth, request_scope, require_auth, require_key_or_bearer, require_roles, RoleGate},
    state::AppState,
};

pub mod admin;
pub mod health;
pub mod service;
pub mod session;

pub fn router(state: AppState) -> Router {
    let guard = state.guard.clone();

    let authenticated = Router::new()
        .route("/me", get(session::me))
        .route_layer(from_fn_with_state(guard.clone(), require_auth));

    let optional = Router::new()
        .route("/greeting", get(session::greeting))
        .route_layer(from_fn_with_state(guard.clone(), accept_auth));

    // Last route_layer is outermost: key-or-bearer resolves, then the gate checks.
    let service = Router::new()
        .route("/service/status", get(service::service_status))
        .route_layer(from_fn_with_state(RoleGate::all(guard.clone(), ["svc"]), require_roles))
        .route_layer(from_fn_with_state(guard.clone(), require_key_or_bearer));

    let admin = Router::new()
        .route("/admin/overview", get(admin::admin_overview))
        .route_layer(from_fn_with_state(RoleGate::all(guard.clone(), ["admin"]), require_roles));

    let reports = Router::new()
        .route("/reports", get(admin::reports))
        .route_layer(from_fn_with_state(
            RoleGate::any(guard, ["admin", "auditor"]),
            require_roles,
        ));

    let v1_routes = Router::new()
        .merge(authenticated)
        .merge(optional)
        .merge(service)
        .merge(admin)
        .merge(reports)
        .with_state(state);

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(from_fn(request_scope))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        session::me,
        session::greeting,
        service::service_status,
        admin::admin_overview,
        admin::reports
    ),
    components(
        schemas(
            health::HealthResponse,
            session::SessionResponse,
            session::GreetingResponse,
            service::ServiceStatusResponse,
            admin::AdminOverviewResponse,
            admin::ReportsResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Session", description = "Caller identity"),
        (name = "Service", description = "API-key or bearer access"),
        (name = "Admin", description = "Role-gated endpoints")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::auth::test_support::signed_token;
    use crate::config::GuardConfig;
    use crate::store::{InMemoryDirectory, StoredPrincipal, StoredReferenceToken};

    fn state_with(config: GuardConfig) -> AppState {
        let mut dir = InMemoryDirectory::new();
        dir.insert_principal(StoredPrincipal::new("u1", "alice", "user"));
        dir.insert_principal(StoredPrincipal::new("u2", "root", "admin"));
        dir.insert_reference_token(StoredReferenceToken::new("tok-1", "ci", "svc"));
        dir.insert_reference_token(StoredReferenceToken::new("tok-2", "reader", "metrics"));
        AppState::new(config, dir).unwrap()
    }

    fn state() -> AppState {
        state_with(GuardConfig::new("test-secret"))
    }

    async fn send(app: Router, uri: &str, headers: &[(&str, String)]) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, value);
        }
        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn bearer(token: String) -> (&'static str, String) {
        ("authorization", format!("Bearer {token}"))
    }

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let app = router(state());
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn health_is_public() {
        let (status, body) = send(router(state()), "/health", &[]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn scenario_a_me_with_valid_token() {
        let state = state();
        let token = signed_token(&state.guard, "u1", &["user"]);
        let (status, body) = send(router(state), "/v1/me", &[bearer(token)]).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subject"], "u1");
        assert_eq!(body["roles"], serde_json::json!(["user"]));
        assert_eq!(body["is_api"], false);
        assert_eq!(body["username"], "alice");
    }

    #[tokio::test]
    async fn me_without_stored_principal_omits_username() {
        let state = state();
        let token = signed_token(&state.guard, "ghost", &["user"]);
        let (status, body) = send(router(state), "/v1/me", &[bearer(token)]).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subject"], "ghost");
        assert!(body.get("username").is_none());
    }

    #[tokio::test]
    async fn scenario_b_me_with_expired_token() {
        let state = state();
        let mut claims = state
            .guard
            .mint("u1", ["user".to_string()], false, Default::default())
            .unwrap();
        claims.iat -= 7200;
        claims.exp = claims.iat + 60;
        let token = state.guard.encode(&claims).unwrap();

        let (status, body) = send(router(state), "/v1/me", &[bearer(token)]).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "token_expired");
    }

    #[tokio::test]
    async fn me_without_token_is_unauthorized() {
        let (status, body) = send(router(state()), "/v1/me", &[]).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "missing_token");
    }

    #[tokio::test]
    async fn scenario_c_greeting_is_anonymous_without_headers() {
        let (status, body) = send(router(state()), "/v1/greeting", &[]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["authenticated"], false);
        assert_eq!(body["message"], "Hello, anonymous");
    }

    #[tokio::test]
    async fn greeting_recognises_bearer() {
        let state = state();
        let token = signed_token(&state.guard, "u1", &["user"]);
        let (status, body) = send(router(state), "/v1/greeting", &[bearer(token)]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Hello, u1");
    }

    #[tokio::test]
    async fn greeting_rejects_tampered_token() {
        let (status, body) = send(
            router(state()),
            "/v1/greeting",
            &[bearer("a.b.c".to_string())],
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "invalid_token");
    }

    #[tokio::test]
    async fn scenario_d_api_key_reaches_service_status() {
        let (status, body) = send(
            router(state()),
            "/v1/service/status",
            &[("x-api-key", "tok-1".to_string())],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["caller"], "tok-1");
        assert_eq!(body["via_api_key"], true);
        assert_eq!(body["token_name"], "ci");
    }

    #[tokio::test]
    async fn service_status_denies_key_without_svc() {
        let (status, body) = send(
            router(state()),
            "/v1/service/status",
            &[("x-api-key", "tok-2".to_string())],
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error_code"], "missing_role");
    }

    #[tokio::test]
    async fn unknown_api_key_looks_like_invalid_token() {
        let app = router(state());
        let (unknown_status, unknown) = send(
            app.clone(),
            "/v1/service/status",
            &[("x-api-key", "tok-404".to_string())],
        )
        .await;
        let (invalid_status, invalid) = send(
            app,
            "/v1/service/status",
            &[bearer("not-a-token".to_string())],
        )
        .await;
        assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_status, invalid_status);
        assert_eq!(unknown, invalid);
    }

    #[tokio::test]
    async fn service_status_without_credentials_is_missing_token() {
        let (status, body) = send(router(state()), "/v1/service/status", &[]).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "missing_token");
    }

    #[tokio::test]
    async fn service_status_accepts_bearer_with_svc() {
        let state = state();
        let token = signed_token(&state.guard, "u1", &["svc"]);
        let (status, body) = send(router(state), "/v1/service/status", &[bearer(token)]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["via_api_key"], false);
        assert!(body.get("token_name").is_none());
    }

    #[tokio::test]
    async fn admin_overview_requires_admin() {
        let state = state();
        let user = signed_token(&state.guard, "u1", &["user"]);
        let admin = signed_token(&state.guard, "u2", &["admin"]);
        let app = router(state);

        let (status, _) = send(app.clone(), "/v1/admin/overview", &[bearer(user)]).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(app, "/v1/admin/overview", &[bearer(admin)]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["principals"], 2);
        assert_eq!(body["reference_tokens"], 2);
    }

    #[tokio::test]
    async fn reports_accept_any_listed_role() {
        let state = state();
        let auditor = signed_token(&state.guard, "a1", &["auditor"]);
        let nobody = signed_token(&state.guard, "n1", &[]);
        let app = router(state);

        let (status, body) = send(app.clone(), "/v1/reports", &[bearer(auditor)]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["roles"], serde_json::json!(["auditor"]));

        let (status, _) = send(app, "/v1/reports", &[bearer(nobody)]).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn scenario_e_roles_disabled_breaks_role_gated_routes() {
        let state = state_with(GuardConfig::new("test-secret").with_roles_disabled(true));
        let admin = signed_token(&state.guard, "u2", &["admin"]);
        let app = router(state);

        let (status, body) = send(app.clone(), "/v1/admin/overview", &[bearer(admin.clone())]).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error_code"], "roles_disabled");

        // Routes without role gates keep working.
        let (status, _) = send(app, "/v1/me", &[bearer(admin)]).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/health", "/v1/me", "/v1/greeting", "/v1/service/status", "/v1/admin/overview", "/v1/reports"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
