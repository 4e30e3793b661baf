// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Reasons a signed token failed validation.
///
/// Every variant is a "token validation" failure; callers that only care
/// whether the token is usable can match on [`AuthError::Token`] as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Token is not a well-formed JWT or is missing required claims
    #[error("Token is malformed")]
    Malformed,
    /// Signature does not match
    #[error("Token signature is invalid")]
    InvalidSignature,
    /// `exp` is in the past
    #[error("Token has expired")]
    Expired,
    /// `nbf` is in the future
    #[error("Token is not yet valid")]
    NotYetValid,
}

impl TokenError {
    /// Map a `jsonwebtoken` failure onto the validation taxonomy.
    pub(crate) fn from_jwt(err: &jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                TokenError::InvalidSignature
            }
            ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            _ => TokenError::Malformed,
        }
    }
}

/// Authentication error type.
///
/// Everything here propagates to the host's error boundary; only
/// [`AuthError::MissingToken`] is ever swallowed, and only by the optional
/// and hybrid authentication modes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No credential was presented
    #[error("Authentication token is required")]
    MissingToken,
    /// A credential header is present but unusable
    #[error("Invalid authorization header format")]
    InvalidAuthHeader,
    /// The signed token failed validation
    #[error(transparent)]
    Token(#[from] TokenError),
    /// The reference token (API key) does not exist
    #[error("Reference token is unknown")]
    UnknownReferenceToken,
    /// Authenticated, but the role set does not satisfy the route
    #[error("This endpoint requires {policy} of the following roles: {roles}")]
    MissingRole { policy: &'static str, roles: String },
    /// Role checks were attempted while roles are disabled
    #[error("This feature is not available because roles are disabled")]
    RolesDisabled,
    /// Claims were read outside of an authenticated scope
    #[error("No claims found in the current request scope")]
    NoClaims,
    /// Adapter or signing failure
    #[error("Internal authentication error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Whether this is a signed-token validation failure (invalid or expired).
    pub fn is_token_validation(&self) -> bool {
        matches!(self, AuthError::Token(_))
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::Token(TokenError::Expired) => "token_expired",
            // Unknown reference tokens must look exactly like invalid tokens.
            AuthError::Token(_) | AuthError::UnknownReferenceToken => "invalid_token",
            AuthError::MissingRole { .. } => "missing_role",
            AuthError::RolesDisabled => "roles_disabled",
            AuthError::NoClaims => "no_claims",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidAuthHeader
            | AuthError::Token(_)
            | AuthError::UnknownReferenceToken => StatusCode::UNAUTHORIZED,
            AuthError::MissingRole { .. } => StatusCode::FORBIDDEN,
            AuthError::RolesDisabled | AuthError::NoClaims | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message exposed to clients.
    fn public_message(&self) -> String {
        match self {
            AuthError::Token(TokenError::Expired) => self.to_string(),
            AuthError::Token(_) | AuthError::UnknownReferenceToken => {
                "Token is invalid".to_string()
            }
            AuthError::Internal(_) => "Internal authentication error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.public_message(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AuthError) -> serde_json::Value {
        let response = err.into_response();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_token_returns_401() {
        let response = AuthError::MissingToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_of(AuthError::MissingToken).await;
        assert_eq!(body["error_code"], "missing_token");
    }

    #[tokio::test]
    async fn missing_role_returns_403() {
        let err = AuthError::MissingRole {
            policy: "all",
            roles: "admin".to_string(),
        };
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_reference_token_is_indistinguishable_from_invalid_token() {
        let unknown = body_of(AuthError::UnknownReferenceToken).await;
        let invalid = body_of(AuthError::Token(TokenError::InvalidSignature)).await;
        assert_eq!(unknown, invalid);
        assert_eq!(
            AuthError::UnknownReferenceToken.status_code(),
            AuthError::Token(TokenError::Malformed).status_code()
        );
    }

    #[tokio::test]
    async fn expired_token_has_its_own_code() {
        let body = body_of(AuthError::Token(TokenError::Expired)).await;
        assert_eq!(body["error_code"], "token_expired");
    }

    #[test]
    fn roles_disabled_is_a_server_error() {
        assert_eq!(
            AuthError::RolesDisabled.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn token_errors_share_a_validation_kind() {
        assert!(AuthError::from(TokenError::Expired).is_token_validation());
        assert!(AuthError::from(TokenError::Malformed).is_token_validation());
        assert!(!AuthError::MissingToken.is_token_validation());
        assert!(!AuthError::UnknownReferenceToken.is_token_validation());
    }

    #[tokio::test]
    async fn internal_errors_do_not_leak_details() {
        let body = body_of(AuthError::Internal("db password wrong".to_string())).await;
        assert_eq!(body["error"], "Internal authentication error");
    }
}
