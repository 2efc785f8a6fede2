// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Authentication error type.
///
/// Each variant is one failed step of bearer verification. The `Display`
/// text is the description returned to the client verbatim.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No authorization header present
    #[error("Authorization header is expected.")]
    MissingAuthHeader,
    /// Header is not `Bearer <token>`
    #[error("Authorization header must be a bearer token.")]
    InvalidAuthHeader,
    /// Token header cannot be decoded
    #[error("Authorization malformed.")]
    MalformedToken,
    /// Token header has no `kid`
    #[error("Authorization malformed.")]
    MissingKeyId,
    /// No RSA key in the JWKS matches the token's `kid`
    #[error("Unable to find the appropriate key.")]
    NoMatchingKey,
    /// Token signature is invalid
    #[error("Token signature is invalid.")]
    InvalidSignature,
    /// Issuer or audience do not match
    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,
    /// Token has expired
    #[error("Token expired.")]
    TokenExpired,
    /// Token is not yet valid (`nbf` in the future)
    #[error("Token is not yet valid.")]
    TokenNotYetValid,
    /// Token verified but its payload could not be decoded
    #[error("Unable to parse authentication token.")]
    UnparsableToken,
    /// Claims carry no `permissions` array
    #[error("Permissions not included in JWT.")]
    MissingPermissions,
    /// Required scope absent from `permissions`
    #[error("Permission not found.")]
    PermissionNotFound,
    /// Resource was created under another token subject
    #[error("RSVP belongs to a different subject.")]
    NotOwner,
    /// JWKS fetch failed
    #[error("Unable to fetch signing keys.")]
    JwksUnavailable(String),
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MalformedToken
            | AuthError::MissingKeyId
            | AuthError::NoMatchingKey
            | AuthError::InvalidSignature
            | AuthError::UnparsableToken => "invalid_header",
            AuthError::InvalidClaims
            | AuthError::TokenNotYetValid
            | AuthError::MissingPermissions => "invalid_claims",
            AuthError::TokenExpired => "token_expired",
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::PermissionNotFound
            | AuthError::NotOwner => "unauthorized",
            AuthError::JwksUnavailable(_) => "jwks_unavailable",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::MalformedToken
            | AuthError::MissingKeyId
            | AuthError::InvalidSignature
            | AuthError::InvalidClaims
            | AuthError::TokenExpired
            | AuthError::TokenNotYetValid
            | AuthError::NotOwner => StatusCode::UNAUTHORIZED,
            AuthError::NoMatchingKey
            | AuthError::UnparsableToken
            | AuthError::MissingPermissions => StatusCode::BAD_REQUEST,
            AuthError::PermissionNotFound => StatusCode::FORBIDDEN,
            AuthError::JwksUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::JwksUnavailable(reason) => {
                tracing::error!(%reason, "JWKS unavailable, rejecting request")
            }
            other => tracing::warn!(code = other.error_code(), "Request rejected: {other}"),
        }
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_auth_returns_401() {
        let response = AuthError::MissingAuthHeader.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "unauthorized");
        assert_eq!(body["message"], "Authorization header is expected.");
    }

    #[test]
    fn header_failures_are_unauthorized() {
        for err in [AuthError::MissingAuthHeader, AuthError::InvalidAuthHeader] {
            assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
            assert_eq!(err.error_code(), "unauthorized");
        }
    }

    #[tokio::test]
    async fn permission_not_found_returns_403() {
        let response = AuthError::PermissionNotFound.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn key_and_claim_failures_match_verifier_contract() {
        assert_eq!(AuthError::MissingKeyId.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::MissingKeyId.error_code(), "invalid_header");

        assert_eq!(AuthError::NoMatchingKey.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::NoMatchingKey.error_code(), "invalid_header");

        assert_eq!(AuthError::InvalidClaims.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidClaims.error_code(), "invalid_claims");

        assert_eq!(AuthError::TokenExpired.error_code(), "token_expired");

        assert_eq!(AuthError::MissingPermissions.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::MissingPermissions.error_code(), "invalid_claims");

        assert_eq!(AuthError::NotOwner.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::NotOwner.error_code(), "unauthorized");
    }

    #[test]
    fn jwks_failure_hides_reason() {
        let err = AuthError::JwksUnavailable("connection refused".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Unable to fetch signing keys.");
    }
}
