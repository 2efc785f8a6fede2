// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification.
//!
//! A request moves through these steps, each failing with its own
//! [`AuthError`]:
//!
//! 1. read the `Authorization` header and split off the bearer token
//! 2. decode the token header and read its `kid`
//! 3. look the key up in the JWKS
//! 4. verify the RS256 signature, expiry, issuer and audience
//! 5. decode the claims and require a `permissions` array
//!
//! Scope checks happen afterwards in [`super::RequireScope`].

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, Validation};

use super::claims::{AuthenticatedUser, TokenClaims};
use super::error::AuthError;
use super::jwks::JwksManager;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Verifies access tokens against a JWKS, issuer and audience.
#[derive(Clone)]
pub struct TokenVerifier {
    jwks: Arc<JwksManager>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(
        jwks: Arc<JwksManager>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        let issuer: String = issuer.into();
        let audience: String = audience.into();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = CLOCK_SKEW_LEEWAY;
        validation.set_issuer(&[issuer]);
        validation.set_audience(&[audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        Self { jwks, validation }
    }

    pub fn jwks(&self) -> &JwksManager {
        &self.jwks
    }

    /// Verify the bearer token carried by `headers`.
    pub async fn verify_headers(&self, headers: &HeaderMap) -> Result<AuthenticatedUser, AuthError> {
        let token = bearer_token(headers)?;
        self.verify(token).await
    }

    /// Verify a raw token and extract the caller.
    pub async fn verify(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;

        let decoding_key = self.jwks.decoding_key(&kid).await?;

        let token_data = decode::<TokenClaims>(token, &decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::InvalidIssuer
                | ErrorKind::InvalidAudience
                | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims,
                ErrorKind::Json(_) => AuthError::UnparsableToken,
                _ => AuthError::MalformedToken,
            })?;

        AuthenticatedUser::from_claims(token_data.claims)
    }
}

/// Split `Bearer <token>` out of the `Authorization` header.
///
/// The header must be exactly two space-separated parts; the scheme is
/// matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None)
            if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() =>
        {
            Ok(token)
        }
        _ => Err(AuthError::InvalidAuthHeader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{JwksServer, TestToken, TEST_AUDIENCE, TEST_ISSUER, TEST_KID};
    use axum::http::HeaderValue;

    async fn verifier(server: &JwksServer) -> TokenVerifier {
        let jwks = JwksManager::new(server.url()).unwrap();
        TokenVerifier::new(Arc::new(jwks), TEST_ISSUER, TEST_AUDIENCE)
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn bearer_token_requires_header() {
        let headers = HeaderMap::new();
        let result = bearer_token(&headers);
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[test]
    fn bearer_token_scheme_is_case_insensitive() {
        for value in ["bearer abc", "BEARER abc"] {
            let headers = headers_with(value);
            assert_eq!(bearer_token(&headers).unwrap(), "abc");
        }
    }

    #[test]
    fn bearer_token_rejects_other_shapes() {
        for value in ["Basic abc", "Bearer", "Bearer a b", "Bearer ", "abc"] {
            let headers = headers_with(value);
            let result = bearer_token(&headers);
            assert!(
                matches!(result, Err(AuthError::InvalidAuthHeader)),
                "{value:?} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn valid_token_yields_subject_and_permissions() {
        let server = JwksServer::start(&[TEST_KID]).await;
        let verifier = verifier(&server).await;

        let token = TestToken::new("auth0|host").scopes(&["post:invitation"]).sign();
        let user = verifier.verify(&token).await.unwrap();

        assert_eq!(user.user_id, "auth0|host");
        assert_eq!(user.permissions, vec!["post:invitation".to_string()]);
    }

    #[tokio::test]
    async fn garbage_token_is_malformed() {
        let server = JwksServer::start(&[TEST_KID]).await;
        let verifier = verifier(&server).await;

        let result = verifier.verify("not-a-jwt").await;
        assert!(matches!(result, Err(AuthError::MalformedToken)));
        assert_eq!(server.hits(), 0);
    }

    #[tokio::test]
    async fn token_without_kid_is_rejected() {
        let server = JwksServer::start(&[TEST_KID]).await;
        let verifier = verifier(&server).await;

        let token = TestToken::new("auth0|host").kid(None).sign();
        let result = verifier.verify(&token).await;
        assert!(matches!(result, Err(AuthError::MissingKeyId)));
    }

    #[tokio::test]
    async fn unknown_kid_has_no_matching_key() {
        let server = JwksServer::start(&[TEST_KID]).await;
        let verifier = verifier(&server).await;

        let token = TestToken::new("auth0|host").kid(Some("other-key")).sign();
        let result = verifier.verify(&token).await;
        assert!(matches!(result, Err(AuthError::NoMatchingKey)));
    }

    #[tokio::test]
    async fn tampered_signature_is_rejected() {
        let server = JwksServer::start(&[TEST_KID]).await;
        let verifier = verifier(&server).await;

        let token = TestToken::new("auth0|host").sign();
        let other = TestToken::new("auth0|intruder").sign();
        // Header and payload of one token with the signature of another
        let (head, _) = token.rsplit_once('.').unwrap();
        let (_, sig) = other.rsplit_once('.').unwrap();
        let forged = format!("{head}.{sig}");

        let result = verifier.verify(&forged).await;
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[tokio::test]
    async fn wrong_issuer_or_audience_is_invalid_claims() {
        let server = JwksServer::start(&[TEST_KID]).await;
        let verifier = verifier(&server).await;

        let token = TestToken::new("auth0|host")
            .issuer("https://someone-else.example.com/")
            .sign();
        assert!(matches!(verifier.verify(&token).await, Err(AuthError::InvalidClaims)));

        let token = TestToken::new("auth0|host").audience("https://other-api").sign();
        assert!(matches!(verifier.verify(&token).await, Err(AuthError::InvalidClaims)));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let server = JwksServer::start(&[TEST_KID]).await;
        let verifier = verifier(&server).await;

        let expired = chrono::Utc::now().timestamp() - 3600;
        let token = TestToken::new("auth0|host").expires_at(expired).sign();
        assert!(matches!(verifier.verify(&token).await, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn expiry_within_leeway_is_accepted() {
        let server = JwksServer::start(&[TEST_KID]).await;
        let verifier = verifier(&server).await;

        let just_expired = chrono::Utc::now().timestamp() - 10;
        let token = TestToken::new("auth0|host").expires_at(just_expired).sign();
        assert!(verifier.verify(&token).await.is_ok());
    }

    #[tokio::test]
    async fn missing_subject_is_unparsable() {
        let server = JwksServer::start(&[TEST_KID]).await;
        let verifier = verifier(&server).await;

        let token = TestToken::new("auth0|host").without_subject().sign();
        assert!(matches!(verifier.verify(&token).await, Err(AuthError::UnparsableToken)));
    }

    #[tokio::test]
    async fn missing_permissions_claim_is_rejected() {
        let server = JwksServer::start(&[TEST_KID]).await;
        let verifier = verifier(&server).await;

        let token = TestToken::new("auth0|host").without_permissions().sign();
        assert!(matches!(
            verifier.verify(&token).await,
            Err(AuthError::MissingPermissions)
        ));
    }

    #[tokio::test]
    async fn verify_headers_reads_bearer() {
        let server = JwksServer::start(&[TEST_KID]).await;
        let verifier = verifier(&server).await;

        let token = TestToken::new("auth0|guest").sign();
        let user = verifier
            .verify_headers(&headers_with(&format!("Bearer {token}")))
            .await
            .unwrap();
        assert_eq!(user.user_id, "auth0|guest");
    }
}
