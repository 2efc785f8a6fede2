// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for scope-checked callers.
//!
//! ```rust,ignore
//! async fn delete_invitation(
//!     RequireScope(user, _): RequireScope<DeleteInvitation>,
//!     State(state): State<AppState>,
//! ) -> Result<Json<InvitationDeletedResponse>, ApiError> {
//!     // user is AuthenticatedUser holding `delete:invitation`
//! }
//! ```

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthError, AuthenticatedUser, Scope};
use crate::state::AppState;

/// Extractor that verifies the bearer token and requires scope `S`.
///
/// Header extractors run before the body is read, so an unauthenticated
/// request is rejected with 401 whatever its body contains.
pub struct RequireScope<S: Scope>(pub AuthenticatedUser, pub PhantomData<S>);

impl<S: Scope> FromRequestParts<AppState> for RequireScope<S> {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // A caller verified earlier in the request is reused
        let user = match parts.extensions.get::<AuthenticatedUser>().cloned() {
            Some(user) => user,
            None => {
                let user = state.verifier.verify_headers(&parts.headers).await?;
                parts.extensions.insert(user.clone());
                user
            }
        };

        user.require_permission(S::NAME)?;
        Ok(RequireScope(user, PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{DeleteInvitation, PostInvitation};
    use crate::test_support::{test_state, TestToken};
    use axum::http::Request;

    fn parts_with_token(token: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/invitations");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn requires_auth_header() {
        let (state, _server, _dir) = test_state().await;
        let mut parts = parts_with_token(None);

        let result = RequireScope::<PostInvitation>::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn accepts_token_with_scope() {
        let (state, _server, _dir) = test_state().await;
        let token = TestToken::new("auth0|host").scopes(&["post:invitation"]).sign();
        let mut parts = parts_with_token(Some(&token));

        let RequireScope(user, _) =
            RequireScope::<PostInvitation>::from_request_parts(&mut parts, &state)
                .await
                .unwrap();
        assert_eq!(user.user_id, "auth0|host");
        assert!(parts.extensions.get::<AuthenticatedUser>().is_some());
    }

    #[tokio::test]
    async fn rejects_token_without_scope() {
        let (state, _server, _dir) = test_state().await;
        let token = TestToken::new("auth0|host").scopes(&["post:invitation"]).sign();
        let mut parts = parts_with_token(Some(&token));

        let result = RequireScope::<DeleteInvitation>::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::PermissionNotFound)));
    }

    #[tokio::test]
    async fn prefers_extensions() {
        let (state, server, _dir) = test_state().await;
        let mut parts = parts_with_token(None);
        parts.extensions.insert(AuthenticatedUser {
            user_id: "auth0|cached".to_string(),
            permissions: vec!["delete:invitation".to_string()],
            expires_at: 0,
        });

        let RequireScope(user, _) =
            RequireScope::<DeleteInvitation>::from_request_parts(&mut parts, &state)
                .await
                .unwrap();
        assert_eq!(user.user_id, "auth0|cached");
        assert_eq!(server.hits(), 0);
    }
}
