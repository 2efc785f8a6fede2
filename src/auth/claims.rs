// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::Deserialize;

use super::error::AuthError;

/// Claims read from a verified access token.
///
/// `aud` and `iss` are checked by `jsonwebtoken` during decoding; only the
/// fields the service reads afterwards are kept here.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    /// Subject, the canonical caller identifier
    pub sub: String,

    /// Granted scopes, e.g. `post:invitation`
    #[serde(default)]
    pub permissions: Option<Vec<String>>,

    /// Expiration timestamp
    pub exp: i64,
}

/// Authenticated caller extracted from a verified JWT.
///
/// Handlers receive this through [`super::RequireScope`].
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Token subject, stored as `jwt_sub` on RSVPs
    pub user_id: String,

    /// Scopes granted to the token
    pub permissions: Vec<String>,

    /// Token expiration (Unix timestamp)
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Create from verified claims.
    ///
    /// A token without a `permissions` array is rejected even when the
    /// route it targets would not need one.
    pub fn from_claims(claims: TokenClaims) -> Result<Self, AuthError> {
        let permissions = claims.permissions.ok_or(AuthError::MissingPermissions)?;
        Ok(Self {
            user_id: claims.sub,
            permissions,
            expires_at: claims.exp,
        })
    }

    pub fn has_permission(&self, scope: &str) -> bool {
        self.permissions.iter().any(|p| p == scope)
    }

    /// Fail with `PermissionNotFound` unless `scope` was granted.
    pub fn require_permission(&self, scope: &str) -> Result<(), AuthError> {
        if self.has_permission(scope) {
            Ok(())
        } else {
            Err(AuthError::PermissionNotFound)
        }
    }
}
