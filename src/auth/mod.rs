// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer JWT authentication for the invitation API.
//!
//! ## Auth Flow
//!
//! 1. The client obtains an access token from the auth tenant
//! 2. The client sends `Authorization: Bearer <JWT>`
//! 3. The server:
//!    - Fetches the tenant JWKS via HTTPS (cached)
//!    - Verifies the RS256 signature, expiry, issuer and audience
//!    - Extracts:
//!      - `sub` → caller identity, stored on RSVPs as `jwt_sub`
//!      - `permissions` → scopes checked per route
//!
//! ## Security
//!
//! - Reads of invitations and the health endpoints are public
//! - Every mutation and every RSVP route requires a scope
//! - Clock skew tolerance is 60 seconds

pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod scopes;
pub mod verifier;

pub use claims::AuthenticatedUser;
pub use error::AuthError;
pub use extractor::RequireScope;
pub use jwks::JwksManager;
pub use scopes::*;
pub use verifier::TokenVerifier;
