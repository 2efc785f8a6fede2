// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Invitation Server - wedding invitations and guest RSVPs
//!
//! A small REST service where hosts publish invitations and guests answer
//! them. Mutations are protected by scoped bearer JWTs verified against a
//! remote JWKS; data lives in an embedded redb database.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Authentication and scope checks (JWKS-verified JWT)
//! - `config` - Environment configuration
//! - `storage` - redb persistence

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;
