// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response data structures used by the REST API. All types
//! derive `Serialize`/`Deserialize` and `ToSchema` for JSON handling and
//! OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Invitations**: host-created invitations and their mutations
//! - **RSVPs**: guest responses attached to an invitation
//! - **Envelopes**: the `{ "success": true, <key>: <data> }` wrappers every
//!   successful response uses

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Invitation Models
// =============================================================================

/// Public projection of a stored invitation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Invitation {
    /// Server-assigned identifier.
    pub id: u64,
    /// Name of the invited guest.
    pub name: String,
    /// Email address of the invited guest.
    pub email: String,
    /// Free-text invitation message.
    pub description: String,
    /// Whether the guest may bring a plus one.
    pub plus_one: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create an invitation.
///
/// `name`, `email` and `description` are required; a body missing any of
/// them is rejected with 400.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateInvitationRequest {
    pub name: String,
    pub email: String,
    pub description: String,
    /// Defaults to `false` when omitted.
    #[serde(default)]
    pub plus_one: bool,
}

/// Partial update of an invitation. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateInvitationRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub plus_one: Option<bool>,
}

// =============================================================================
// RSVP Models
// =============================================================================

/// Public projection of a stored RSVP.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Rsvp {
    pub id: u64,
    /// The invitation this RSVP answers.
    pub invitation_id: u64,
    /// Subject of the token that created this RSVP.
    pub jwt_sub: String,
    /// Free-form response, e.g. "Attending" or "Not Attending".
    pub response: String,
    pub guest_name: String,
    pub guest_email: String,
    pub plus_one: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create an RSVP.
///
/// Every field is required, but a missing or `null` field is reported as
/// 404 rather than a body error, so they are optional at the serde level
/// and checked by the handler.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateRsvpRequest {
    #[serde(default)]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub guest_email: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub plus_one: Option<bool>,
}

/// Partial update of an RSVP. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateRsvpRequest {
    #[serde(default)]
    pub guest_name: Option<String>,
    #[serde(default)]
    pub guest_email: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub plus_one: Option<bool>,
}

// =============================================================================
// Response Envelopes
// =============================================================================

/// Greeting returned by `GET /`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IndexResponse {
    pub success: bool,
    #[serde(rename = "Hello")]
    pub hello: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvitationListResponse {
    pub success: bool,
    pub invitations: Vec<Invitation>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvitationResponse {
    pub success: bool,
    pub invitations: Invitation,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvitationDeletedResponse {
    pub success: bool,
    pub invitation_id: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RsvpListResponse {
    pub success: bool,
    pub rsvps: Vec<Rsvp>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RsvpResponse {
    pub success: bool,
    pub rsvps: Rsvp,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RsvpDeletedResponse {
    pub success: bool,
    pub rsvp_id: u64,
}

impl From<Vec<Invitation>> for InvitationListResponse {
    fn from(invitations: Vec<Invitation>) -> Self {
        Self {
            success: true,
            invitations,
        }
    }
}

impl From<Invitation> for InvitationResponse {
    fn from(invitation: Invitation) -> Self {
        Self {
            success: true,
            invitations: invitation,
        }
    }
}

impl From<Vec<Rsvp>> for RsvpListResponse {
    fn from(rsvps: Vec<Rsvp>) -> Self {
        Self {
            success: true,
            rsvps,
        }
    }
}

impl From<Rsvp> for RsvpResponse {
    fn from(rsvp: Rsvp) -> Self {
        Self {
            success: true,
            rsvps: rsvp,
        }
    }
}
