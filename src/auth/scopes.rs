// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route scopes.
//!
//! Every protected route requires exactly one scope from the token's
//! `permissions` claim. Scopes are zero-sized marker types so the
//! requirement is part of the handler signature:
//!
//! ```rust,ignore
//! async fn create_invitation(
//!     RequireScope(user, _): RequireScope<PostInvitation>,
//! ) -> impl IntoResponse { .. }
//! ```

/// A permission string a route requires.
pub trait Scope: Send + Sync + 'static {
    const NAME: &'static str;
}

macro_rules! scopes {
    ($($(#[$doc:meta])* $ty:ident => $name:literal;)+) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, Default)]
            pub struct $ty;

            impl Scope for $ty {
                const NAME: &'static str = $name;
            }
        )+
    };
}

scopes! {
    /// Create an invitation.
    PostInvitation => "post:invitation";
    /// Update an invitation.
    PatchInvitation => "patch:invitation";
    /// Delete an invitation and its RSVPs.
    DeleteInvitation => "delete:invitation";
    /// List the RSVPs of an invitation.
    GetInvitationRsvps => "get:invitation-rsvps";
    /// Read one RSVP.
    GetInvitationRsvpDetails => "get:invitation-rsvp-details";
    /// Answer an invitation.
    PostInvitationRsvp => "post:invitation-rsvp";
    /// Update an RSVP.
    PatchInvitationRsvp => "patch:invitation-rsvp";
    /// Delete an RSVP.
    DeleteInvitationRsvp => "delete:invitation-rsvp";
}
