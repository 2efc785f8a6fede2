// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Persistent Storage
//!
//! Invitations and RSVPs are kept in an embedded redb database file whose
//! path comes from `DATABASE_URL`.
//!
//! ## Storage Layout
//!
//! ```text
//! invitations        u64 → StoredInvitation (JSON)
//! rsvps              u64 → StoredRsvp (JSON)
//! invitation_rsvps   (invitation_id, rsvp_id) → ()
//! rsvp_guest_emails  guest_email → rsvp_id
//! sequences          name → last id
//! ```
//!
//! ## Consistency
//!
//! - An RSVP is only inserted if its invitation exists in the same write
//!   transaction
//! - Deleting an invitation removes its RSVPs atomically
//! - Concurrent updates to one row are last-write-wins

pub mod database;
pub mod repository;

pub use database::{Store, StoreError, StoreResult};
pub use repository::{
    InvitationRepository, NewRsvp, RsvpRepository, StoredInvitation, StoredRsvp,
};
