// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the invitation database.
//!
//! Each repository provides CRUD operations for a specific entity type and
//! runs every operation in a single redb transaction.

pub mod invitations;
pub mod rsvps;

pub use invitations::{InvitationRepository, StoredInvitation};
pub use rsvps::{NewRsvp, RsvpRepository, StoredRsvp};
