// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RSVP repository.
//!
//! RSVPs are stored in the `rsvps` table and linked to their invitation
//! through the `invitation_rsvps` index. Guest emails are unique across all
//! RSVPs, enforced by the `rsvp_guest_emails` index.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use super::super::database::{
    next_id, Store, StoreError, StoreResult, INVITATIONS, INVITATION_RSVPS, RSVPS,
    RSVP_GUEST_EMAILS, RSVP_SEQUENCE,
};
use crate::models::{CreateRsvpRequest, Rsvp, UpdateRsvpRequest};

/// RSVP as persisted in the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredRsvp {
    pub id: u64,
    pub invitation_id: u64,
    /// Subject claim of the token that created this RSVP
    pub jwt_sub: String,
    pub response: String,
    pub guest_name: String,
    pub guest_email: String,
    pub plus_one: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredRsvp {
    /// Public JSON projection.
    pub fn format(&self) -> Rsvp {
        Rsvp {
            id: self.id,
            invitation_id: self.invitation_id,
            jwt_sub: self.jwt_sub.clone(),
            response: self.response.clone(),
            guest_name: self.guest_name.clone(),
            guest_email: self.guest_email.clone(),
            plus_one: self.plus_one,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Whether `subject` is the token subject that created this RSVP.
    pub fn is_owned_by(&self, subject: &str) -> bool {
        self.jwt_sub == subject
    }
}

/// Fields required to insert an RSVP, after the handler checked presence.
#[derive(Debug, Clone)]
pub struct NewRsvp {
    pub response: String,
    pub guest_name: String,
    pub guest_email: String,
    pub plus_one: bool,
}

impl TryFrom<CreateRsvpRequest> for NewRsvp {
    type Error = CreateRsvpRequest;

    /// Fails (handing the request back) when any field is missing.
    fn try_from(request: CreateRsvpRequest) -> Result<Self, Self::Error> {
        match request {
            CreateRsvpRequest {
                guest_name: Some(guest_name),
                guest_email: Some(guest_email),
                response: Some(response),
                plus_one: Some(plus_one),
            } => Ok(Self {
                response,
                guest_name,
                guest_email,
                plus_one,
            }),
            incomplete => Err(incomplete),
        }
    }
}

/// Repository for RSVP operations.
pub struct RsvpRepository<'a> {
    store: &'a Store,
}

impl<'a> RsvpRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// List the RSVPs of one invitation, ordered by id.
    ///
    /// An unknown invitation simply has no RSVPs.
    pub fn list_for_invitation(&self, invitation_id: u64) -> StoreResult<Vec<StoredRsvp>> {
        let read_txn = self.store.begin_read()?;
        let links = read_txn.open_table(INVITATION_RSVPS)?;
        let rsvps = read_txn.open_table(RSVPS)?;

        let mut results = Vec::new();
        for entry in links.range((invitation_id, 0)..=(invitation_id, u64::MAX))? {
            let (key, _) = entry?;
            let (_, rsvp_id) = key.value();
            match rsvps.get(rsvp_id)? {
                Some(value) => results.push(serde_json::from_slice(value.value())?),
                None => tracing::warn!(invitation_id, rsvp_id, "Dangling RSVP index entry"),
            }
        }
        Ok(results)
    }

    /// Get an RSVP that belongs to the given invitation.
    ///
    /// An RSVP filed under a different invitation is reported as not found.
    pub fn get(&self, invitation_id: u64, rsvp_id: u64) -> StoreResult<StoredRsvp> {
        let read_txn = self.store.begin_read()?;
        let table = read_txn.open_table(RSVPS)?;
        let rsvp: StoredRsvp = match table.get(rsvp_id)? {
            Some(value) => serde_json::from_slice(value.value())?,
            None => return Err(not_found(invitation_id, rsvp_id)),
        };

        if rsvp.invitation_id != invitation_id {
            return Err(not_found(invitation_id, rsvp_id));
        }
        Ok(rsvp)
    }

    /// Insert an RSVP for a live invitation.
    ///
    /// Fails with `NotFound` if the invitation does not exist and with
    /// `Conflict` if another RSVP already uses the guest email. Nothing is
    /// written in either case.
    pub fn create(
        &self,
        invitation_id: u64,
        jwt_sub: &str,
        rsvp: NewRsvp,
    ) -> StoreResult<StoredRsvp> {
        let now = Utc::now();
        let write_txn = self.store.begin_write()?;
        let stored = {
            {
                let invitations = write_txn.open_table(INVITATIONS)?;
                if invitations.get(invitation_id)?.is_none() {
                    return Err(StoreError::NotFound(format!("Invitation {invitation_id}")));
                }
            }

            let mut emails = write_txn.open_table(RSVP_GUEST_EMAILS)?;
            if emails.get(rsvp.guest_email.as_str())?.is_some() {
                return Err(StoreError::Conflict(format!(
                    "RSVP with guest email {}",
                    rsvp.guest_email
                )));
            }

            let id = next_id(&write_txn, RSVP_SEQUENCE)?;
            let stored = StoredRsvp {
                id,
                invitation_id,
                jwt_sub: jwt_sub.to_string(),
                response: rsvp.response,
                guest_name: rsvp.guest_name,
                guest_email: rsvp.guest_email,
                plus_one: rsvp.plus_one,
                created_at: now,
                updated_at: now,
            };

            let json = serde_json::to_vec(&stored)?;
            let mut rsvps = write_txn.open_table(RSVPS)?;
            rsvps.insert(id, json.as_slice())?;
            let mut links = write_txn.open_table(INVITATION_RSVPS)?;
            links.insert((invitation_id, id), ())?;
            emails.insert(stored.guest_email.as_str(), id)?;
            stored
        };
        write_txn.commit()?;
        Ok(stored)
    }

    /// Apply a partial update and return the stored result.
    ///
    /// Changing the guest email to one held by another RSVP fails with
    /// `Conflict`.
    pub fn update(
        &self,
        invitation_id: u64,
        rsvp_id: u64,
        changes: UpdateRsvpRequest,
    ) -> StoreResult<StoredRsvp> {
        let write_txn = self.store.begin_write()?;
        let rsvp = {
            let mut rsvps = write_txn.open_table(RSVPS)?;
            let existing_bytes = {
                let existing = rsvps
                    .get(rsvp_id)?
                    .ok_or_else(|| not_found(invitation_id, rsvp_id))?;
                existing.value().to_vec()
            };

            let mut rsvp: StoredRsvp = serde_json::from_slice(&existing_bytes)?;
            if rsvp.invitation_id != invitation_id {
                return Err(not_found(invitation_id, rsvp_id));
            }

            let mut touched = false;
            if let Some(guest_email) = changes.guest_email {
                if guest_email != rsvp.guest_email {
                    let mut emails = write_txn.open_table(RSVP_GUEST_EMAILS)?;
                    if emails.get(guest_email.as_str())?.is_some() {
                        return Err(StoreError::Conflict(format!(
                            "RSVP with guest email {guest_email}"
                        )));
                    }
                    emails.remove(rsvp.guest_email.as_str())?;
                    emails.insert(guest_email.as_str(), rsvp_id)?;
                    rsvp.guest_email = guest_email;
                }
                touched = true;
            }
            if let Some(guest_name) = changes.guest_name {
                rsvp.guest_name = guest_name;
                touched = true;
            }
            if let Some(response) = changes.response {
                rsvp.response = response;
                touched = true;
            }
            if let Some(plus_one) = changes.plus_one {
                rsvp.plus_one = plus_one;
                touched = true;
            }

            if touched {
                rsvp.updated_at = Utc::now();
                let json = serde_json::to_vec(&rsvp)?;
                rsvps.insert(rsvp_id, json.as_slice())?;
            }
            rsvp
        };
        write_txn.commit()?;
        Ok(rsvp)
    }

    /// Delete an RSVP that belongs to the given invitation.
    pub fn delete(&self, invitation_id: u64, rsvp_id: u64) -> StoreResult<()> {
        let write_txn = self.store.begin_write()?;
        {
            let mut rsvps = write_txn.open_table(RSVPS)?;
            let existing_bytes = {
                let existing = rsvps
                    .get(rsvp_id)?
                    .ok_or_else(|| not_found(invitation_id, rsvp_id))?;
                existing.value().to_vec()
            };
            let rsvp: StoredRsvp = serde_json::from_slice(&existing_bytes)?;
            if rsvp.invitation_id != invitation_id {
                return Err(not_found(invitation_id, rsvp_id));
            }

            rsvps.remove(rsvp_id)?;
            let mut links = write_txn.open_table(INVITATION_RSVPS)?;
            links.remove((invitation_id, rsvp_id))?;
            let mut emails = write_txn.open_table(RSVP_GUEST_EMAILS)?;
            emails.remove(rsvp.guest_email.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

fn not_found(invitation_id: u64, rsvp_id: u64) -> StoreError {
    StoreError::NotFound(format!("RSVP {rsvp_id} of invitation {invitation_id}"))
}
