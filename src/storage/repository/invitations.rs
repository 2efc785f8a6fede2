// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Invitation repository.
//!
//! Invitations live in the `invitations` table keyed by their numeric id.
//! Deleting an invitation also deletes every RSVP linked to it, in the same
//! write transaction.

use chrono::{DateTime, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use super::super::database::{
    next_id, Store, StoreError, StoreResult, INVITATIONS, INVITATION_RSVPS, INVITATION_SEQUENCE,
    RSVPS, RSVP_GUEST_EMAILS,
};
use super::rsvps::StoredRsvp;
use crate::models::{CreateInvitationRequest, Invitation, UpdateInvitationRequest};

/// Invitation as persisted in the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredInvitation {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub description: String,
    pub plus_one: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredInvitation {
    /// Public JSON projection.
    pub fn format(&self) -> Invitation {
        Invitation {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            description: self.description.clone(),
            plus_one: self.plus_one,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Apply the fields present in `changes`. Returns whether anything was set.
    fn apply(&mut self, changes: UpdateInvitationRequest) -> bool {
        let mut touched = false;
        if let Some(name) = changes.name {
            self.name = name;
            touched = true;
        }
        if let Some(email) = changes.email {
            self.email = email;
            touched = true;
        }
        if let Some(description) = changes.description {
            self.description = description;
            touched = true;
        }
        if let Some(plus_one) = changes.plus_one {
            self.plus_one = plus_one;
            touched = true;
        }
        touched
    }
}

/// Repository for invitation operations.
pub struct InvitationRepository<'a> {
    store: &'a Store,
}

impl<'a> InvitationRepository<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// List every invitation, ordered by id.
    pub fn list(&self) -> StoreResult<Vec<StoredInvitation>> {
        let read_txn = self.store.begin_read()?;
        let table = read_txn.open_table(INVITATIONS)?;

        let mut invitations = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            invitations.push(serde_json::from_slice(value.value())?);
        }
        Ok(invitations)
    }

    /// Get an invitation by id.
    pub fn get(&self, invitation_id: u64) -> StoreResult<StoredInvitation> {
        let read_txn = self.store.begin_read()?;
        let table = read_txn.open_table(INVITATIONS)?;
        match table.get(invitation_id)? {
            Some(value) => Ok(serde_json::from_slice(value.value())?),
            None => Err(StoreError::NotFound(format!("Invitation {invitation_id}"))),
        }
    }

    /// Check if an invitation exists.
    pub fn exists(&self, invitation_id: u64) -> StoreResult<bool> {
        let read_txn = self.store.begin_read()?;
        let table = read_txn.open_table(INVITATIONS)?;
        Ok(table.get(invitation_id)?.is_some())
    }

    /// Insert a new invitation and return it with its assigned id.
    pub fn create(&self, request: CreateInvitationRequest) -> StoreResult<StoredInvitation> {
        let now = Utc::now();
        let write_txn = self.store.begin_write()?;
        let invitation = {
            let id = next_id(&write_txn, INVITATION_SEQUENCE)?;
            let invitation = StoredInvitation {
                id,
                name: request.name,
                email: request.email,
                description: request.description,
                plus_one: request.plus_one,
                created_at: now,
                updated_at: now,
            };

            let json = serde_json::to_vec(&invitation)?;
            let mut table = write_txn.open_table(INVITATIONS)?;
            table.insert(id, json.as_slice())?;
            invitation
        };
        write_txn.commit()?;
        Ok(invitation)
    }

    /// Apply a partial update and return the stored result.
    pub fn update(
        &self,
        invitation_id: u64,
        changes: UpdateInvitationRequest,
    ) -> StoreResult<StoredInvitation> {
        let write_txn = self.store.begin_write()?;
        let invitation = {
            let mut table = write_txn.open_table(INVITATIONS)?;

            // Read existing value and deserialize before mutating
            let existing_bytes = {
                let existing = table
                    .get(invitation_id)?
                    .ok_or_else(|| StoreError::NotFound(format!("Invitation {invitation_id}")))?;
                existing.value().to_vec()
            };

            let mut invitation: StoredInvitation = serde_json::from_slice(&existing_bytes)?;
            if invitation.apply(changes) {
                invitation.updated_at = Utc::now();
                let json = serde_json::to_vec(&invitation)?;
                table.insert(invitation_id, json.as_slice())?;
            }
            invitation
        };
        write_txn.commit()?;
        Ok(invitation)
    }

    /// Delete an invitation together with its RSVPs.
    ///
    /// Returns the number of RSVPs removed alongside it.
    pub fn delete(&self, invitation_id: u64) -> StoreResult<usize> {
        let write_txn = self.store.begin_write()?;
        let removed_rsvps = {
            let mut invitations = write_txn.open_table(INVITATIONS)?;
            if invitations.remove(invitation_id)?.is_none() {
                return Err(StoreError::NotFound(format!("Invitation {invitation_id}")));
            }

            let mut links = write_txn.open_table(INVITATION_RSVPS)?;
            let mut rsvps = write_txn.open_table(RSVPS)?;
            let mut emails = write_txn.open_table(RSVP_GUEST_EMAILS)?;

            let mut rsvp_ids = Vec::new();
            for entry in links.range((invitation_id, 0)..=(invitation_id, u64::MAX))? {
                let (key, _) = entry?;
                rsvp_ids.push(key.value().1);
            }

            for rsvp_id in &rsvp_ids {
                links.remove((invitation_id, *rsvp_id))?;
                let removed = rsvps.remove(*rsvp_id)?.map(|v| v.value().to_vec());
                if let Some(bytes) = removed {
                    let rsvp: StoredRsvp = serde_json::from_slice(&bytes)?;
                    emails.remove(rsvp.guest_email.as_str())?;
                }
            }
            rsvp_ids.len()
        };
        write_txn.commit()?;
        Ok(removed_rsvps)
    }
}
