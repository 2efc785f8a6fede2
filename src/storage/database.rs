// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded invitation database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `invitations`: invitation_id → serialized StoredInvitation
//! - `rsvps`: rsvp_id → serialized StoredRsvp
//! - `invitation_rsvps`: (invitation_id, rsvp_id) → () (foreign-key index)
//! - `rsvp_guest_emails`: guest_email → rsvp_id (uniqueness index)
//! - `sequences`: sequence name → last assigned id

use std::path::Path;

use redb::{
    Database, ReadTransaction, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};

// =============================================================================
// Table Definitions
// =============================================================================

/// Primary table: invitation_id → serialized StoredInvitation (JSON bytes).
pub(crate) const INVITATIONS: TableDefinition<u64, &[u8]> = TableDefinition::new("invitations");

/// Primary table: rsvp_id → serialized StoredRsvp (JSON bytes).
pub(crate) const RSVPS: TableDefinition<u64, &[u8]> = TableDefinition::new("rsvps");

/// Index: (invitation_id, rsvp_id) → (). Range scans over one invitation's RSVPs.
pub(crate) const INVITATION_RSVPS: TableDefinition<(u64, u64), ()> =
    TableDefinition::new("invitation_rsvps");

/// Unique index: guest_email → rsvp_id.
pub(crate) const RSVP_GUEST_EMAILS: TableDefinition<&str, u64> =
    TableDefinition::new("rsvp_guest_emails");

/// Id sequences: name → last assigned id.
const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

pub(crate) const INVITATION_SEQUENCE: &str = "invitations";
pub(crate) const RSVP_SEQUENCE: &str = "rsvps";

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Store
// =============================================================================

/// Handle to the invitation database.
///
/// Shared across requests behind an `Arc`; redb serializes writers itself.
pub struct Store {
    db: Database,
}

impl Store {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(INVITATIONS)?;
            let _ = write_txn.open_table(RSVPS)?;
            let _ = write_txn.open_table(INVITATION_RSVPS)?;
            let _ = write_txn.open_table(RSVP_GUEST_EMAILS)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub(crate) fn begin_write(&self) -> StoreResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    pub(crate) fn begin_read(&self) -> StoreResult<ReadTransaction> {
        Ok(self.db.begin_read()?)
    }

    /// Cheap liveness probe: opens a read transaction and touches a table.
    pub fn ping(&self) -> StoreResult<()> {
        let read_txn = self.begin_read()?;
        let table = read_txn.open_table(INVITATIONS)?;
        table.first()?;
        Ok(())
    }
}

/// Reserve the next id of a sequence inside an open write transaction.
///
/// Ids start at 1 and are never reused, even after deletes.
pub(crate) fn next_id(write_txn: &WriteTransaction, sequence: &str) -> StoreResult<u64> {
    let mut table = write_txn.open_table(SEQUENCES)?;
    let next = table.get(sequence)?.map(|v| v.value()).unwrap_or(0) + 1;
    table.insert(sequence, next)?;
    Ok(next)
}
