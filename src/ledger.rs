//! Process-wide mutable state: the pending-order ledger and the backup
//! attestation cache. Both live for the process lifetime only.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::{AppError, Result};
use crate::models::PendingOrder;

/// Keyed store mapping an order reference to its pre-payment context.
///
/// `pop` has exactly-once semantics: under concurrent duplicate notification
/// deliveries, exactly one caller receives the entry and the rest observe
/// absence. Absence is an expected outcome, not an error.
#[derive(Default)]
pub struct PendingLedger {
    entries: Mutex<HashMap<String, PendingOrder>>,
}

impl PendingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly minted reference. References are never reused, so an
    /// existing entry under the same key is a logic error, not a valid state.
    pub fn put(&self, reference: &str, order: PendingOrder) -> Result<()> {
        let mut entries = self.entries.lock();
        if entries.contains_key(reference) {
            return Err(AppError::Internal(format!(
                "Duplicate pending order reference: {}",
                reference
            )));
        }
        entries.insert(reference.to_string(), order);
        Ok(())
    }

    /// Atomically remove and return the entry, if present.
    pub fn pop(&self, reference: &str) -> Option<PendingOrder> {
        self.entries.lock().remove(reference)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// One-time human-readable attestation renderings, keyed by order reference.
/// Written during fulfillment, served by the backup endpoint. Deliberately
/// ephemeral: no eviction, gone on restart.
#[derive(Default)]
pub struct BackupStore {
    entries: Mutex<HashMap<String, String>>,
}

impl BackupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, reference: &str, attestation: String) {
        self.entries.lock().insert(reference.to_string(), attestation);
    }

    pub fn get(&self, reference: &str) -> Option<String> {
        self.entries.lock().get(reference).cloned()
    }
}
