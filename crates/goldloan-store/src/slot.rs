//! # Application Slot
//!
//! The single storage entry shared by the entry form and the certificate.
//!
//! Failures here never propagate. A missing, unreadable or malformed
//! document loads as "no prior data"; a failed save is logged and reported
//! as `false`. The form keeps working either way.

use goldloan_core::{ApplicationData, APPLICATION_SLOT_KEY};
use tracing::{debug, error, warn};

use crate::storage::Storage;

pub struct ApplicationSlot<S> {
    storage: S,
    key: String,
}

impl<S: Storage> ApplicationSlot<S> {
    /// Slot under the standard `ApplicationData` key.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, APPLICATION_SLOT_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        ApplicationSlot {
            storage,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The stored document text, unparsed.
    pub fn read_document(&self) -> Option<String> {
        match self.storage.read(&self.key) {
            Ok(document) => document,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read application slot");
                None
            }
        }
    }

    /// Loads and hydrates the stored record.
    pub fn load(&self) -> Option<ApplicationData> {
        let Some(document) = self.read_document() else {
            debug!(key = %self.key, "No stored application");
            return None;
        };

        match ApplicationData::from_document(&document) {
            Ok(app) => {
                debug!(key = %self.key, rows = app.ornaments.len(), "Loaded stored application");
                Some(app)
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Ignoring malformed stored application");
                None
            }
        }
    }

    /// Writes the full record. Returns whether the write happened.
    pub fn save(&self, app: &ApplicationData) -> bool {
        let document = match app.to_document() {
            Ok(document) => document,
            Err(e) => {
                error!(key = %self.key, error = %e, "Failed to encode application");
                return false;
            }
        };

        match self.storage.write(&self.key, &document) {
            Ok(()) => {
                debug!(key = %self.key, bytes = document.len(), "Saved application");
                true
            }
            Err(e) => {
                error!(key = %self.key, error = %e, "Failed to save application");
                false
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
