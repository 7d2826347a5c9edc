//! # Form Session
//!
//! Owns the record being edited, the slot it is saved to and the settle
//! timer that decides when.
//!
//! ## Save Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Event                         Save                                     │
//! │  ────────────────────────────  ───────────────────────────────────────  │
//! │  open                          none (record hydrated from the slot)     │
//! │  field edit                    after the settle window, once per burst  │
//! │  structural edit               immediately; pending settle is dropped   │
//! │  submit (valid)                immediately                              │
//! │  submit (violations)           none; rejected with the full report      │
//! │  flush (shutdown)              only if a settle is pending              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every save writes the whole record. The API is synchronous and takes the
//! current time as an argument; the autosave driver supplies the clock.

use goldloan_core::{validate_application, ApplicationData, Edit, ValidationReport};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::FormSettings;
use crate::error::{StoreError, StoreResult};
use crate::settle::SettleTimer;
use crate::slot::ApplicationSlot;
use crate::storage::Storage;

pub struct FormSession<S> {
    record: ApplicationData,
    slot: ApplicationSlot<S>,
    timer: SettleTimer,
}

impl<S: Storage> FormSession<S> {
    /// Opens a session, hydrating the record from the slot.
    ///
    /// Falls back to a blank record when nothing usable is stored.
    pub fn open(slot: ApplicationSlot<S>, settings: &FormSettings) -> Self {
        let record = match slot.load() {
            Some(record) => {
                info!(key = slot.key(), "Resuming stored application");
                record
            }
            None => settings.blank_record(),
        };

        FormSession {
            record,
            slot,
            timer: SettleTimer::new(settings.settle_window()),
        }
    }

    pub fn record(&self) -> &ApplicationData {
        &self.record
    }

    pub fn slot(&self) -> &ApplicationSlot<S> {
        &self.slot
    }

    /// Validates the current record.
    pub fn report(&self) -> ValidationReport {
        validate_application(&self.record)
    }

    /// When the pending edits will settle, if any are pending.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    pub fn has_pending_save(&self) -> bool {
        self.timer.is_pending()
    }

    /// Applies an edit made at `now`.
    ///
    /// Structural edits are saved straight away. Other edits re-arm the
    /// settle timer. A failed edit leaves the record unchanged.
    pub fn apply(&mut self, edit: Edit, now: Instant) -> StoreResult<()> {
        let structural = edit.is_structural();
        self.record = self.record.clone().apply(edit)?;

        if structural {
            self.timer.cancel();
            self.slot.save(&self.record);
        } else {
            self.timer.touch(now);
        }
        Ok(())
    }

    /// Saves if the pending edits have settled by `now`. Returns whether a
    /// save happened.
    pub fn poll(&mut self, now: Instant) -> bool {
        if !self.timer.fire_if_settled(now) {
            return false;
        }
        debug!("Edits settled");
        self.slot.save(&self.record)
    }

    /// Replaces the whole record and saves it.
    pub fn replace(&mut self, record: ApplicationData) -> bool {
        self.record = record.hydrated();
        self.timer.cancel();
        self.slot.save(&self.record)
    }

    /// Submits the record.
    ///
    /// ## Errors
    /// - `StoreError::SubmissionRejected` with the full report when any
    ///   rule fails. Nothing is saved.
    /// - `StoreError::Unavailable` when the record is valid but could not be
    ///   written.
    pub fn submit(&mut self) -> StoreResult<()> {
        let report = self.report();
        if !report.is_valid() {
            warn!(violations = report.len(), "Submission rejected");
            return Err(StoreError::SubmissionRejected(report));
        }

        self.timer.cancel();
        if !self.slot.save(&self.record) {
            return Err(StoreError::Unavailable(
                "submitted application could not be saved".into(),
            ));
        }

        let section = &self.record.calculation_section;
        info!(
            rows = self.record.ornaments.len(),
            total_weight = section.total_weight,
            eligible_loan = section.eligible_loan,
            "Application submitted"
        );
        Ok(())
    }

    /// Writes any pending edits now. Returns whether a save happened.
    pub fn flush(&mut self) -> bool {
        if !self.timer.is_pending() {
            return false;
        }
        self.timer.cancel();
        debug!("Flushing pending edits");
        self.slot.save(&self.record)
    }

    pub fn into_record(self) -> ApplicationData {
        self.record
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use goldloan_core::report::{BorrowerField, OrnamentField};
    use goldloan_core::{Borrower, LoanCalculationSummary, OrnamentRow, Ownership};
    use std::sync::Arc;
    use std::time::Duration;

    fn settings() -> FormSettings {
        FormSettings::default()
    }

    fn session(storage: &Arc<MemoryStorage>) -> FormSession<Arc<MemoryStorage>> {
        FormSession::open(ApplicationSlot::new(Arc::clone(storage)), &settings())
    }

    fn stored(storage: &MemoryStorage) -> Option<ApplicationData> {
        storage
            .read("ApplicationData")
            .unwrap()
            .map(|doc| ApplicationData::from_document(&doc).unwrap())
    }

    fn set_gross(value: &str) -> Edit {
        Edit::SetOrnament {
            index: 0,
            field: OrnamentField::GrossWeight,
            value: value.into(),
        }
    }

    fn valid_record() -> ApplicationData {
        ApplicationData::new()
            .with_borrower(
                Borrower::default()
                    .with_full_name("Meena Iyer")
                    .with_pan("PQRST6789K")
                    .with_aadhar_number("987654321098")
                    .with_mobile("7012345678")
                    .with_email("meena@example.com")
                    .with_annual_income("600000"),
            )
            .with_ornaments(vec![OrnamentRow::new()
                .with_gold_items("bangle")
                .with_gross_weight("24.5")
                .with_stone_weight("0.5")
                .with_purity("22")
                .with_market_value("6000")
                .with_hallmark("BIS 916")])
            .with_ownership(Ownership::default().with_proof("Inherited").with_declaration(true))
            .with_loan_calculation_summary(LoanCalculationSummary::default().with_gold_rate("6000"))
    }

    #[test]
    fn test_open_blank_and_resume() {
        let storage = Arc::new(MemoryStorage::new());
        let s = session(&storage);
        assert_eq!(s.record(), &ApplicationData::new());

        let app = valid_record();
        ApplicationSlot::new(Arc::clone(&storage)).save(&app);
        let s = session(&storage);
        assert_eq!(s.record(), &app);
    }

    #[test]
    fn test_field_edits_debounced() {
        let storage = Arc::new(MemoryStorage::new());
        let mut s = session(&storage);
        let t0 = Instant::now();

        s.apply(set_gross("1"), t0).unwrap();
        s.apply(set_gross("12"), t0 + Duration::from_millis(100)).unwrap();

        assert!(!s.poll(t0 + Duration::from_millis(350)));
        assert!(stored(&storage).is_none());

        assert!(s.poll(t0 + Duration::from_millis(400)));
        assert_eq!(stored(&storage).unwrap().ornaments[0].gross_weight, "12");

        // Fires once per burst
        assert!(!s.poll(t0 + Duration::from_secs(2)));
    }

    #[test]
    fn test_structural_edit_saves_immediately() {
        let storage = Arc::new(MemoryStorage::new());
        let mut s = session(&storage);
        let t0 = Instant::now();

        s.apply(set_gross("10"), t0).unwrap();
        s.apply(Edit::AddOrnament, t0).unwrap();

        let saved = stored(&storage).unwrap();
        assert_eq!(saved.ornaments.len(), 2);
        assert_eq!(saved.ornaments[0].gross_weight, "10");
        assert!(!s.has_pending_save());
    }

    #[test]
    fn test_failed_edit_keeps_record() {
        let storage = Arc::new(MemoryStorage::new());
        let mut s = session(&storage);
        let before = s.record().clone();

        let err = s
            .apply(Edit::RemoveOrnament { index: 4 }, Instant::now())
            .unwrap_err();
        assert!(matches!(err, StoreError::Core(_)));
        assert_eq!(s.record(), &before);
    }

    #[test]
    fn test_submit_rejected_saves_nothing() {
        let storage = Arc::new(MemoryStorage::new());
        let mut s = session(&storage);
        s.apply(
            Edit::SetBorrower {
                field: BorrowerField::Pan,
                value: "bad".into(),
            },
            Instant::now(),
        )
        .unwrap();

        let err = s.submit().unwrap_err();
        let report = err.report().unwrap();
        assert!(!report.is_valid());
        assert_eq!(err.to_string(), goldloan_core::SUBMIT_REJECTED_NOTICE);
        assert!(stored(&storage).is_none());
    }

    #[test]
    fn test_submit_valid_saves() {
        let storage = Arc::new(MemoryStorage::new());
        let mut s = session(&storage);
        assert!(s.replace(valid_record()));

        s.submit().unwrap();
        assert_eq!(stored(&storage).unwrap(), valid_record());
    }

    #[test]
    fn test_flush_writes_pending_only() {
        let storage = Arc::new(MemoryStorage::new());
        let mut s = session(&storage);
        assert!(!s.flush());

        s.apply(set_gross("3"), Instant::now()).unwrap();
        assert!(s.flush());
        assert_eq!(stored(&storage).unwrap().ornaments[0].gross_weight, "3");
        assert!(!s.flush());
    }
}
