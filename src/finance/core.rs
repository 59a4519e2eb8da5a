//! Main orchestrator coordinating reconciliation, settlement, and reports

use bigdecimal::BigDecimal;
use std::io;

use crate::finance::export;
use crate::finance::occupancy::{CourseRevenueProjection, OccupancyReport, OccupancyReporter};
use crate::finance::reconcile::reconcile_snapshot;
use crate::finance::settlement::{SettlementManager, SettlementResult};
use crate::traits::*;
use crate::types::*;

/// Enrollment-finance core over a storage backend
///
/// Exposes the three boundary operations (reconcile, settle, occupancy) plus
/// manual entry recording and revenue projections. Holds no state of its own
/// beyond the storage handles: every reconciliation is recomputed on demand
/// from a fresh snapshot, a deliberate simplicity-over-throughput choice
/// since entry volumes are small and double-counting avoidance is paramount.
pub struct FinanceCore<S: FinanceStorage> {
    storage: S,
    settlement: SettlementManager<S>,
    occupancy: OccupancyReporter<S>,
    validator: Box<dyn EntryValidator>,
}

impl<S: FinanceStorage + Clone> FinanceCore<S> {
    /// Create a new core with the given storage backend
    pub fn new(storage: S) -> Self {
        Self::with_validator(storage, Box::new(DefaultEntryValidator))
    }

    /// Create a new core with a custom entry validator
    pub fn with_validator(storage: S, validator: Box<dyn EntryValidator>) -> Self {
        Self {
            settlement: SettlementManager::new(storage.clone()),
            occupancy: OccupancyReporter::new(storage.clone()),
            storage,
            validator,
        }
    }

    /// Compute the reconciled revenue picture for a date window.
    ///
    /// Pure with respect to its inputs: one snapshot of each store is fetched
    /// up front and the computation never re-fetches, so the result is
    /// deterministic for a fixed snapshot and has no side effects.
    ///
    /// # Errors
    ///
    /// [`FinanceError::ReconciliationUnavailable`] if any store cannot be
    /// read. There is no partial result: incomplete revenue figures presented
    /// as real numbers are worse than an explicit outage.
    pub async fn reconcile(&self, window: DateRange) -> FinanceResult<ReconciledLedgerView> {
        // The full ledger, not a windowed slice: gap synthesis needs every
        // entry linked to an enrollment. See reconcile_snapshot.
        let entries = self
            .storage
            .list_ledger_entries(None, None)
            .await
            .map_err(unavailable)?;
        let enrollments = self
            .storage
            .list_enrollments(None)
            .await
            .map_err(unavailable)?;
        let courses = self.storage.list_courses().await.map_err(unavailable)?;

        Ok(reconcile_snapshot(&entries, &enrollments, &courses, window))
    }

    /// Settle part or all of an enrollment's outstanding course balance.
    /// See [`SettlementManager::settle_balance`] for the policy and errors.
    pub async fn settle_balance(
        &self,
        enrollment_id: &str,
        amount: BigDecimal,
        method: &str,
    ) -> FinanceResult<SettlementResult> {
        self.settlement
            .settle_balance(enrollment_id, amount, method)
            .await
    }

    /// Enrollment count against capacity for one course
    pub async fn occupancy(&self, course_id: &str) -> FinanceResult<OccupancyReport> {
        self.occupancy.occupancy(course_id).await
    }

    /// Potential and expected revenue for one course
    pub async fn revenue_projection(
        &self,
        course_id: &str,
    ) -> FinanceResult<CourseRevenueProjection> {
        self.occupancy.revenue_projection(course_id).await
    }

    /// Record a manual bookkeeping entry in the ledger
    pub async fn record_entry(&self, entry: LedgerEntry) -> FinanceResult<()> {
        self.validator.validate_entry(&entry)?;
        self.storage.insert_ledger_entry(&entry).await
    }

    /// Reconcile a window and write the resulting entry sequence as CSV
    pub async fn export_csv<W: io::Write>(
        &self,
        window: DateRange,
        writer: W,
    ) -> FinanceResult<ReconciledLedgerView> {
        let view = self.reconcile(window).await?;
        export::write_csv(&view, writer)?;
        Ok(view)
    }
}

fn unavailable(err: FinanceError) -> FinanceError {
    FinanceError::ReconciliationUnavailable(err.to_string())
}
