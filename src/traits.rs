//! Traits for storage abstraction and extensibility

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::types::*;

/// The atomic enrollment-side half of a settlement
///
/// `expected_paid` carries an optimistic check: the write must fail with
/// [`FinanceError::Conflict`] if the stored `amount_paid` no longer equals it,
/// which serializes concurrent settlements on the same enrollment.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrollmentPaidUpdate {
    pub enrollment_id: String,
    /// The `amount_paid` the caller observed when deciding to settle
    pub expected_paid: BigDecimal,
    /// The new running total after the settlement
    pub new_paid: BigDecimal,
    /// The status after the settlement (never a downgrade)
    pub new_status: EnrollmentStatus,
}

/// Storage abstraction for the enrollment and ledger stores
///
/// This trait lets the reconciliation core work with any backend (a hosted
/// table store, PostgreSQL, in-memory, etc.). Reads are snapshots; each
/// reconciliation fetches once and computes over what it fetched. Write
/// methods take `&self` because settlements on different enrollments must be
/// able to proceed in parallel; implementations provide interior mutability.
#[async_trait]
pub trait FinanceStorage: Send + Sync {
    /// Get a course by ID
    async fn get_course(&self, course_id: &str) -> FinanceResult<Option<Course>>;

    /// List the full course catalog
    async fn list_courses(&self) -> FinanceResult<Vec<Course>>;

    /// Get an enrollment by ID
    async fn get_enrollment(&self, enrollment_id: &str) -> FinanceResult<Option<Enrollment>>;

    /// List enrollments, optionally restricted to one course
    async fn list_enrollments(&self, course_id: Option<&str>) -> FinanceResult<Vec<Enrollment>>;

    /// List recorded ledger entries within an inclusive date range.
    /// Open bounds (`None`) mean unfiltered on that side.
    async fn list_ledger_entries(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> FinanceResult<Vec<LedgerEntry>>;

    /// Append a recorded entry to the ledger
    async fn insert_ledger_entry(&self, entry: &LedgerEntry) -> FinanceResult<()>;

    /// Apply a settlement: update the enrollment's running balance and append
    /// the matching ledger entry as one atomic unit. Both writes succeed or
    /// neither does; a failed optimistic check returns
    /// [`FinanceError::Conflict`] with both stores unmodified.
    async fn apply_settlement(
        &self,
        update: EnrollmentPaidUpdate,
        entry: &LedgerEntry,
    ) -> FinanceResult<()>;
}

/// Trait for implementing custom ledger entry validation rules
pub trait EntryValidator: Send + Sync {
    /// Validate an entry before it is recorded
    fn validate_entry(&self, entry: &LedgerEntry) -> FinanceResult<()>;
}

/// Default entry validator with basic rules
pub struct DefaultEntryValidator;

impl EntryValidator for DefaultEntryValidator {
    fn validate_entry(&self, entry: &LedgerEntry) -> FinanceResult<()> {
        if entry.id.trim().is_empty() {
            return Err(FinanceError::Validation(
                "Entry ID cannot be empty".to_string(),
            ));
        }

        if entry.description.trim().is_empty() {
            return Err(FinanceError::Validation(
                "Entry description cannot be empty".to_string(),
            ));
        }

        if entry.amount <= BigDecimal::from(0) {
            return Err(FinanceError::Validation(
                "Entry amount must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
