//! Core types and data structures for the enrollment-finance system

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Enrollment lifecycle states
///
/// Settlement promotes `Pending` to `Confirmed` and never downgrades
/// `CheckedIn`. Other transitions belong to the external enrollment UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnrollmentStatus {
    /// Created, no payment confirmed yet
    Pending,
    /// Payment (full or partial) received
    Confirmed,
    /// Student attended the course
    CheckedIn,
}

impl EnrollmentStatus {
    /// The status an enrollment takes after a successful settlement.
    /// Confirms a pending enrollment, leaves anything further advanced alone.
    pub fn after_settlement(self) -> Self {
        match self {
            EnrollmentStatus::Pending => EnrollmentStatus::Confirmed,
            other => other,
        }
    }
}

/// A course as published in the catalog. Read-only input to this crate;
/// ownership lives with the external course-management surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Unique identifier for the course
    pub id: String,
    /// Human-readable course title
    pub title: String,
    /// Full price of the course
    pub price: BigDecimal,
    /// Maximum number of students
    pub capacity: u32,
    /// Scheduled session dates
    pub schedule_dates: Vec<NaiveDateTime>,
}

impl Course {
    /// Create a new course
    pub fn new(id: String, title: String, price: BigDecimal, capacity: u32) -> Self {
        Self {
            id,
            title,
            price,
            capacity,
            schedule_dates: Vec::new(),
        }
    }
}

/// One student enrolled in one course
///
/// `amount_paid` is a running balance that only the settlement workflow may
/// increase within this crate; externally-written rows may violate the
/// `amount_paid <= price` invariant and the reconciliation engine must
/// tolerate and report that, never crash on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Unique identifier for the enrollment
    pub id: String,
    /// Course this enrollment belongs to
    pub course_id: String,
    /// Student's display name
    pub student_name: String,
    /// Phone or email for the student
    pub student_contact: Option<String>,
    /// Lifecycle status
    pub status: EnrollmentStatus,
    /// Total amount the student has paid so far, never negative
    pub amount_paid: BigDecimal,
    /// How the tracked payments were made, when known
    pub payment_method: Option<String>,
    /// When the enrollment was created
    pub created_at: NaiveDateTime,
}

impl Enrollment {
    /// Create a new pending enrollment with nothing paid
    pub fn new(id: String, course_id: String, student_name: String) -> Self {
        Self {
            id,
            course_id,
            student_name,
            student_contact: None,
            status: EnrollmentStatus::Pending,
            amount_paid: BigDecimal::from(0),
            payment_method: None,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Direction of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// Money coming in
    Income,
    /// Money going out
    Expense,
}

/// A discrete financial transaction in the general ledger
///
/// Entries created explicitly (manual bookkeeping or the settlement workflow)
/// are *recorded*; the reconciliation engine additionally produces
/// *synthesized* entries at query time for enrollment-tracked payments not
/// yet mirrored here. The distinction is carried by [`EntryOrigin`] in the
/// reconciled view, never persisted on the entry itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier for the entry
    pub id: String,
    /// Income or Expense
    pub kind: EntryKind,
    /// Free-form category ("Course Balance", "Registration", "Rent", ...)
    pub category: String,
    /// Description of the transaction
    pub description: String,
    /// Amount of the entry, always positive
    pub amount: BigDecimal,
    /// How the money moved, when known
    pub payment_method: Option<String>,
    /// When the transaction occurred
    pub date: NaiveDateTime,
    /// Weak backreference to the enrollment that produced this entry.
    /// Lookup only, not ownership: the enrollment may no longer exist.
    pub enrollment_id: Option<String>,
}

impl LedgerEntry {
    /// Create an income entry
    pub fn income(
        id: String,
        category: String,
        description: String,
        amount: BigDecimal,
        date: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            kind: EntryKind::Income,
            category,
            description,
            amount,
            payment_method: None,
            date,
            enrollment_id: None,
        }
    }

    /// Create an expense entry
    pub fn expense(
        id: String,
        category: String,
        description: String,
        amount: BigDecimal,
        date: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            kind: EntryKind::Expense,
            category,
            description,
            amount,
            payment_method: None,
            date,
            enrollment_id: None,
        }
    }
}

/// Where a reconciled entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryOrigin {
    /// Persisted in the ledger store
    Recorded,
    /// Computed at query time to cover an enrollment's unrecorded payments;
    /// never persisted
    Synthesized,
}

/// A ledger entry tagged with its origin, as returned by reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledEntry {
    pub entry: LedgerEntry,
    pub origin: EntryOrigin,
}

/// Inclusive date window for reconciliation queries
///
/// `None` bounds are open. Entries are matched on the calendar date of their
/// timestamp, inclusive at both ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// A window matching every date
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// A window with both bounds set (inclusive)
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Whether a timestamp falls inside this window
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        let date = at.date();
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }
}

/// Why an enrollment was flagged during reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnomalyReason {
    /// More income has been recorded against the enrollment than the
    /// enrollment itself claims as paid. No negative entry is synthesized;
    /// the mismatch is reported here instead.
    OverRecorded {
        recorded: BigDecimal,
        amount_paid: BigDecimal,
    },
    /// The enrollment references a course that no longer exists. Its price is
    /// treated as zero: the full unrecorded amount synthesizes and it owes
    /// nothing, but callers must see that this is a guess, not a fact.
    MissingCourse { course_id: String },
}

/// A detected data-integrity violation, reported alongside a valid view.
/// Anomalies are never escalated to hard failures and never auto-corrected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityAnomaly {
    pub enrollment_id: String,
    pub reason: AnomalyReason,
}

/// Output of the reconciliation engine
///
/// Recorded and synthesized entries merged into one date-descending sequence
/// (entry id breaks ties, so reruns over an unchanged snapshot are
/// byte-identical), plus aggregates and the anomaly list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledLedgerView {
    /// The window the entry sequence was filtered by
    pub window: DateRange,
    /// Merged entries, date descending
    pub entries: Vec<ReconciledEntry>,
    /// Net revenue over the windowed sequence: income minus expense.
    /// Callers needing gross figures partition `entries` by kind.
    pub realized_revenue: BigDecimal,
    /// Sum of unpaid remainders over all enrollments, as of now.
    /// Independent of the window: an unpaid balance has no transaction date.
    pub receivables_outstanding: BigDecimal,
    /// Integrity violations found while reconciling, full snapshot
    pub anomalies: Vec<IntegrityAnomaly>,
}

/// Errors that can occur in the enrollment-finance core
#[derive(Debug, thiserror::Error)]
pub enum FinanceError {
    /// A referenced enrollment or course does not exist
    #[error("Not found: {0}")]
    NotFound(String),
    /// Non-positive or overpaying settlement amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    /// A concurrent settlement raced on the same enrollment; the caller must
    /// re-read the current balance and retry
    #[error("Write conflict: {0}")]
    Conflict(String),
    /// One of the backing stores could not be read, so no revenue figures can
    /// be produced. Never accompanied by a partial result.
    #[error("Reconciliation unavailable: {0}")]
    ReconciliationUnavailable(String),
    /// Storage-layer I/O failure outside reconciliation
    #[error("Storage error: {0}")]
    Storage(String),
    /// Input failed validation
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for enrollment-finance operations
pub type FinanceResult<T> = Result<T, FinanceError>;
