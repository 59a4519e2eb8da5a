//! Settlement of an enrollment's outstanding course balance
//!
//! The only externally exposed mutator in this crate. A settlement increases
//! the enrollment's running `amount_paid` and appends the matching recorded
//! income entry in one atomic storage operation, so the two stores stay in
//! agreement and reconciliation never sees the payment in only one place.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::traits::{EnrollmentPaidUpdate, FinanceStorage};
use crate::types::*;

/// Category assigned to recorded balance-settlement entries
pub const COURSE_BALANCE_CATEGORY: &str = "Course Balance";

/// Outcome of a successful settlement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementResult {
    pub enrollment_id: String,
    /// The enrollment's running total after this settlement
    pub new_amount_paid: BigDecimal,
    pub new_status: EnrollmentStatus,
    /// The recorded ledger entry this settlement appended
    pub entry: LedgerEntry,
}

/// Settlement manager for closing enrollment balances
pub struct SettlementManager<S: FinanceStorage> {
    storage: S,
}

impl<S: FinanceStorage> SettlementManager<S> {
    /// Create a new settlement manager
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Settle part or all of an enrollment's outstanding balance.
    ///
    /// Overpayment is rejected, not clamped: `amount` may not exceed
    /// `course.price - amount_paid`. Rejecting keeps `amount_paid <= price`
    /// an invariant of every settlement path.
    ///
    /// # Errors
    ///
    /// - [`FinanceError::InvalidAmount`] - non-positive or overpaying amount.
    /// - [`FinanceError::NotFound`] - enrollment or its course is absent.
    /// - [`FinanceError::Conflict`] - a concurrent settlement changed the
    ///   enrollment's balance between our read and write. Nothing was
    ///   written; re-read the balance and retry.
    pub async fn settle_balance(
        &self,
        enrollment_id: &str,
        amount: BigDecimal,
        method: &str,
    ) -> FinanceResult<SettlementResult> {
        if amount <= BigDecimal::from(0) {
            return Err(FinanceError::InvalidAmount(
                "Settlement amount must be positive".to_string(),
            ));
        }

        let enrollment = self
            .storage
            .get_enrollment(enrollment_id)
            .await?
            .ok_or_else(|| FinanceError::NotFound(format!("Enrollment '{enrollment_id}'")))?;

        // The course price bounds the settlement; without it there is nothing
        // to validate against.
        let course = self
            .storage
            .get_course(&enrollment.course_id)
            .await?
            .ok_or_else(|| {
                FinanceError::NotFound(format!(
                    "Course '{}' for enrollment '{enrollment_id}'",
                    enrollment.course_id
                ))
            })?;

        let remaining = &course.price - &enrollment.amount_paid;
        if amount > remaining {
            return Err(FinanceError::InvalidAmount(format!(
                "Settlement of {amount} exceeds remaining balance of {remaining}"
            )));
        }

        let new_paid = &enrollment.amount_paid + &amount;
        let new_status = enrollment.status.after_settlement();

        let entry = LedgerEntry {
            id: Uuid::new_v4().to_string(),
            kind: EntryKind::Income,
            category: COURSE_BALANCE_CATEGORY.to_string(),
            description: format!(
                "Course balance: {} - {}",
                course.title, enrollment.student_name
            ),
            amount,
            payment_method: Some(method.to_string()),
            date: chrono::Utc::now().naive_utc(),
            enrollment_id: Some(enrollment.id.clone()),
        };

        // Both writes or neither. The expected_paid check turns a lost-update
        // race into a Conflict the caller can retry.
        self.storage
            .apply_settlement(
                EnrollmentPaidUpdate {
                    enrollment_id: enrollment.id.clone(),
                    expected_paid: enrollment.amount_paid.clone(),
                    new_paid: new_paid.clone(),
                    new_status,
                },
                &entry,
            )
            .await?;

        debug!(
            enrollment_id = %enrollment.id,
            amount = %entry.amount,
            new_paid = %new_paid,
            "settled course balance"
        );

        Ok(SettlementResult {
            enrollment_id: enrollment.id,
            new_amount_paid: new_paid,
            new_status,
            entry,
        })
    }
}
