//! Validation utilities

use crate::traits::*;
use crate::types::*;
use bigdecimal::BigDecimal;

/// Validate that an amount is positive
pub fn validate_positive_amount(amount: &BigDecimal) -> FinanceResult<()> {
    if *amount <= BigDecimal::from(0) {
        Err(FinanceError::Validation(
            "Amount must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate that an entry ID is valid
pub fn validate_entry_id(entry_id: &str) -> FinanceResult<()> {
    if entry_id.trim().is_empty() {
        return Err(FinanceError::Validation(
            "Entry ID cannot be empty".to_string(),
        ));
    }

    if entry_id.len() > 64 {
        return Err(FinanceError::Validation(
            "Entry ID cannot exceed 64 characters".to_string(),
        ));
    }

    // Check for valid characters (alphanumeric, dashes, underscores)
    if !entry_id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(FinanceError::Validation(
            "Entry ID can only contain alphanumeric characters, dashes, and underscores"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validate that an entry description is valid
pub fn validate_entry_description(description: &str) -> FinanceResult<()> {
    if description.trim().is_empty() {
        return Err(FinanceError::Validation(
            "Entry description cannot be empty".to_string(),
        ));
    }

    if description.len() > 500 {
        return Err(FinanceError::Validation(
            "Entry description cannot exceed 500 characters".to_string(),
        ));
    }

    Ok(())
}

/// Validate that an entry category is valid
pub fn validate_entry_category(category: &str) -> FinanceResult<()> {
    if category.trim().is_empty() {
        return Err(FinanceError::Validation(
            "Entry category cannot be empty".to_string(),
        ));
    }

    if category.len() > 100 {
        return Err(FinanceError::Validation(
            "Entry category cannot exceed 100 characters".to_string(),
        ));
    }

    Ok(())
}

/// Enhanced entry validator with detailed checks
pub struct EnhancedEntryValidator;

impl EntryValidator for EnhancedEntryValidator {
    fn validate_entry(&self, entry: &LedgerEntry) -> FinanceResult<()> {
        validate_entry_id(&entry.id)?;
        validate_entry_description(&entry.description)?;
        validate_entry_category(&entry.category)?;
        validate_positive_amount(&entry.amount)?;

        if let Some(enrollment_id) = entry.enrollment_id.as_deref() {
            if enrollment_id.trim().is_empty() {
                return Err(FinanceError::Validation(
                    "Enrollment backreference cannot be an empty string".to_string(),
                ));
            }
        }

        Ok(())
    }
}
