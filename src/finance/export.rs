//! CSV export of a reconciled ledger view

use serde::Serialize;
use std::io;

use crate::types::*;

/// One exported row. Everything is rendered to strings up front so the file
/// carries exact decimal amounts, not float round-trips.
#[derive(Debug, Serialize)]
struct CsvRecord {
    date: String,
    description: String,
    category: String,
    kind: String,
    amount: String,
    payment_method: String,
    origin: String,
}

impl CsvRecord {
    fn from_reconciled(reconciled: &ReconciledEntry) -> Self {
        let entry = &reconciled.entry;
        Self {
            date: entry.date.format("%Y-%m-%d").to_string(),
            description: entry.description.clone(),
            category: entry.category.clone(),
            kind: match entry.kind {
                EntryKind::Income => "Income".to_string(),
                EntryKind::Expense => "Expense".to_string(),
            },
            amount: entry.amount.to_string(),
            payment_method: entry.payment_method.clone().unwrap_or_default(),
            origin: match reconciled.origin {
                EntryOrigin::Recorded => "Recorded".to_string(),
                EntryOrigin::Synthesized => "Synthesized".to_string(),
            },
        }
    }
}

/// Write a reconciled view's entry sequence as CSV, in view order
/// (date descending), with a header row.
pub fn write_csv<W: io::Write>(view: &ReconciledLedgerView, writer: W) -> FinanceResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for reconciled in &view.entries {
        csv_writer
            .serialize(CsvRecord::from_reconciled(reconciled))
            .map_err(|e| FinanceError::Storage(format!("CSV export failed: {e}")))?;
    }

    csv_writer
        .flush()
        .map_err(|e| FinanceError::Storage(format!("CSV export failed: {e}")))
}

/// Render a reconciled view's entry sequence to a CSV string
pub fn to_csv_string(view: &ReconciledLedgerView) -> FinanceResult<String> {
    let mut buffer = Vec::new();
    write_csv(view, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| FinanceError::Storage(format!("CSV export failed: {e}")))
}
