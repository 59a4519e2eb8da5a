//! # Course Finance Core
//!
//! The enrollment-finance reconciliation engine for a course-sales platform:
//! computes realized revenue, deferred (future) revenue, and
//! accounts-receivable exposure from two independently-mutated records —
//! course enrollments (a running `amount_paid` balance per student) and a
//! general ledger of discrete transactions.
//!
//! ## Features
//!
//! - **Reconciliation**: merges recorded ledger entries with query-time
//!   *synthesized* entries covering any enrollment-tracked payment not yet
//!   mirrored in the ledger, so every payment appears exactly once
//! - **Settlement workflow**: atomically closes an enrollment's outstanding
//!   balance, keeping both stores in agreement going forward
//! - **Integrity anomalies**: over-recorded balances and missing courses are
//!   reported alongside the view, never silently absorbed or escalated
//! - **Occupancy reporting**: enrolled-vs-capacity ratios per course, raw so
//!   overbooking stays visible
//! - **Storage abstraction**: backend-agnostic design with a trait-based
//!   async store
//! - **Exact money**: all amounts are `BigDecimal`; no floating point can
//!   fabricate or erase a cent across repeated reconciliations
//!
//! ## Quick Start
//!
//! ```rust
//! use course_finance_core::utils::MemoryStorage;
//! use course_finance_core::{DateRange, FinanceCore};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = MemoryStorage::new();
//! let core = FinanceCore::new(storage);
//!
//! let view = core.reconcile(DateRange::unbounded()).await?;
//! assert_eq!(view.entries.len(), 0);
//! # Ok(())
//! # }
//! ```

pub mod finance;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use finance::*;
pub use traits::*;
pub use types::*;
