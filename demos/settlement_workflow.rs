//! Settlement workflow example: closing an outstanding course balance

use bigdecimal::BigDecimal;
use course_finance_core::utils::MemoryStorage;
use course_finance_core::{Course, DateRange, Enrollment, FinanceCore, FinanceError};

fn money(s: &str) -> BigDecimal {
    s.parse().unwrap()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("🤝 Course Finance Core - Settlement Workflow Example\n");

    let storage = MemoryStorage::new();
    storage.put_course(Course::new(
        "diesel-101".to_string(),
        "Diesel Injection Systems".to_string(),
        money("1000.00"),
        20,
    ));
    let mut enrollment = Enrollment::new(
        "enr-ana".to_string(),
        "diesel-101".to_string(),
        "Ana Souza".to_string(),
    );
    enrollment.amount_paid = money("300.00");
    storage.put_enrollment(enrollment);

    let core = FinanceCore::new(storage);

    let before = core.reconcile(DateRange::unbounded()).await?;
    println!("Before settlement:");
    println!("  Realized:    {}", before.realized_revenue);
    println!("  Receivables: {}\n", before.receivables_outstanding);

    // Overpayment is rejected, not clamped.
    match core.settle_balance("enr-ana", money("800.00"), "Pix").await {
        Err(FinanceError::InvalidAmount(reason)) => {
            println!("Overpayment rejected: {reason}\n");
        }
        other => panic!("expected InvalidAmount, got {other:?}"),
    }

    // Settle the exact remaining balance: atomically bumps the enrollment's
    // running total and appends the matching recorded income entry.
    let settlement = core
        .settle_balance("enr-ana", money("700.00"), "Pix")
        .await?;
    println!(
        "Settled {} via {:?}; new balance {} ({:?})",
        settlement.entry.amount,
        settlement.entry.payment_method,
        settlement.new_amount_paid,
        settlement.new_status
    );

    let after = core.reconcile(DateRange::unbounded()).await?;
    println!("\nAfter settlement:");
    println!("  Entries:     {}", after.entries.len());
    println!("  Realized:    {}", after.realized_revenue);
    println!("  Receivables: {}", after.receivables_outstanding);

    Ok(())
}
