//! Basic reconciliation example

use bigdecimal::BigDecimal;
use course_finance_core::utils::MemoryStorage;
use course_finance_core::{
    Course, DateRange, Enrollment, EntryOrigin, FinanceCore, LedgerEntry,
};

fn money(s: &str) -> BigDecimal {
    s.parse().unwrap()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("💰 Course Finance Core - Basic Reconciliation Example\n");

    // Seed a catalog and some enrollments, standing in for the external
    // course-management UI.
    let storage = MemoryStorage::new();
    storage.put_course(Course::new(
        "diesel-101".to_string(),
        "Diesel Injection Systems".to_string(),
        money("1000.00"),
        20,
    ));

    let mut ana = Enrollment::new(
        "enr-ana".to_string(),
        "diesel-101".to_string(),
        "Ana Souza".to_string(),
    );
    ana.amount_paid = money("300.00"); // signal payment, tracked on the row only
    storage.put_enrollment(ana);

    let mut bruno = Enrollment::new(
        "enr-bruno".to_string(),
        "diesel-101".to_string(),
        "Bruno Lima".to_string(),
    );
    bruno.amount_paid = money("1000.00"); // paid in full up front
    storage.put_enrollment(bruno);

    let core = FinanceCore::new(storage);

    // A manual bookkeeping entry, unrelated to any enrollment.
    core.record_entry(LedgerEntry::expense(
        "rent-2024-03".to_string(),
        "Rent".to_string(),
        "Workshop rent, March".to_string(),
        money("450.00"),
        chrono::Utc::now().naive_utc(),
    ))
    .await?;

    // Reconcile: signal payments tracked only on enrollment rows show up as
    // synthesized entries, merged with the recorded ledger.
    println!("📒 Reconciled ledger (all dates):");
    let view = core.reconcile(DateRange::unbounded()).await?;
    for reconciled in &view.entries {
        let origin = match reconciled.origin {
            EntryOrigin::Recorded => "recorded",
            EntryOrigin::Synthesized => "synthesized",
        };
        println!(
            "  {:>11}  {:?} {:>10}  {}",
            origin, reconciled.entry.kind, reconciled.entry.amount, reconciled.entry.description
        );
    }
    println!();
    println!("  Realized revenue:        {}", view.realized_revenue);
    println!("  Receivables outstanding: {}", view.receivables_outstanding);
    println!("  Anomalies:               {}", view.anomalies.len());
    println!();

    // Occupancy for the dashboard.
    let occupancy = core.occupancy("diesel-101").await?;
    println!(
        "🪑 Occupancy: {}/{} ({:.0}%)",
        occupancy.enrolled_count,
        occupancy.capacity,
        occupancy.ratio * 100.0
    );

    let projection = core.revenue_projection("diesel-101").await?;
    println!(
        "📈 Revenue projection: expected {} of potential {}",
        projection.expected, projection.potential
    );

    Ok(())
}
