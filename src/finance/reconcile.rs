//! Reconciliation of the enrollment store against the general ledger
//!
//! Payments can be tracked in two places: on the enrollment row (the running
//! `amount_paid` balance) and as discrete ledger entries. For any portion of
//! an enrollment's balance not yet mirrored in the ledger, reconciliation
//! synthesizes a query-time income entry dated at enrollment creation, so the
//! merged sequence shows every payment exactly once regardless of where it
//! was recorded first.
//!
//! The whole computation is pure: it runs over snapshots fetched once by the
//! caller and touches no storage itself, so two concurrent reconciliations
//! may see different snapshots but each is internally consistent.

use bigdecimal::BigDecimal;
use std::collections::HashMap;
use tracing::warn;

use crate::types::*;

/// Prefix of deterministic synthetic entry ids, derived from the enrollment id
const SYNTHETIC_ID_PREFIX: &str = "virt-";

/// Category assigned to synthesized registration/signal payments
pub const REGISTRATION_CATEGORY: &str = "Registration";

/// The id a synthesized entry carries for a given enrollment. Deterministic,
/// so reruns over an unchanged snapshot produce identical views.
pub fn synthetic_entry_id(enrollment_id: &str) -> String {
    format!("{SYNTHETIC_ID_PREFIX}{enrollment_id}")
}

/// Reconcile one snapshot of the two stores into a single revenue picture.
///
/// `entries` must be the *full* recorded ledger, not a windowed slice: gap
/// computation and anomaly detection run over everything linked to an
/// enrollment, and only the merged output sequence is filtered by `window`.
/// Windowing the input would let a settlement recorded outside the window be
/// re-synthesized inside it, double counting the payment.
pub fn reconcile_snapshot(
    entries: &[LedgerEntry],
    enrollments: &[Enrollment],
    courses: &[Course],
    window: DateRange,
) -> ReconciledLedgerView {
    let zero = BigDecimal::from(0);

    let courses_by_id: HashMap<&str, &Course> =
        courses.iter().map(|c| (c.id.as_str(), c)).collect();

    // Sum of recorded income already linked to each enrollment, full ledger.
    let mut linked_totals: HashMap<&str, BigDecimal> = HashMap::new();
    for entry in entries {
        if entry.kind == EntryKind::Income {
            if let Some(enrollment_id) = entry.enrollment_id.as_deref() {
                *linked_totals.entry(enrollment_id).or_insert_with(|| zero.clone()) +=
                    &entry.amount;
            }
        }
    }

    // Iterate enrollments in id order so the anomaly list (and everything
    // else) is identical across reruns of the same snapshot.
    let mut ordered: Vec<&Enrollment> = enrollments.iter().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));

    let mut synthesized: Vec<LedgerEntry> = Vec::new();
    let mut anomalies: Vec<IntegrityAnomaly> = Vec::new();
    let mut receivables = zero.clone();

    for enrollment in ordered {
        let course = courses_by_id.get(enrollment.course_id.as_str()).copied();

        // A missing course means the price is unknown. Treat it as zero so
        // nothing is owed against it, but surface the situation rather than
        // letting the enrollment read as fully paid.
        let price = match course {
            Some(course) => course.price.clone(),
            None => {
                warn!(
                    enrollment_id = %enrollment.id,
                    course_id = %enrollment.course_id,
                    "enrollment references a missing course"
                );
                anomalies.push(IntegrityAnomaly {
                    enrollment_id: enrollment.id.clone(),
                    reason: AnomalyReason::MissingCourse {
                        course_id: enrollment.course_id.clone(),
                    },
                });
                zero.clone()
            }
        };

        let outstanding = &price - &enrollment.amount_paid;
        if outstanding > zero {
            receivables += outstanding;
        }

        let linked = linked_totals
            .get(enrollment.id.as_str())
            .cloned()
            .unwrap_or_else(|| zero.clone());
        let gap = &enrollment.amount_paid - &linked;

        if gap > zero {
            synthesized.push(synthesized_entry(enrollment, course, gap));
        } else if gap < zero {
            warn!(
                enrollment_id = %enrollment.id,
                recorded = %linked,
                amount_paid = %enrollment.amount_paid,
                "more income recorded than the enrollment claims as paid"
            );
            anomalies.push(IntegrityAnomaly {
                enrollment_id: enrollment.id.clone(),
                reason: AnomalyReason::OverRecorded {
                    recorded: linked,
                    amount_paid: enrollment.amount_paid.clone(),
                },
            });
        }
    }

    // Merge recorded and synthesized, window-filtered by the same predicate.
    let mut merged: Vec<ReconciledEntry> = entries
        .iter()
        .filter(|e| window.contains(e.date))
        .map(|e| ReconciledEntry {
            entry: e.clone(),
            origin: EntryOrigin::Recorded,
        })
        .chain(
            synthesized
                .into_iter()
                .filter(|e| window.contains(e.date))
                .map(|e| ReconciledEntry {
                    entry: e,
                    origin: EntryOrigin::Synthesized,
                }),
        )
        .collect();

    merged.sort_by(|a, b| {
        b.entry
            .date
            .cmp(&a.entry.date)
            .then_with(|| a.entry.id.cmp(&b.entry.id))
    });

    let mut realized = zero;
    for reconciled in &merged {
        match reconciled.entry.kind {
            EntryKind::Income => realized += &reconciled.entry.amount,
            EntryKind::Expense => realized -= &reconciled.entry.amount,
        }
    }

    ReconciledLedgerView {
        window,
        entries: merged,
        realized_revenue: realized,
        receivables_outstanding: receivables,
        anomalies,
    }
}

/// Build the synthesized income entry covering an enrollment's unrecorded
/// payment portion. Dated at enrollment creation: that is when the money was
/// tracked, and it is what the date window filters on.
fn synthesized_entry(
    enrollment: &Enrollment,
    course: Option<&Course>,
    gap: BigDecimal,
) -> LedgerEntry {
    let course_title = course.map(|c| c.title.as_str()).unwrap_or("Unknown course");

    LedgerEntry {
        id: synthetic_entry_id(&enrollment.id),
        kind: EntryKind::Income,
        category: REGISTRATION_CATEGORY.to_string(),
        description: format!("Registration: {} - {}", course_title, enrollment.student_name),
        amount: gap,
        payment_method: enrollment.payment_method.clone(),
        date: enrollment.created_at,
        enrollment_id: Some(enrollment.id.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn money(s: &str) -> BigDecimal {
        s.parse().unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn course(id: &str, price: &str) -> Course {
        Course::new(id.to_string(), format!("Course {id}"), money(price), 20)
    }

    fn enrollment(id: &str, course_id: &str, paid: &str) -> Enrollment {
        let mut e = Enrollment::new(id.to_string(), course_id.to_string(), format!("Student {id}"));
        e.amount_paid = money(paid);
        e.created_at = at(2024, 1, 10);
        e
    }

    fn linked_income(id: &str, enrollment_id: &str, amount: &str) -> LedgerEntry {
        let mut entry = LedgerEntry::income(
            id.to_string(),
            "Course Balance".to_string(),
            "Balance payment".to_string(),
            money(amount),
            at(2024, 2, 1),
        );
        entry.enrollment_id = Some(enrollment_id.to_string());
        entry
    }

    #[test]
    fn gap_synthesizes_one_income_entry() {
        let courses = vec![course("c1", "1000.00")];
        let enrollments = vec![enrollment("e1", "c1", "300.00")];

        let view = reconcile_snapshot(&[], &enrollments, &courses, DateRange::unbounded());

        assert_eq!(view.entries.len(), 1);
        let synthesized = &view.entries[0];
        assert_eq!(synthesized.origin, EntryOrigin::Synthesized);
        assert_eq!(synthesized.entry.id, "virt-e1");
        assert_eq!(synthesized.entry.kind, EntryKind::Income);
        assert_eq!(synthesized.entry.amount, money("300.00"));
        assert_eq!(synthesized.entry.date, at(2024, 1, 10));
        assert_eq!(synthesized.entry.enrollment_id.as_deref(), Some("e1"));
        assert_eq!(view.realized_revenue, money("300.00"));
        assert_eq!(view.receivables_outstanding, money("700.00"));
        assert!(view.anomalies.is_empty());
    }

    #[test]
    fn fully_linked_enrollment_synthesizes_nothing() {
        let courses = vec![course("c1", "1000.00")];
        let enrollments = vec![enrollment("e1", "c1", "400.00")];
        let entries = vec![linked_income("t1", "e1", "400.00")];

        let view = reconcile_snapshot(&entries, &enrollments, &courses, DateRange::unbounded());

        assert_eq!(view.entries.len(), 1);
        assert_eq!(view.entries[0].origin, EntryOrigin::Recorded);
        assert_eq!(view.realized_revenue, money("400.00"));
        assert!(view.anomalies.is_empty());
    }

    #[test]
    fn partial_link_synthesizes_only_the_remainder() {
        let courses = vec![course("c1", "1000.00")];
        let enrollments = vec![enrollment("e1", "c1", "500.00")];
        let entries = vec![linked_income("t1", "e1", "200.00")];

        let view = reconcile_snapshot(&entries, &enrollments, &courses, DateRange::unbounded());

        let synthesized: Vec<_> = view
            .entries
            .iter()
            .filter(|e| e.origin == EntryOrigin::Synthesized)
            .collect();
        assert_eq!(synthesized.len(), 1);
        assert_eq!(synthesized[0].entry.amount, money("300.00"));
        assert_eq!(view.realized_revenue, money("500.00"));
    }

    #[test]
    fn negative_gap_is_an_anomaly_not_a_negative_entry() {
        let courses = vec![course("c1", "1000.00")];
        let enrollments = vec![enrollment("e1", "c1", "100.00")];
        let entries = vec![linked_income("t1", "e1", "150.00")];

        let view = reconcile_snapshot(&entries, &enrollments, &courses, DateRange::unbounded());

        // Only the recorded entry appears; the mismatch is reported, not
        // absorbed into the totals.
        assert_eq!(view.entries.len(), 1);
        assert_eq!(view.entries[0].origin, EntryOrigin::Recorded);
        assert_eq!(view.anomalies.len(), 1);
        assert_eq!(view.anomalies[0].enrollment_id, "e1");
        assert_eq!(
            view.anomalies[0].reason,
            AnomalyReason::OverRecorded {
                recorded: money("150.00"),
                amount_paid: money("100.00"),
            }
        );
        assert_eq!(view.realized_revenue, money("150.00"));
    }

    #[test]
    fn missing_course_synthesizes_full_paid_and_owes_nothing() {
        let enrollments = vec![enrollment("e1", "ghost", "250.00")];

        let view = reconcile_snapshot(&[], &enrollments, &[], DateRange::unbounded());

        assert_eq!(view.entries.len(), 1);
        assert_eq!(view.entries[0].entry.amount, money("250.00"));
        assert!(view.entries[0].entry.description.contains("Unknown course"));
        assert_eq!(view.receivables_outstanding, money("0"));
        assert_eq!(view.anomalies.len(), 1);
        assert_eq!(
            view.anomalies[0].reason,
            AnomalyReason::MissingCourse {
                course_id: "ghost".to_string(),
            }
        );
    }

    #[test]
    fn synthesized_entries_are_windowed_by_enrollment_creation_date() {
        let courses = vec![course("c1", "1000.00")];
        let enrollments = vec![enrollment("e1", "c1", "300.00")]; // created 2024-01-10

        let january = DateRange::between(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );
        let february = DateRange::between(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
        );

        let in_window = reconcile_snapshot(&[], &enrollments, &courses, january);
        assert_eq!(in_window.entries.len(), 1);
        assert_eq!(in_window.realized_revenue, money("300.00"));

        let out_of_window = reconcile_snapshot(&[], &enrollments, &courses, february);
        assert!(out_of_window.entries.is_empty());
        assert_eq!(out_of_window.realized_revenue, money("0"));
        // Receivables ignore the window entirely.
        assert_eq!(out_of_window.receivables_outstanding, money("700.00"));
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let entries = vec![LedgerEntry::income(
            "t1".to_string(),
            "Sales".to_string(),
            "Edge of window".to_string(),
            money("10.00"),
            at(2024, 1, 31),
        )];

        let window = DateRange::between(
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        );

        let view = reconcile_snapshot(&entries, &[], &[], window);
        assert_eq!(view.entries.len(), 1);
    }

    #[test]
    fn expenses_reduce_realized_revenue() {
        let entries = vec![
            LedgerEntry::income(
                "t1".to_string(),
                "Sales".to_string(),
                "Sale".to_string(),
                money("500.00"),
                at(2024, 3, 1),
            ),
            LedgerEntry::expense(
                "t2".to_string(),
                "Rent".to_string(),
                "Venue rent".to_string(),
                money("120.00"),
                at(2024, 3, 2),
            ),
        ];

        let view = reconcile_snapshot(&entries, &[], &[], DateRange::unbounded());
        assert_eq!(view.realized_revenue, money("380.00"));
    }

    #[test]
    fn unlinked_income_does_not_shrink_any_gap() {
        // Income with no enrollment backreference is general revenue; it must
        // not be attributed to an enrollment's balance.
        let courses = vec![course("c1", "1000.00")];
        let enrollments = vec![enrollment("e1", "c1", "300.00")];
        let entries = vec![LedgerEntry::income(
            "t1".to_string(),
            "Sales".to_string(),
            "Walk-in sale".to_string(),
            money("300.00"),
            at(2024, 2, 1),
        )];

        let view = reconcile_snapshot(&entries, &enrollments, &courses, DateRange::unbounded());

        let synthesized: Vec<_> = view
            .entries
            .iter()
            .filter(|e| e.origin == EntryOrigin::Synthesized)
            .collect();
        assert_eq!(synthesized.len(), 1);
        assert_eq!(synthesized[0].entry.amount, money("300.00"));
        assert_eq!(view.realized_revenue, money("600.00"));
    }

    #[test]
    fn rerun_on_unchanged_snapshot_is_identical() {
        let courses = vec![course("c1", "1000.00"), course("c2", "500.00")];
        let enrollments = vec![
            enrollment("e2", "c2", "500.00"),
            enrollment("e1", "c1", "300.00"),
            enrollment("e3", "ghost", "50.00"),
        ];
        let entries = vec![
            linked_income("t1", "e1", "100.00"),
            linked_income("t2", "e9", "75.00"),
        ];

        let window = DateRange::unbounded();
        let first = reconcile_snapshot(&entries, &enrollments, &courses, window);
        let second = reconcile_snapshot(&entries, &enrollments, &courses, window);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn conservation_holds_for_every_enrollment() {
        let courses = vec![course("c1", "1000.00")];
        let enrollments = vec![
            enrollment("e1", "c1", "300.00"),
            enrollment("e2", "c1", "1000.00"),
            enrollment("e3", "c1", "0"),
        ];
        let entries = vec![
            linked_income("t1", "e1", "100.00"),
            linked_income("t2", "e2", "1000.00"),
        ];

        let view = reconcile_snapshot(&entries, &enrollments, &courses, DateRange::unbounded());

        for enrollment in &enrollments {
            let linked: BigDecimal = entries
                .iter()
                .filter(|e| e.enrollment_id.as_deref() == Some(enrollment.id.as_str()))
                .map(|e| e.amount.clone())
                .sum();
            let gap: BigDecimal = view
                .entries
                .iter()
                .filter(|e| {
                    e.origin == EntryOrigin::Synthesized
                        && e.entry.enrollment_id.as_deref() == Some(enrollment.id.as_str())
                })
                .map(|e| e.entry.amount.clone())
                .sum();
            assert_eq!(linked + gap, enrollment.amount_paid);
        }
    }

    #[test]
    fn merged_sequence_is_date_descending() {
        let entries = vec![
            LedgerEntry::income(
                "a".to_string(),
                "Sales".to_string(),
                "Older".to_string(),
                money("1.00"),
                at(2024, 1, 1),
            ),
            LedgerEntry::income(
                "b".to_string(),
                "Sales".to_string(),
                "Newer".to_string(),
                money("1.00"),
                at(2024, 6, 1),
            ),
        ];
        let courses = vec![course("c1", "100.00")];
        let enrollments = vec![enrollment("e1", "c1", "20.00")]; // created 2024-01-10

        let view = reconcile_snapshot(&entries, &enrollments, &courses, DateRange::unbounded());

        let dates: Vec<_> = view.entries.iter().map(|e| e.entry.date).collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);
        assert_eq!(view.entries[0].entry.id, "b");
    }
}
