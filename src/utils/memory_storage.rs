//! In-memory storage implementation for testing

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::traits::*;
use crate::types::*;

/// In-memory storage implementation for testing and development
///
/// Clones share state through `Arc`, so one instance can back a core while a
/// test seeds or inspects it through another handle.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    courses: Arc<RwLock<HashMap<String, Course>>>,
    enrollments: Arc<RwLock<HashMap<String, Enrollment>>>,
    entries: Arc<RwLock<Vec<LedgerEntry>>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a course. Courses are external read-only input to
    /// the core, so seeding bypasses the storage trait.
    pub fn put_course(&self, course: Course) {
        self.courses
            .write()
            .unwrap()
            .insert(course.id.clone(), course);
    }

    /// Insert or replace an enrollment, standing in for the external
    /// enrollment-management UI.
    pub fn put_enrollment(&self, enrollment: Enrollment) {
        self.enrollments
            .write()
            .unwrap()
            .insert(enrollment.id.clone(), enrollment);
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        self.courses.write().unwrap().clear();
        self.enrollments.write().unwrap().clear();
        self.entries.write().unwrap().clear();
    }
}

#[async_trait]
impl FinanceStorage for MemoryStorage {
    async fn get_course(&self, course_id: &str) -> FinanceResult<Option<Course>> {
        Ok(self.courses.read().unwrap().get(course_id).cloned())
    }

    async fn list_courses(&self) -> FinanceResult<Vec<Course>> {
        Ok(self.courses.read().unwrap().values().cloned().collect())
    }

    async fn get_enrollment(&self, enrollment_id: &str) -> FinanceResult<Option<Enrollment>> {
        Ok(self.enrollments.read().unwrap().get(enrollment_id).cloned())
    }

    async fn list_enrollments(&self, course_id: Option<&str>) -> FinanceResult<Vec<Enrollment>> {
        let enrollments = self.enrollments.read().unwrap();
        let filtered: Vec<Enrollment> = enrollments
            .values()
            .filter(|enrollment| course_id.is_none_or(|c| enrollment.course_id == c))
            .cloned()
            .collect();
        Ok(filtered)
    }

    async fn list_ledger_entries(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> FinanceResult<Vec<LedgerEntry>> {
        let entries = self.entries.read().unwrap();
        let filtered: Vec<LedgerEntry> = entries
            .iter()
            .filter(|entry| {
                let date = entry.date.date();
                if let Some(start) = start_date {
                    if date < start {
                        return false;
                    }
                }
                if let Some(end) = end_date {
                    if date > end {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        Ok(filtered)
    }

    async fn insert_ledger_entry(&self, entry: &LedgerEntry) -> FinanceResult<()> {
        self.entries.write().unwrap().push(entry.clone());
        Ok(())
    }

    async fn apply_settlement(
        &self,
        update: EnrollmentPaidUpdate,
        entry: &LedgerEntry,
    ) -> FinanceResult<()> {
        // Hold both write locks for the whole operation so the optimistic
        // check, the balance update, and the ledger append are one atomic
        // unit from the point of view of any other caller.
        let mut enrollments = self.enrollments.write().unwrap();
        let mut entries = self.entries.write().unwrap();

        let enrollment = enrollments
            .get_mut(&update.enrollment_id)
            .ok_or_else(|| FinanceError::NotFound(format!("Enrollment '{}'", update.enrollment_id)))?;

        if enrollment.amount_paid != update.expected_paid {
            return Err(FinanceError::Conflict(format!(
                "Enrollment '{}' balance changed: expected {}, found {}",
                update.enrollment_id, update.expected_paid, enrollment.amount_paid
            )));
        }

        enrollment.amount_paid = update.new_paid;
        enrollment.status = update.new_status;
        entries.push(entry.clone());

        Ok(())
    }
}
