//! Occupancy and revenue-projection reports per course

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::traits::FinanceStorage;
use crate::types::*;

/// Enrolled-vs-capacity picture of one course
///
/// The ratio is raw and unclamped so overbooking is visible; display layers
/// that want a percentage capped at 100 do the clamping themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyReport {
    pub course_id: String,
    pub enrolled_count: usize,
    pub capacity: u32,
    /// `enrolled_count / capacity`, possibly above 1.0. Zero capacity yields
    /// 0.0 rather than a non-finite value; `enrolled_count` still carries the
    /// overbooking signal in that case.
    pub ratio: f64,
}

/// Projected revenue for one course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRevenueProjection {
    pub course_id: String,
    /// Revenue at full capacity: price times capacity
    pub potential: BigDecimal,
    /// Revenue if every current enrollee pays in full: price times enrolled
    pub expected: BigDecimal,
}

/// Report generator over the course catalog and enrollment store
pub struct OccupancyReporter<S: FinanceStorage> {
    storage: S,
}

impl<S: FinanceStorage> OccupancyReporter<S> {
    /// Create a new occupancy reporter
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Enrollment count against capacity for one course
    pub async fn occupancy(&self, course_id: &str) -> FinanceResult<OccupancyReport> {
        let course = self
            .storage
            .get_course(course_id)
            .await?
            .ok_or_else(|| FinanceError::NotFound(format!("Course '{course_id}'")))?;

        let enrolled_count = self.storage.list_enrollments(Some(course_id)).await?.len();

        let ratio = if course.capacity == 0 {
            0.0
        } else {
            enrolled_count as f64 / course.capacity as f64
        };

        Ok(OccupancyReport {
            course_id: course.id,
            enrolled_count,
            capacity: course.capacity,
            ratio,
        })
    }

    /// Potential and expected revenue for one course
    pub async fn revenue_projection(
        &self,
        course_id: &str,
    ) -> FinanceResult<CourseRevenueProjection> {
        let course = self
            .storage
            .get_course(course_id)
            .await?
            .ok_or_else(|| FinanceError::NotFound(format!("Course '{course_id}'")))?;

        let enrolled = self.storage.list_enrollments(Some(course_id)).await?.len();

        Ok(CourseRevenueProjection {
            course_id: course.id,
            potential: &course.price * BigDecimal::from(course.capacity),
            expected: &course.price * BigDecimal::from(enrolled as u64),
        })
    }
}
