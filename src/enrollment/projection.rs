use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

use crate::domain::{Course, CourseId, Enrollment, EnrollmentId, EnrollmentStatus, Student, StudentId};
use crate::error::EnrollmentError;
use crate::store::{CourseStore, StudentStore};

/// External shape of an enrollment. Field names are a wire contract with
/// existing frontends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRecord {
    pub id: EnrollmentId,
    pub student_first_name: String,
    pub student_last_name: String,
    pub course_title: String,
    pub status: EnrollmentStatus,
    pub enrollment_date: DateTime<Utc>,
}

impl EnrollmentRecord {
    pub fn new(enrollment: &Enrollment, student: &Student, course: &Course) -> Self {
        Self {
            id: enrollment.id,
            student_first_name: student.first_name.clone(),
            student_last_name: student.last_name.clone(),
            course_title: course.title.clone(),
            status: enrollment.status(),
            enrollment_date: enrollment.enrolled_at(),
        }
    }
}

/// Joins enrollments with their student and course.
#[derive(Clone)]
pub struct EnrollmentProjector {
    students: Arc<dyn StudentStore>,
    courses: Arc<dyn CourseStore>,
}

impl EnrollmentProjector {
    pub fn new(students: Arc<dyn StudentStore>, courses: Arc<dyn CourseStore>) -> Self {
        Self { students, courses }
    }

    pub async fn project(&self, enrollment: &Enrollment) -> Result<EnrollmentRecord, EnrollmentError> {
        let student = self.student(enrollment).await?;
        let course = self.course(enrollment).await?;
        Ok(EnrollmentRecord::new(enrollment, &student, &course))
    }

    /// Project a batch, fetching each referenced student and course once.
    pub async fn project_all(
        &self,
        enrollments: &[Enrollment],
    ) -> Result<Vec<EnrollmentRecord>, EnrollmentError> {
        let mut students: HashMap<StudentId, Student> = HashMap::new();
        let mut courses: HashMap<CourseId, Course> = HashMap::new();
        let mut records = Vec::with_capacity(enrollments.len());

        for enrollment in enrollments {
            if !students.contains_key(&enrollment.student_id) {
                students.insert(enrollment.student_id, self.student(enrollment).await?);
            }
            if !courses.contains_key(&enrollment.course_id) {
                courses.insert(enrollment.course_id, self.course(enrollment).await?);
            }
            records.push(EnrollmentRecord::new(
                enrollment,
                &students[&enrollment.student_id],
                &courses[&enrollment.course_id],
            ));
        }

        Ok(records)
    }

    async fn student(&self, enrollment: &Enrollment) -> Result<Student, EnrollmentError> {
        self.students
            .get_by_id(enrollment.student_id)
            .await?
            .ok_or_else(|| {
                error!(enrollment.id = %enrollment.id, student.id = %enrollment.student_id, "Dangling student reference");
                EnrollmentError::Integrity(format!(
                    "enrollment {} references missing student {}",
                    enrollment.id, enrollment.student_id
                ))
            })
    }

    async fn course(&self, enrollment: &Enrollment) -> Result<Course, EnrollmentError> {
        self.courses
            .get_by_id(enrollment.course_id)
            .await?
            .ok_or_else(|| {
                error!(enrollment.id = %enrollment.id, course.id = %enrollment.course_id, "Dangling course reference");
                EnrollmentError::Integrity(format!(
                    "enrollment {} references missing course {}",
                    enrollment.id, enrollment.course_id
                ))
            })
    }
}
