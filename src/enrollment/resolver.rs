use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use super::{require, Directory};
use crate::domain::{Course, CourseId, Enrollment, NewEnrollment, Student, StudentId};
use crate::error::{EnrollmentError, NotFound};
use crate::store::{StoreError, Stores};

/// Turns an enrollment request into a new `Pending` enrollment.
///
/// Every failure path leaves the stores untouched. The final
/// existence check and the insert are one atomic store call, so two racing
/// requests for the same pair produce exactly one enrollment.
#[derive(Clone)]
pub struct EnrollmentResolver {
    directory: Directory,
    stores: Stores,
}

impl EnrollmentResolver {
    pub fn new(stores: Stores) -> Self {
        Self {
            directory: Directory::new(stores.students.clone(), stores.courses.clone()),
            stores,
        }
    }

    /// Enroll a student named by first and last name in a course named by
    /// title.
    pub async fn enroll(
        &self,
        first_name: &str,
        last_name: &str,
        course_title: &str,
    ) -> Result<Enrollment, EnrollmentError> {
        let first_name = require(first_name, "First name is required")?;
        let last_name = require(last_name, "Last name is required")?;
        let course_title = require(course_title, "Course name is required")?;

        let course = self.directory.find_course(course_title).await?;
        let student = self.directory.find_student(first_name, last_name).await?;

        self.create(&student, &course).await
    }

    /// Enroll by store ids rather than by name.
    pub async fn enroll_by_ids(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Enrollment, EnrollmentError> {
        let student = self
            .stores
            .students
            .get_by_id(student_id)
            .await?
            .ok_or(NotFound::StudentId(student_id))?;
        let course = self
            .stores
            .courses
            .get_by_id(course_id)
            .await?
            .ok_or(NotFound::CourseId(course_id))?;

        self.create(&student, &course).await
    }

    async fn create(&self, student: &Student, course: &Course) -> Result<Enrollment, EnrollmentError> {
        if self.stores.enrollments.exists_for(student.id, course.id).await? {
            warn!(student.id = %student.id, course.id = %course.id, "Student already enrolled");
            return Err(already_enrolled(course));
        }

        let pending = NewEnrollment::pending(student.id, course.id, Utc::now());
        match self.stores.enrollments.insert_new(pending).await {
            Ok(enrollment) => {
                info!(
                    enrollment.id = %enrollment.id,
                    student.id = %student.id,
                    course.id = %course.id,
                    "Enrollment request created"
                );
                Ok(enrollment)
            }
            // lost a race against a concurrent request for the same pair
            Err(StoreError::DuplicatePair { .. }) => {
                warn!(student.id = %student.id, course.id = %course.id, "Concurrent duplicate enrollment rejected");
                Err(already_enrolled(course))
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn already_enrolled(course: &Course) -> EnrollmentError {
    EnrollmentError::Conflict(format!("You are already enrolled in '{}'", course.title))
}
