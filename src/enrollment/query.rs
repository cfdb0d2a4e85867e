use crate::domain::{CourseId, EnrollmentId, EnrollmentStatus, StudentId};
use crate::error::{EnrollmentError, NotFound};
use crate::store::Stores;

use super::{EnrollmentProjector, EnrollmentRecord};

/// Read-only views over enrollments, always returned projected.
#[derive(Clone)]
pub struct EnrollmentQueries {
    stores: Stores,
    projector: EnrollmentProjector,
}

impl EnrollmentQueries {
    pub fn new(stores: Stores) -> Self {
        Self {
            projector: EnrollmentProjector::new(stores.students.clone(), stores.courses.clone()),
            stores,
        }
    }

    pub async fn by_id(&self, id: EnrollmentId) -> Result<EnrollmentRecord, EnrollmentError> {
        let enrollment = self
            .stores
            .enrollments
            .get_by_id(id)
            .await?
            .ok_or(NotFound::Enrollment(id))?;
        self.projector.project(&enrollment).await
    }

    pub async fn all(&self) -> Result<Vec<EnrollmentRecord>, EnrollmentError> {
        let enrollments = self.stores.enrollments.list_all().await?;
        self.projector.project_all(&enrollments).await
    }

    /// Fails with `NotFound` for an unknown student, rather than returning
    /// an empty list.
    pub async fn by_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<EnrollmentRecord>, EnrollmentError> {
        if self.stores.students.get_by_id(student_id).await?.is_none() {
            return Err(NotFound::StudentId(student_id).into());
        }
        let enrollments = self.stores.enrollments.list_by_student(student_id).await?;
        self.projector.project_all(&enrollments).await
    }

    pub async fn by_course(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<EnrollmentRecord>, EnrollmentError> {
        if self.stores.courses.get_by_id(course_id).await?.is_none() {
            return Err(NotFound::CourseId(course_id).into());
        }
        let enrollments = self.stores.enrollments.list_by_course(course_id).await?;
        self.projector.project_all(&enrollments).await
    }

    pub async fn by_status(&self, raw: &str) -> Result<Vec<EnrollmentRecord>, EnrollmentError> {
        let status = raw.parse::<EnrollmentStatus>().map_err(|_| {
            EnrollmentError::Validation(format!(
                "Invalid status: {raw}. Valid statuses: {}",
                EnrollmentStatus::valid_names()
            ))
        })?;
        let enrollments = self.stores.enrollments.list_by_status(status).await?;
        self.projector.project_all(&enrollments).await
    }
}
