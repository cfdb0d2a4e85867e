//! Store contracts the enrollment engine calls into.
//!
//! Each trait is object safe and `Send + Sync` so services can hold
//! `Arc<dyn ...>` handles. Under `cfg(test)` or the `testing` feature
//! `mockall` generates `Mock*` doubles for each one.

use async_trait::async_trait;

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

use super::StoreError;
use crate::domain::{
    Course, CourseId, Enrollment, EnrollmentId, EnrollmentStatus, NewCourse, NewEnrollment,
    NewStudent, Student, StudentId,
};

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Persist a new student and assign its id.
    ///
    /// Fails with [`StoreError::DuplicateEmail`] if the email is taken.
    async fn insert(&self, student: NewStudent) -> Result<Student, StoreError>;

    async fn get_by_id(&self, id: StudentId) -> Result<Option<Student>, StoreError>;

    /// Exact match on the trimmed first and last name.
    async fn find_by_full_name(&self, first: &str, last: &str)
        -> Result<Option<Student>, StoreError>;

    /// Every student, ordered by id
    async fn list_all(&self) -> Result<Vec<Student>, StoreError>;
}

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn insert(&self, course: NewCourse) -> Result<Course, StoreError>;

    async fn get_by_id(&self, id: CourseId) -> Result<Option<Course>, StoreError>;

    /// Exact match on the trimmed title. When titles collide the course
    /// registered first wins.
    async fn find_by_title(&self, title: &str) -> Result<Option<Course>, StoreError>;

    async fn list_all(&self) -> Result<Vec<Course>, StoreError>;

    /// Overwrite an existing course by id, re-keying its title.
    ///
    /// Fails with [`StoreError::UnknownCourse`] if the id is not stored.
    async fn update(&self, course: &Course) -> Result<Course, StoreError>;

    /// Returns whether a record was removed. A course that enrollments still
    /// reference is kept and reported as [`StoreError::CourseInUse`].
    async fn remove(&self, id: CourseId) -> Result<bool, StoreError>;
}

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// Insert a fresh `Pending` enrollment.
    ///
    /// Check and insert are a single atomic step: if any enrollment already
    /// exists for the pair this fails with [`StoreError::DuplicatePair`]
    /// and nothing is written.
    async fn insert_new(&self, enrollment: NewEnrollment) -> Result<Enrollment, StoreError>;

    /// Overwrite an existing enrollment by id.
    async fn save(&self, enrollment: &Enrollment) -> Result<Enrollment, StoreError>;

    async fn get_by_id(&self, id: EnrollmentId) -> Result<Option<Enrollment>, StoreError>;

    async fn exists_for(&self, student_id: StudentId, course_id: CourseId)
        -> Result<bool, StoreError>;

    async fn list_all(&self) -> Result<Vec<Enrollment>, StoreError>;

    async fn list_by_student(&self, student_id: StudentId) -> Result<Vec<Enrollment>, StoreError>;

    async fn list_by_course(&self, course_id: CourseId) -> Result<Vec<Enrollment>, StoreError>;

    async fn list_by_status(&self, status: EnrollmentStatus)
        -> Result<Vec<Enrollment>, StoreError>;

    /// Returns whether a record was removed.
    async fn delete_by_id(&self, id: EnrollmentId) -> Result<bool, StoreError>;
}
