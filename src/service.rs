use std::sync::Arc;

use crate::domain::{
    Course, CourseChanges, CourseId, Enrollment, EnrollmentId, Student, StudentId,
};
use crate::enrollment::{
    Directory, EnrollmentQueries, EnrollmentRecord, EnrollmentResolver, EnrollmentStateMachine,
    TransitionOutcome,
};
use crate::error::EnrollmentError;
use crate::registry::Registry;
use crate::store::{MemoryStore, Stores};

/// Single entry point over the enrollment engine and the registry,
/// sharing one set of stores.
#[derive(Clone)]
pub struct EnrollmentDesk {
    directory: Directory,
    resolver: EnrollmentResolver,
    state_machine: EnrollmentStateMachine,
    queries: EnrollmentQueries,
    registry: Registry,
}

impl EnrollmentDesk {
    pub fn new(stores: Stores) -> Self {
        Self {
            directory: Directory::new(stores.students.clone(), stores.courses.clone()),
            resolver: EnrollmentResolver::new(stores.clone()),
            state_machine: EnrollmentStateMachine::new(stores.enrollments.clone()),
            queries: EnrollmentQueries::new(stores.clone()),
            registry: Registry::new(stores.students, stores.courses),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Stores::shared(Arc::new(MemoryStore::new())))
    }

    // Registry

    pub async fn register_student(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<Student, EnrollmentError> {
        self.registry.register_student(first_name, last_name, email).await
    }

    pub async fn add_course(
        &self,
        title: &str,
        description: &str,
        image: Option<Vec<u8>>,
    ) -> Result<Course, EnrollmentError> {
        self.registry.add_course(title, description, image).await
    }

    pub async fn get_course(&self, id: CourseId) -> Result<Course, EnrollmentError> {
        self.registry.get_course(id).await
    }

    pub async fn update_course(
        &self,
        id: CourseId,
        changes: CourseChanges,
    ) -> Result<Course, EnrollmentError> {
        self.registry.update_course(id, changes).await
    }

    pub async fn delete_course(&self, id: CourseId) -> Result<(), EnrollmentError> {
        self.registry.delete_course(id).await
    }

    pub async fn list_students(&self) -> Result<Vec<Student>, EnrollmentError> {
        self.registry.list_students().await
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>, EnrollmentError> {
        self.registry.list_courses().await
    }

    // Directory

    pub async fn find_student(&self, first: &str, last: &str) -> Result<Student, EnrollmentError> {
        self.directory.find_student(first, last).await
    }

    pub async fn find_course(&self, title: &str) -> Result<Course, EnrollmentError> {
        self.directory.find_course(title).await
    }

    // Creation

    pub async fn enroll(
        &self,
        first_name: &str,
        last_name: &str,
        course_title: &str,
    ) -> Result<Enrollment, EnrollmentError> {
        self.resolver.enroll(first_name, last_name, course_title).await
    }

    pub async fn enroll_by_ids(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<Enrollment, EnrollmentError> {
        self.resolver.enroll_by_ids(student_id, course_id).await
    }

    // Workflow

    pub async fn approve(&self, id: EnrollmentId) -> Result<TransitionOutcome, EnrollmentError> {
        self.state_machine.approve(id).await
    }

    pub async fn reject(&self, id: EnrollmentId) -> Result<TransitionOutcome, EnrollmentError> {
        self.state_machine.reject(id).await
    }

    pub async fn reset(&self, id: EnrollmentId) -> Result<TransitionOutcome, EnrollmentError> {
        self.state_machine.reset(id).await
    }

    pub async fn set_status(
        &self,
        id: EnrollmentId,
        raw: &str,
    ) -> Result<TransitionOutcome, EnrollmentError> {
        self.state_machine.set_status(id, raw).await
    }

    pub async fn delete(&self, id: EnrollmentId) -> Result<(), EnrollmentError> {
        self.state_machine.delete(id).await
    }

    // Reads

    pub async fn by_id(&self, id: EnrollmentId) -> Result<EnrollmentRecord, EnrollmentError> {
        self.queries.by_id(id).await
    }

    pub async fn all(&self) -> Result<Vec<EnrollmentRecord>, EnrollmentError> {
        self.queries.all().await
    }

    pub async fn by_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<EnrollmentRecord>, EnrollmentError> {
        self.queries.by_student(student_id).await
    }

    pub async fn by_course(
        &self,
        course_id: CourseId,
    ) -> Result<Vec<EnrollmentRecord>, EnrollmentError> {
        self.queries.by_course(course_id).await
    }

    pub async fn by_status(&self, raw: &str) -> Result<Vec<EnrollmentRecord>, EnrollmentError> {
        self.queries.by_status(raw).await
    }
}
