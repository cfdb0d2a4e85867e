use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::info;

use crate::domain::{Course, CourseChanges, CourseId, NewCourse, NewStudent, Student};
use crate::enrollment::require;
use crate::error::{EnrollmentError, NotFound};
use crate::store::{CourseStore, StoreError, StudentStore};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

/// Student registration and course catalogue maintenance.
#[derive(Clone)]
pub struct Registry {
    students: Arc<dyn StudentStore>,
    courses: Arc<dyn CourseStore>,
}

impl Registry {
    pub fn new(students: Arc<dyn StudentStore>, courses: Arc<dyn CourseStore>) -> Self {
        Self { students, courses }
    }

    pub async fn register_student(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<Student, EnrollmentError> {
        let first_name = require(first_name, "First name is required")?;
        let last_name = require(last_name, "Last name is required")?;
        let email = require(email, "Email is required")?;
        if !EMAIL_PATTERN.is_match(email) {
            return Err(EnrollmentError::Validation("Invalid email format".to_string()));
        }

        let student = self
            .students
            .insert(NewStudent {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: email.to_string(),
            })
            .await
            .map_err(|e| match e {
                StoreError::DuplicateEmail(email) => EnrollmentError::Conflict(format!(
                    "A student with email '{email}' is already registered"
                )),
                other => other.into(),
            })?;

        info!(student.id = %student.id, "Student registered");
        Ok(student)
    }

    pub async fn add_course(
        &self,
        title: &str,
        description: &str,
        image: Option<Vec<u8>>,
    ) -> Result<Course, EnrollmentError> {
        let title = require(title, "Course title is required")?;
        let description = require(description, "Course description is required")?;

        let course = self
            .courses
            .insert(NewCourse {
                title: title.to_string(),
                description: description.to_string(),
                image: image.filter(|bytes| !bytes.is_empty()),
            })
            .await?;

        info!(course.id = %course.id, title = %course.title, "Course added");
        Ok(course)
    }

    pub async fn get_course(&self, id: CourseId) -> Result<Course, EnrollmentError> {
        self.courses
            .get_by_id(id)
            .await?
            .ok_or_else(|| NotFound::CourseId(id).into())
    }

    /// Apply `changes` to a stored course. Replacement text is trimmed and
    /// must not be blank; an empty image clears the stored one.
    pub async fn update_course(
        &self,
        id: CourseId,
        changes: CourseChanges,
    ) -> Result<Course, EnrollmentError> {
        let mut course = self.get_course(id).await?;
        if let Some(title) = changes.title.as_deref() {
            course.title = require(title, "Course title is required")?.to_string();
        }
        if let Some(description) = changes.description.as_deref() {
            course.description =
                require(description, "Course description is required")?.to_string();
        }
        if let Some(image) = changes.image {
            course.image = Some(image).filter(|bytes| !bytes.is_empty());
        }

        let course = self.courses.update(&course).await.map_err(|e| match e {
            StoreError::UnknownCourse(missing) => NotFound::CourseId(missing).into(),
            other => EnrollmentError::from(other),
        })?;

        info!(course.id = %course.id, title = %course.title, "Course updated");
        Ok(course)
    }

    /// Remove a course. Refused while any enrollment still references it.
    pub async fn delete_course(&self, id: CourseId) -> Result<(), EnrollmentError> {
        let removed = self.courses.remove(id).await.map_err(|e| match e {
            StoreError::CourseInUse(id) => EnrollmentError::Conflict(format!(
                "Course {id} still has enrollments; delete them first"
            )),
            other => other.into(),
        })?;
        if !removed {
            return Err(NotFound::CourseId(id).into());
        }
        info!(course.id = %id, "Course deleted");
        Ok(())
    }

    pub async fn list_students(&self) -> Result<Vec<Student>, EnrollmentError> {
        Ok(self.students.list_all().await?)
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>, EnrollmentError> {
        Ok(self.courses.list_all().await?)
    }
}
