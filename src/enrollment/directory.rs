use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{Course, FullName, Student};
use crate::error::{EnrollmentError, NotFound};
use crate::store::{CourseStore, StudentStore};

/// Resolves human-supplied names and titles to stored records.
///
/// A miss lists every known candidate (all full names, or all titles) in
/// id order.
#[derive(Clone)]
pub struct Directory {
    students: Arc<dyn StudentStore>,
    courses: Arc<dyn CourseStore>,
}

impl Directory {
    pub fn new(students: Arc<dyn StudentStore>, courses: Arc<dyn CourseStore>) -> Self {
        Self { students, courses }
    }

    pub async fn find_student(&self, first: &str, last: &str) -> Result<Student, EnrollmentError> {
        let name = FullName::new(first, last);
        debug!(student = %name, "Looking up student");

        if let Some(student) = self
            .students
            .find_by_full_name(&name.first, &name.last)
            .await?
        {
            return Ok(student);
        }

        let candidates = self
            .students
            .list_all()
            .await?
            .iter()
            .map(|s| s.full_name().to_string())
            .collect();
        warn!(student = %name, "Student not found");
        Err(NotFound::Student {
            name: name.to_string(),
            candidates,
        }
        .into())
    }

    pub async fn find_course(&self, title: &str) -> Result<Course, EnrollmentError> {
        let title = title.trim();
        debug!(course = title, "Looking up course");

        if let Some(course) = self.courses.find_by_title(title).await? {
            return Ok(course);
        }

        let candidates = self
            .courses
            .list_all()
            .await?
            .into_iter()
            .map(|c| c.title)
            .collect();
        warn!(course = title, "Course not found");
        Err(NotFound::Course {
            title: title.to_string(),
            candidates,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewCourse, NewStudent};
    use crate::store::MemoryStore;

    async fn seeded() -> (Arc<MemoryStore>, Directory) {
        let store = Arc::new(MemoryStore::new());
        for (first, last, email) in [
            ("Alice", "Smith", "alice@example.com"),
            ("Bob", "Jones", "bob@example.com"),
        ] {
            StudentStore::insert(
                store.as_ref(),
                NewStudent {
                    first_name: first.into(),
                    last_name: last.into(),
                    email: email.into(),
                },
            )
            .await
            .unwrap();
        }
        for title in ["Intro to Go", "Rust 101"] {
            CourseStore::insert(
                store.as_ref(),
                NewCourse {
                    title: title.into(),
                    description: "desc".into(),
                    image: None,
                },
            )
            .await
            .unwrap();
        }
        let directory = Directory::new(store.clone(), store.clone());
        (store, directory)
    }

    #[tokio::test]
    async fn course_miss_carries_every_title() {
        let (_store, directory) = seeded().await;
        let err = directory.find_course("Nonexistent Course").await.unwrap_err();
        match err {
            EnrollmentError::NotFound(NotFound::Course { title, candidates }) => {
                assert_eq!(title, "Nonexistent Course");
                assert_eq!(candidates, vec!["Intro to Go", "Rust 101"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn student_lookup_is_case_sensitive() {
        let (_store, directory) = seeded().await;
        assert!(directory.find_student(" Bob", "Jones ").await.is_ok());

        let err = directory.find_student("bob", "jones").await.unwrap_err();
        match err {
            EnrollmentError::NotFound(NotFound::Student { name, candidates }) => {
                assert_eq!(name, "bob jones");
                assert_eq!(candidates, vec!["Alice Smith", "Bob Jones"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
