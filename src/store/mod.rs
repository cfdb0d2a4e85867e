// Storage boundary for students, courses and enrollments.
// The enrollment pair-uniqueness invariant is enforced here, not by callers.

pub mod memory;
#[cfg(feature = "database")]
pub mod sqlite;
pub mod traits;

use std::sync::Arc;
use thiserror::Error;

use crate::domain::{CourseId, EnrollmentId, StudentId};

pub use memory::MemoryStore;
#[cfg(feature = "database")]
pub use sqlite::SqliteStore;
pub use traits::{CourseStore, EnrollmentStore, StudentStore};

#[cfg(any(test, feature = "testing"))]
pub use traits::{MockCourseStore, MockEnrollmentStore, MockStudentStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("enrollment already exists for student {student_id} in course {course_id}")]
    DuplicatePair {
        student_id: StudentId,
        course_id: CourseId,
    },

    #[error("a student with email '{0}' is already registered")]
    DuplicateEmail(String),

    #[error("enrollment {0} does not exist")]
    UnknownEnrollment(EnrollmentId),

    #[error("course {0} does not exist")]
    UnknownCourse(CourseId),

    #[error("course {0} is still referenced by enrollments")]
    CourseInUse(CourseId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot corrupted: {reason}")]
    CorruptSnapshot { reason: String },

    #[error("Database error: {0}")]
    Backend(String),
}

/// Handles to the three stores the enrollment engine works against.
#[derive(Clone)]
pub struct Stores {
    pub students: Arc<dyn StudentStore>,
    pub courses: Arc<dyn CourseStore>,
    pub enrollments: Arc<dyn EnrollmentStore>,
}

impl Stores {
    /// Use one backend for all three record kinds.
    pub fn shared<T>(backend: Arc<T>) -> Self
    where
        T: StudentStore + CourseStore + EnrollmentStore + 'static,
    {
        Self {
            students: backend.clone(),
            courses: backend.clone(),
            enrollments: backend,
        }
    }
}
