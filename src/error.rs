use std::fmt;
use thiserror::Error;

use crate::domain::{CourseId, EnrollmentId, StudentId};
use crate::store::StoreError;

/// Something a caller named could not be resolved.
///
/// Directory misses carry every known candidate so an administrator can
/// see what was meant. That listing exposes the whole roster; use
/// [`EnrollmentError::redacted`] before rendering for anyone else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFound {
    Student { name: String, candidates: Vec<String> },
    Course { title: String, candidates: Vec<String> },
    StudentId(StudentId),
    CourseId(CourseId),
    Enrollment(EnrollmentId),
}

impl NotFound {
    fn without_candidates(self) -> Self {
        match self {
            NotFound::Student { name, .. } => NotFound::Student {
                name,
                candidates: Vec::new(),
            },
            NotFound::Course { title, .. } => NotFound::Course {
                title,
                candidates: Vec::new(),
            },
            other => other,
        }
    }
}

impl fmt::Display for NotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFound::Student { name, candidates } => {
                write!(f, "Student '{name}' not found")?;
                if !candidates.is_empty() {
                    write!(f, ". Available students: [{}]", candidates.join(", "))?;
                }
                Ok(())
            }
            NotFound::Course { title, candidates } => {
                write!(f, "Course '{title}' not found")?;
                if !candidates.is_empty() {
                    write!(f, ". Available courses: [{}]", candidates.join(", "))?;
                }
                Ok(())
            }
            NotFound::StudentId(id) => write!(f, "Student not found with id: {id}"),
            NotFound::CourseId(id) => write!(f, "Course not found with id: {id}"),
            NotFound::Enrollment(id) => write!(f, "Enrollment not found with id: {id}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EnrollmentError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid status: {raw}. Valid statuses: PENDING, APPROVED, REJECTED")]
    InvalidStatus { raw: String },

    #[error("{0}")]
    NotFound(NotFound),

    #[error("{0}")]
    Conflict(String),

    #[error("Data integrity violation: {0}")]
    Integrity(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

/// Coarse classification used to pick a response or exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::Internal => 1,
            ErrorKind::Validation => 2,
            ErrorKind::NotFound => 3,
            ErrorKind::Conflict => 4,
        }
    }
}

impl EnrollmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnrollmentError::Validation(_) | EnrollmentError::InvalidStatus { .. } => {
                ErrorKind::Validation
            }
            EnrollmentError::NotFound(_) => ErrorKind::NotFound,
            EnrollmentError::Conflict(_) => ErrorKind::Conflict,
            EnrollmentError::Integrity(_) | EnrollmentError::Store(_) => ErrorKind::Internal,
        }
    }

    /// Drop directory candidate listings, for public-facing rendering.
    pub fn redacted(self) -> Self {
        match self {
            EnrollmentError::NotFound(nf) => EnrollmentError::NotFound(nf.without_candidates()),
            other => other,
        }
    }
}

impl From<NotFound> for EnrollmentError {
    fn from(value: NotFound) -> Self {
        EnrollmentError::NotFound(value)
    }
}
