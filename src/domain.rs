//! Core records of the enrollment desk: students, courses and the
//! enrollments linking them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

record_id!(
    /// Store-assigned student identifier
    StudentId
);
record_id!(
    /// Store-assigned course identifier
    CourseId
);
record_id!(
    /// Store-assigned enrollment identifier, immutable once issued
    EnrollmentId
);

/// Natural lookup key for a student: trimmed, case preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FullName {
    pub first: String,
    pub last: String,
}

impl FullName {
    pub fn new(first: &str, last: &str) -> Self {
        Self {
            first: first.trim().to_string(),
            last: last.trim().to_string(),
        }
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first, self.last)
    }
}

/// Natural lookup key for a course title.
pub fn title_key(title: &str) -> String {
    title.trim().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Student {
    pub fn full_name(&self) -> FullName {
        FullName::new(&self.first_name, &self.last_name)
    }
}

/// Student fields supplied at registration, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl NewStudent {
    pub fn into_student(self, id: StudentId) -> Student {
        Student {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Vec<u8>>,
}

impl Course {
    /// Sniff the stored image format from its leading bytes.
    pub fn image_kind(&self) -> Option<ImageKind> {
        self.image.as_deref().map(ImageKind::detect)
    }
}

/// Media type of a course image, as served to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Other,
}

impl ImageKind {
    pub fn detect(bytes: &[u8]) -> Self {
        match bytes {
            [0xFF, 0xD8, ..] => ImageKind::Jpeg,
            [0x89, 0x50, ..] => ImageKind::Png,
            _ => ImageKind::Other,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Other => "application/octet-stream",
        }
    }
}

/// Replacement values for an existing course. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub image: Option<Vec<u8>>,
}

impl NewCourse {
    pub fn into_course(self, id: CourseId) -> Course {
        Course {
            id,
            title: self.title,
            description: self.description,
            image: self.image,
        }
    }
}

/// Workflow status of an enrollment request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Rejected,
}

impl EnrollmentStatus {
    pub const ALL: [EnrollmentStatus; 3] = [
        EnrollmentStatus::Pending,
        EnrollmentStatus::Approved,
        EnrollmentStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "PENDING",
            EnrollmentStatus::Approved => "APPROVED",
            EnrollmentStatus::Rejected => "REJECTED",
        }
    }

    /// Comma separated list of every status name, for error messages.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown enrollment status '{0}'")]
pub struct ParseStatusError(pub String);

impl FromStr for EnrollmentStatus {
    type Err = ParseStatusError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseStatusError(raw.to_string()))
    }
}

/// A request linking one student to one course.
///
/// Status and creation time are private: the only way to build a fresh
/// enrollment is [`Enrollment::from_new`], which always starts `Pending`,
/// and only the state machine moves the status afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub student_id: StudentId,
    pub course_id: CourseId,
    status: EnrollmentStatus,
    enrolled_at: DateTime<Utc>,
}

impl Enrollment {
    pub fn from_new(id: EnrollmentId, new: NewEnrollment) -> Self {
        Self {
            id,
            student_id: new.student_id,
            course_id: new.course_id,
            status: EnrollmentStatus::Pending,
            enrolled_at: new.enrolled_at,
        }
    }

    /// Rebuild a persisted row.
    #[cfg_attr(not(feature = "database"), allow(dead_code))]
    pub(crate) fn restore(
        id: EnrollmentId,
        student_id: StudentId,
        course_id: CourseId,
        status: EnrollmentStatus,
        enrolled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            student_id,
            course_id,
            status,
            enrolled_at,
        }
    }

    pub fn status(&self) -> EnrollmentStatus {
        self.status
    }

    pub fn enrolled_at(&self) -> DateTime<Utc> {
        self.enrolled_at
    }

    pub(crate) fn set_status(&mut self, status: EnrollmentStatus) {
        self.status = status;
    }
}

/// Enrollment awaiting an id from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEnrollment {
    pub student_id: StudentId,
    pub course_id: CourseId,
    pub enrolled_at: DateTime<Utc>,
}

impl NewEnrollment {
    pub fn pending(student_id: StudentId, course_id: CourseId, enrolled_at: DateTime<Utc>) -> Self {
        Self {
            student_id,
            course_id,
            enrolled_at,
        }
    }
}
