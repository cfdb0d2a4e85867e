use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::traits::{CourseStore, EnrollmentStore, StudentStore};
use super::StoreError;
use crate::domain::{
    title_key, Course, CourseId, Enrollment, EnrollmentId, EnrollmentStatus, FullName, NewCourse,
    NewEnrollment, NewStudent, Student, StudentId,
};

const SNAPSHOT_VERSION: u32 = 1;

/// Lock-protected in-memory backend implementing every store trait.
///
/// Natural keys (full name, course title, email) and the
/// `(student, course)` pair are kept in hash indices next to the primary
/// maps, so lookups never scan. All writes happen under one write guard,
/// which makes `insert_new` check-and-insert atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    last_student_id: u64,
    last_course_id: u64,
    last_enrollment_id: u64,
    students: BTreeMap<StudentId, Student>,
    courses: BTreeMap<CourseId, Course>,
    enrollments: BTreeMap<EnrollmentId, Enrollment>,
    student_by_name: HashMap<FullName, StudentId>,
    student_by_email: HashMap<String, StudentId>,
    course_by_title: HashMap<String, CourseId>,
    enrollment_by_pair: HashMap<(StudentId, CourseId), EnrollmentId>,
}

/// On-disk form of a [`MemoryStore`]. Indices are rebuilt on load.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    last_student_id: u64,
    last_course_id: u64,
    last_enrollment_id: u64,
    students: Vec<Student>,
    courses: Vec<Course>,
    enrollments: Vec<Enrollment>,
}

impl MemoryState {
    fn index_student(&mut self, student: &Student) {
        // first registration keeps the name slot
        self.student_by_name
            .entry(student.full_name())
            .or_insert(student.id);
        self.student_by_email
            .insert(student.email.to_lowercase(), student.id);
    }

    fn index_course(&mut self, course: &Course) {
        self.course_by_title
            .entry(title_key(&course.title))
            .or_insert(course.id);
    }

    /// Point `key` at the lowest-id course carrying that title, if any.
    fn reindex_title(&mut self, key: &str) {
        let holder = self
            .courses
            .values()
            .find(|c| title_key(&c.title) == key)
            .map(|c| c.id);
        match holder {
            Some(id) => {
                self.course_by_title.insert(key.to_string(), id);
            }
            None => {
                self.course_by_title.remove(key);
            }
        }
    }

    fn from_snapshot(snapshot: Snapshot) -> Result<Self, StoreError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(StoreError::CorruptSnapshot {
                reason: format!(
                    "unsupported snapshot version {} (expected {})",
                    snapshot.version, SNAPSHOT_VERSION
                ),
            });
        }

        let mut state = MemoryState {
            last_student_id: snapshot.last_student_id,
            last_course_id: snapshot.last_course_id,
            last_enrollment_id: snapshot.last_enrollment_id,
            ..MemoryState::default()
        };

        for student in snapshot.students {
            state.index_student(&student);
            state.students.insert(student.id, student);
        }
        for course in snapshot.courses {
            state.index_course(&course);
            state.courses.insert(course.id, course);
        }
        for enrollment in snapshot.enrollments {
            let pair = (enrollment.student_id, enrollment.course_id);
            if state.enrollment_by_pair.insert(pair, enrollment.id).is_some() {
                return Err(StoreError::CorruptSnapshot {
                    reason: format!(
                        "duplicate enrollment for student {} in course {}",
                        pair.0, pair.1
                    ),
                });
            }
            state.enrollments.insert(enrollment.id, enrollment);
        }

        Ok(state)
    }

    fn to_snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            last_student_id: self.last_student_id,
            last_course_id: self.last_course_id,
            last_enrollment_id: self.last_enrollment_id,
            students: self.students.values().cloned().collect(),
            courses: self.courses.values().cloned().collect(),
            enrollments: self.enrollments.values().cloned().collect(),
        }
    }

    fn enrollments_where(&self, keep: impl Fn(&Enrollment) -> bool) -> Vec<Enrollment> {
        self.enrollments
            .values()
            .filter(|e| keep(e))
            .cloned()
            .collect()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON snapshot. A missing file yields an empty store.
    pub async fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !fs::try_exists(path).await? {
            info!("No snapshot at {}, starting with an empty store", path.display());
            return Ok(Self::new());
        }

        let raw = fs::read_to_string(path).await?;
        let snapshot: Snapshot = serde_json::from_str(&raw)?;
        let state = MemoryState::from_snapshot(snapshot)?;
        info!(
            students = state.students.len(),
            courses = state.courses.len(),
            enrollments = state.enrollments.len(),
            "Loaded snapshot from {}",
            path.display()
        );

        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Write the store to `path`, via a temporary file and rename.
    pub async fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let path = path.as_ref();
        let serialized = {
            let state = self.state.read().await;
            serde_json::to_string_pretty(&state.to_snapshot())?
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let temp_file = path.with_extension("json.tmp");
        fs::write(&temp_file, serialized).await?;
        fs::rename(&temp_file, path).await?;
        debug!("Snapshot written to {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn insert(&self, student: NewStudent) -> Result<Student, StoreError> {
        let mut state = self.state.write().await;
        if state
            .student_by_email
            .contains_key(&student.email.to_lowercase())
        {
            return Err(StoreError::DuplicateEmail(student.email));
        }

        state.last_student_id += 1;
        let student = student.into_student(StudentId(state.last_student_id));
        state.index_student(&student);
        state.students.insert(student.id, student.clone());
        Ok(student)
    }

    async fn get_by_id(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        Ok(self.state.read().await.students.get(&id).cloned())
    }

    async fn find_by_full_name(
        &self,
        first: &str,
        last: &str,
    ) -> Result<Option<Student>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .student_by_name
            .get(&FullName::new(first, last))
            .and_then(|id| state.students.get(id))
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Student>, StoreError> {
        Ok(self.state.read().await.students.values().cloned().collect())
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn insert(&self, course: NewCourse) -> Result<Course, StoreError> {
        let mut state = self.state.write().await;
        state.last_course_id += 1;
        let course = course.into_course(CourseId(state.last_course_id));
        state.index_course(&course);
        state.courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn get_by_id(&self, id: CourseId) -> Result<Option<Course>, StoreError> {
        Ok(self.state.read().await.courses.get(&id).cloned())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Course>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .course_by_title
            .get(&title_key(title))
            .and_then(|id| state.courses.get(id))
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Course>, StoreError> {
        Ok(self.state.read().await.courses.values().cloned().collect())
    }

    async fn update(&self, course: &Course) -> Result<Course, StoreError> {
        let mut state = self.state.write().await;
        let previous = match state.courses.get_mut(&course.id) {
            Some(existing) => std::mem::replace(existing, course.clone()),
            None => return Err(StoreError::UnknownCourse(course.id)),
        };

        let old_key = title_key(&previous.title);
        let new_key = title_key(&course.title);
        if old_key != new_key {
            state.reindex_title(&old_key);
            state.reindex_title(&new_key);
        }
        Ok(course.clone())
    }

    async fn remove(&self, id: CourseId) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if !state.courses.contains_key(&id) {
            return Ok(false);
        }
        if state.enrollments.values().any(|e| e.course_id == id) {
            return Err(StoreError::CourseInUse(id));
        }
        if let Some(removed) = state.courses.remove(&id) {
            state.reindex_title(&title_key(&removed.title));
        }
        Ok(true)
    }
}

#[async_trait]
impl EnrollmentStore for MemoryStore {
    async fn insert_new(&self, enrollment: NewEnrollment) -> Result<Enrollment, StoreError> {
        let mut state = self.state.write().await;
        let pair = (enrollment.student_id, enrollment.course_id);
        if state.enrollment_by_pair.contains_key(&pair) {
            return Err(StoreError::DuplicatePair {
                student_id: pair.0,
                course_id: pair.1,
            });
        }

        state.last_enrollment_id += 1;
        let enrollment = Enrollment::from_new(EnrollmentId(state.last_enrollment_id), enrollment);
        state.enrollment_by_pair.insert(pair, enrollment.id);
        state.enrollments.insert(enrollment.id, enrollment.clone());
        Ok(enrollment)
    }

    async fn save(&self, enrollment: &Enrollment) -> Result<Enrollment, StoreError> {
        let mut state = self.state.write().await;
        match state.enrollments.get_mut(&enrollment.id) {
            Some(existing) => {
                *existing = enrollment.clone();
                Ok(enrollment.clone())
            }
            None => Err(StoreError::UnknownEnrollment(enrollment.id)),
        }
    }

    async fn get_by_id(&self, id: EnrollmentId) -> Result<Option<Enrollment>, StoreError> {
        Ok(self.state.read().await.enrollments.get(&id).cloned())
    }

    async fn exists_for(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<bool, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .enrollment_by_pair
            .contains_key(&(student_id, course_id)))
    }

    async fn list_all(&self) -> Result<Vec<Enrollment>, StoreError> {
        Ok(self.state.read().await.enrollments_where(|_| true))
    }

    async fn list_by_student(&self, student_id: StudentId) -> Result<Vec<Enrollment>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .enrollments_where(|e| e.student_id == student_id))
    }

    async fn list_by_course(&self, course_id: CourseId) -> Result<Vec<Enrollment>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .enrollments_where(|e| e.course_id == course_id))
    }

    async fn list_by_status(
        &self,
        status: EnrollmentStatus,
    ) -> Result<Vec<Enrollment>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .enrollments_where(|e| e.status() == status))
    }

    async fn delete_by_id(&self, id: EnrollmentId) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.enrollments.remove(&id) {
            Some(removed) => {
                state
                    .enrollment_by_pair
                    .remove(&(removed.student_id, removed.course_id));
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
