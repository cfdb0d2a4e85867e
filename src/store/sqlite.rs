use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::info;

use super::traits::{CourseStore, EnrollmentStore, StudentStore};
use super::StoreError;
use crate::domain::{
    title_key, Course, CourseId, Enrollment, EnrollmentId, EnrollmentStatus, FullName, NewCourse,
    NewEnrollment, NewStudent, Student, StudentId,
};

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Backend(format!("migration failed: {err}"))
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

/// SQLite-backed store.
///
/// Pair uniqueness is a `UNIQUE(student_id, course_id)` table constraint;
/// a violation surfaces as [`StoreError::DuplicatePair`]. Natural keys are
/// stored trimmed, so lookups compare raw columns and stay on their indices.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `database_url`.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        auto_migrate: bool,
    ) -> Result<Self, StoreError> {
        info!("Opening database at {}", database_url);
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        if auto_migrate {
            info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Database migrations completed");
        }

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close database connections gracefully
    pub async fn shutdown(&self) {
        info!("Shutting down database connections...");
        self.pool.close().await;
        info!("Database connections closed");
    }
}

fn id_of(row: &SqliteRow, column: &str) -> Result<u64, StoreError> {
    let raw: i64 = row.try_get(column)?;
    u64::try_from(raw).map_err(|_| StoreError::Backend(format!("negative {column}: {raw}")))
}

fn student_from_row(row: &SqliteRow) -> Result<Student, StoreError> {
    Ok(Student {
        id: StudentId(id_of(row, "id")?),
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        email: row.try_get("email")?,
    })
}

fn course_from_row(row: &SqliteRow) -> Result<Course, StoreError> {
    Ok(Course {
        id: CourseId(id_of(row, "id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        image: row.try_get("image")?,
    })
}

fn enrollment_from_row(row: &SqliteRow) -> Result<Enrollment, StoreError> {
    let status: String = row.try_get("status")?;
    let status = status
        .parse::<EnrollmentStatus>()
        .map_err(|e| StoreError::Backend(e.to_string()))?;
    let date: String = row.try_get("enrollment_date")?;
    let enrolled_at = DateTime::parse_from_rfc3339(&date)
        .map_err(|e| StoreError::Backend(format!("bad enrollment_date '{date}': {e}")))?
        .with_timezone(&Utc);

    Ok(Enrollment::restore(
        EnrollmentId(id_of(row, "id")?),
        StudentId(id_of(row, "student_id")?),
        CourseId(id_of(row, "course_id")?),
        status,
        enrolled_at,
    ))
}

fn collect<T>(
    rows: Vec<SqliteRow>,
    map: impl Fn(&SqliteRow) -> Result<T, StoreError>,
) -> Result<Vec<T>, StoreError> {
    rows.iter().map(map).collect()
}

const ENROLLMENT_COLUMNS: &str = "id, student_id, course_id, status, enrollment_date";

#[async_trait]
impl StudentStore for SqliteStore {
    async fn insert(&self, student: NewStudent) -> Result<Student, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO students (first_name, last_name, email)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.email)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(student.into_student(StudentId(done.last_insert_rowid() as u64))),
            Err(e) if is_unique_violation(&e) => Err(StoreError::DuplicateEmail(student.email)),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_by_id(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        sqlx::query("SELECT id, first_name, last_name, email FROM students WHERE id = ?1")
            .bind(id.0 as i64)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(student_from_row)
            .transpose()
    }

    async fn find_by_full_name(
        &self,
        first: &str,
        last: &str,
    ) -> Result<Option<Student>, StoreError> {
        let key = FullName::new(first, last);
        sqlx::query(
            r#"
            SELECT id, first_name, last_name, email
            FROM students
            WHERE first_name = ?1 AND last_name = ?2
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(&key.first)
        .bind(&key.last)
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(student_from_row)
        .transpose()
    }

    async fn list_all(&self) -> Result<Vec<Student>, StoreError> {
        let rows = sqlx::query("SELECT id, first_name, last_name, email FROM students ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        collect(rows, student_from_row)
    }
}

#[async_trait]
impl CourseStore for SqliteStore {
    async fn insert(&self, course: NewCourse) -> Result<Course, StoreError> {
        let done = sqlx::query(
            r#"
            INSERT INTO courses (title, description, image)
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.image.as_deref())
        .execute(&self.pool)
        .await?;

        Ok(course.into_course(CourseId(done.last_insert_rowid() as u64)))
    }

    async fn get_by_id(&self, id: CourseId) -> Result<Option<Course>, StoreError> {
        sqlx::query("SELECT id, title, description, image FROM courses WHERE id = ?1")
            .bind(id.0 as i64)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(course_from_row)
            .transpose()
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Course>, StoreError> {
        sqlx::query(
            r#"
            SELECT id, title, description, image
            FROM courses
            WHERE title = ?1
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(title_key(title))
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(course_from_row)
        .transpose()
    }

    async fn list_all(&self) -> Result<Vec<Course>, StoreError> {
        let rows = sqlx::query("SELECT id, title, description, image FROM courses ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        collect(rows, course_from_row)
    }

    async fn update(&self, course: &Course) -> Result<Course, StoreError> {
        let done = sqlx::query(
            r#"
            UPDATE courses
            SET title = ?1, description = ?2, image = ?3
            WHERE id = ?4
            "#,
        )
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.image.as_deref())
        .bind(course.id.0 as i64)
        .execute(&self.pool)
        .await?;

        if done.rows_affected() == 0 {
            return Err(StoreError::UnknownCourse(course.id));
        }
        Ok(course.clone())
    }

    async fn remove(&self, id: CourseId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?1")
            .bind(id.0 as i64)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            Err(e) if is_foreign_key_violation(&e) => Err(StoreError::CourseInUse(id)),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl EnrollmentStore for SqliteStore {
    async fn insert_new(&self, enrollment: NewEnrollment) -> Result<Enrollment, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO enrollments (student_id, course_id, status, enrollment_date)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(enrollment.student_id.0 as i64)
        .bind(enrollment.course_id.0 as i64)
        .bind(EnrollmentStatus::Pending.as_str())
        .bind(enrollment.enrolled_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(Enrollment::from_new(
                EnrollmentId(done.last_insert_rowid() as u64),
                enrollment,
            )),
            Err(e) if is_unique_violation(&e) => Err(StoreError::DuplicatePair {
                student_id: enrollment.student_id,
                course_id: enrollment.course_id,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, enrollment: &Enrollment) -> Result<Enrollment, StoreError> {
        let done = sqlx::query("UPDATE enrollments SET status = ?1 WHERE id = ?2")
            .bind(enrollment.status().as_str())
            .bind(enrollment.id.0 as i64)
            .execute(&self.pool)
            .await?;

        if done.rows_affected() == 0 {
            return Err(StoreError::UnknownEnrollment(enrollment.id));
        }
        Ok(enrollment.clone())
    }

    async fn get_by_id(&self, id: EnrollmentId) -> Result<Option<Enrollment>, StoreError> {
        sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = ?1"
        ))
        .bind(id.0 as i64)
        .fetch_optional(&self.pool)
        .await?
        .as_ref()
        .map(enrollment_from_row)
        .transpose()
    }

    async fn exists_for(
        &self,
        student_id: StudentId,
        course_id: CourseId,
    ) -> Result<bool, StoreError> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE student_id = ?1 AND course_id = ?2) AS present",
        )
        .bind(student_id.0 as i64)
        .bind(course_id.0 as i64)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get::<i64, _>("present")? != 0)
    }

    async fn list_all(&self) -> Result<Vec<Enrollment>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?;
        collect(rows, enrollment_from_row)
    }

    async fn list_by_student(&self, student_id: StudentId) -> Result<Vec<Enrollment>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE student_id = ?1 ORDER BY id"
        ))
        .bind(student_id.0 as i64)
        .fetch_all(&self.pool)
        .await?;
        collect(rows, enrollment_from_row)
    }

    async fn list_by_course(&self, course_id: CourseId) -> Result<Vec<Enrollment>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE course_id = ?1 ORDER BY id"
        ))
        .bind(course_id.0 as i64)
        .fetch_all(&self.pool)
        .await?;
        collect(rows, enrollment_from_row)
    }

    async fn list_by_status(
        &self,
        status: EnrollmentStatus,
    ) -> Result<Vec<Enrollment>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE status = ?1 ORDER BY id"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        collect(rows, enrollment_from_row)
    }

    async fn delete_by_id(&self, id: EnrollmentId) -> Result<bool, StoreError> {
        let done = sqlx::query("DELETE FROM enrollments WHERE id = ?1")
            .bind(id.0 as i64)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_db() -> SqliteStore {
        // one connection: every sqlite::memory: connection is its own database
        SqliteStore::connect("sqlite::memory:", 1, true).await.unwrap()
    }

    fn new_course(title: &str) -> NewCourse {
        NewCourse {
            title: title.into(),
            description: format!("All about {title}"),
            image: None,
        }
    }

    async fn query_plan(db: &SqliteStore, sql: &str, params: &[&str]) -> String {
        let sql = format!("EXPLAIN QUERY PLAN {sql}");
        let mut query = sqlx::query(&sql);
        for param in params {
            query = query.bind(*param);
        }
        let rows = query.fetch_all(db.pool()).await.unwrap();
        rows.iter()
            .map(|r| r.try_get::<String, _>("detail").unwrap())
            .collect::<Vec<_>>()
            .join("; ")
    }

    #[tokio::test]
    async fn natural_key_lookups_use_their_indices() {
        let db = memory_db().await;

        let plan = query_plan(
            &db,
            "SELECT id FROM students WHERE first_name = ?1 AND last_name = ?2 ORDER BY id ASC LIMIT 1",
            &["Alice", "Smith"],
        )
        .await;
        assert!(plan.contains("idx_students_full_name"), "plan was: {plan}");

        let plan = query_plan(
            &db,
            "SELECT id FROM courses WHERE title = ?1 ORDER BY id ASC LIMIT 1",
            &["Intro to Go"],
        )
        .await;
        assert!(plan.contains("idx_courses_title"), "plan was: {plan}");
    }

    #[tokio::test]
    async fn course_update_changes_title_lookup() {
        let db = memory_db().await;
        let mut course = CourseStore::insert(&db, new_course("Rust 101")).await.unwrap();

        course.title = "Advanced Rust".into();
        course.image = Some(vec![0x89, 0x50, 0x4E, 0x47]);
        db.update(&course).await.unwrap();

        assert_eq!(db.find_by_title("Rust 101").await.unwrap(), None);
        assert_eq!(db.find_by_title("Advanced Rust").await.unwrap(), Some(course));

        let ghost = new_course("Ghost").into_course(CourseId(999));
        assert!(matches!(
            db.update(&ghost).await.unwrap_err(),
            StoreError::UnknownCourse(CourseId(999))
        ));
    }

    #[tokio::test]
    async fn foreign_key_blocks_removing_a_referenced_course() {
        let db = memory_db().await;
        let s = StudentStore::insert(
            &db,
            NewStudent {
                first_name: "Carol".into(),
                last_name: "White".into(),
                email: "carol@example.com".into(),
            },
        )
        .await
        .unwrap();
        let c = CourseStore::insert(&db, new_course("Databases")).await.unwrap();
        let e = db
            .insert_new(NewEnrollment::pending(s.id, c.id, Utc::now()))
            .await
            .unwrap();

        assert!(matches!(
            db.remove(c.id).await.unwrap_err(),
            StoreError::CourseInUse(id) if id == c.id
        ));

        assert!(db.delete_by_id(e.id).await.unwrap());
        assert!(db.remove(c.id).await.unwrap());
        assert!(!db.remove(c.id).await.unwrap());
    }

    #[tokio::test]
    async fn unique_constraint_reports_duplicate_pair() {
        let db = memory_db().await;
        let alice = StudentStore::insert(
            &db,
            NewStudent {
                first_name: "Alice".into(),
                last_name: "Smith".into(),
                email: "alice@example.com".into(),
            },
        )
        .await
        .unwrap();
        let go = CourseStore::insert(
            &db,
            NewCourse {
                title: "Intro to Go".into(),
                description: "Goroutines and friends".into(),
                image: None,
            },
        )
        .await
        .unwrap();

        let pending = NewEnrollment::pending(alice.id, go.id, Utc::now());
        let created = db.insert_new(pending.clone()).await.unwrap();
        assert_eq!(created.status(), EnrollmentStatus::Pending);

        let err = db.insert_new(pending).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicatePair { .. }));
        assert_eq!(EnrollmentStore::list_all(&db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn status_round_trips_through_save() {
        let db = memory_db().await;
        let s = StudentStore::insert(
            &db,
            NewStudent {
                first_name: "Bob".into(),
                last_name: "Jones".into(),
                email: "bob@example.com".into(),
            },
        )
        .await
        .unwrap();
        let c = CourseStore::insert(
            &db,
            NewCourse {
                title: "Rust 101".into(),
                description: "Ownership".into(),
                image: Some(vec![1, 2, 3]),
            },
        )
        .await
        .unwrap();

        let mut e = db
            .insert_new(NewEnrollment::pending(s.id, c.id, Utc::now()))
            .await
            .unwrap();
        e.set_status(EnrollmentStatus::Rejected);
        db.save(&e).await.unwrap();

        let rejected = db.list_by_status(EnrollmentStatus::Rejected).await.unwrap();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].id, e.id);
        assert_eq!(
            CourseStore::get_by_id(&db, c.id).await.unwrap().unwrap().image,
            Some(vec![1, 2, 3])
        );
        assert_eq!(db.find_by_full_name("Bob", "Jones").await.unwrap(), Some(s));
    }
}
