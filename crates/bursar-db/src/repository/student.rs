//! # Student Repository
//!
//! CRUD and lookup for students.
//!
//! ## Identity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two students are the same student when all of these match:            │
//! │                                                                         │
//! │    name, class, father, mother, village, email   (ignoring case)       │
//! │    contact_info                                   (exactly)             │
//! │                                                                         │
//! │  insert / update                                                        │
//! │       │                                                                 │
//! │       ├── pre-check SELECT ──► found? ──► UniqueViolation (409)        │
//! │       │                                                                 │
//! │       └── INSERT ──► idx_students_identity ──► UniqueViolation (409)   │
//! │                      (catches the race the pre-check can't)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use bursar_core::{NewStudent, Student};

const STUDENT_COLUMNS: &str = r#"
    student_id, name, class_description, father_name, mother_name,
    village, contact_info, email, created_at
"#;

/// Optional filters for listing students.
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    /// Class label, matched trimmed and ignoring case.
    pub class_description: Option<String>,
}

/// Repository for student database operations.
#[derive(Debug, Clone)]
pub struct StudentRepository {
    pool: SqlitePool,
}

impl StudentRepository {
    /// Creates a new StudentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StudentRepository { pool }
    }

    /// Lists students, optionally restricted to one class.
    pub async fn list(&self, filter: &StudentFilter) -> DbResult<Vec<Student>> {
        let class = filter
            .class_description
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        debug!(class = ?class, "Listing students");

        let sql = format!(
            r#"
            SELECT {STUDENT_COLUMNS}
            FROM students
            WHERE ?1 IS NULL OR lower(trim(class_description)) = lower(?1)
            ORDER BY student_id
            "#
        );

        let students = sqlx::query_as::<_, Student>(&sql)
            .bind(class)
            .fetch_all(&self.pool)
            .await?;

        Ok(students)
    }

    /// Gets a student by id.
    pub async fn get_by_id(&self, student_id: i64) -> DbResult<Option<Student>> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE student_id = ?1");

        let student = sqlx::query_as::<_, Student>(&sql)
            .bind(student_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(student)
    }

    /// Finds a student by name and class, trimmed and ignoring case.
    ///
    /// If several students share a name within a class, the earliest
    /// enrolled one is returned.
    pub async fn find_by_name_and_class(
        &self,
        name: &str,
        class_description: &str,
    ) -> DbResult<Option<Student>> {
        let sql = format!(
            r#"
            SELECT {STUDENT_COLUMNS}
            FROM students
            WHERE lower(trim(name)) = lower(trim(?1))
              AND lower(trim(class_description)) = lower(trim(?2))
            ORDER BY student_id
            LIMIT 1
            "#
        );

        let student = sqlx::query_as::<_, Student>(&sql)
            .bind(name)
            .bind(class_description)
            .fetch_optional(&self.pool)
            .await?;

        Ok(student)
    }

    /// Returns the id of an existing student with the same identity, if any.
    ///
    /// `exclude` skips one row (the student being updated).
    pub async fn find_identical(
        &self,
        student: &NewStudent,
        exclude: Option<i64>,
    ) -> DbResult<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT student_id
            FROM students
            WHERE lower(name) = lower(?1)
              AND lower(class_description) = lower(?2)
              AND lower(father_name) = lower(?3)
              AND lower(mother_name) = lower(?4)
              AND lower(village) = lower(?5)
              AND contact_info = ?6
              AND lower(email) = lower(?7)
              AND (?8 IS NULL OR student_id <> ?8)
            LIMIT 1
            "#,
        )
        .bind(&student.name)
        .bind(&student.class_description)
        .bind(&student.father_name)
        .bind(&student.mother_name)
        .bind(&student.village)
        .bind(&student.contact_info)
        .bind(&student.email)
        .bind(exclude)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }

    /// Inserts a student and returns the new id.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - an identical student already exists
    pub async fn insert(&self, student: &NewStudent) -> DbResult<i64> {
        if self.find_identical(student, None).await?.is_some() {
            debug!(name = %student.name, "Duplicate student rejected by pre-check");
            return Err(DbError::duplicate("student", student.name.clone()));
        }

        let student_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO students (
                name, class_description, father_name, mother_name,
                village, contact_info, email
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING student_id
            "#,
        )
        .bind(&student.name)
        .bind(&student.class_description)
        .bind(&student.father_name)
        .bind(&student.mother_name)
        .bind(&student.village)
        .bind(&student.contact_info)
        .bind(&student.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| identity_conflict(e, &student.name))?;

        info!(student_id, name = %student.name, "Student added");
        Ok(student_id)
    }

    /// Replaces every field of a student.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no student with this id
    /// * `DbError::UniqueViolation` - the new values match another student
    pub async fn update(&self, student_id: i64, student: &NewStudent) -> DbResult<()> {
        if self.find_identical(student, Some(student_id)).await?.is_some() {
            return Err(DbError::duplicate("student", student.name.clone()));
        }

        let result = sqlx::query(
            r#"
            UPDATE students
            SET name = ?1, class_description = ?2, father_name = ?3,
                mother_name = ?4, village = ?5, contact_info = ?6, email = ?7
            WHERE student_id = ?8
            "#,
        )
        .bind(&student.name)
        .bind(&student.class_description)
        .bind(&student.father_name)
        .bind(&student.mother_name)
        .bind(&student.village)
        .bind(&student.contact_info)
        .bind(&student.email)
        .bind(student_id)
        .execute(&self.pool)
        .await
        .map_err(|e| identity_conflict(e, &student.name))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Student", student_id));
        }

        info!(student_id, "Student updated");
        Ok(())
    }

    /// Deletes a student.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - no student with this id
    /// * `DbError::ForeignKeyViolation` - payments still reference the student
    pub async fn delete(&self, student_id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM students WHERE student_id = ?1")
            .bind(student_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Student", student_id));
        }

        info!(student_id, "Student deleted");
        Ok(())
    }
}

fn identity_conflict(err: sqlx::Error, name: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { .. } => DbError::duplicate("student", name),
        other => other,
    }
}
