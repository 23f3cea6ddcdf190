use crate::DbError;
use crate::store::StudentStore;
use async_trait::async_trait;
use core_types::{NewStudent, Student, StudentChanges, StudentFilter};
use sqlx::postgres::PgPool;
use uuid::Uuid;

/// The `DbRepository` provides the PostgreSQL-backed implementation of
/// [`StudentStore`]. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translates a failed INSERT/UPDATE into a `DbError`, naming the field behind
/// any unique-constraint violation.
fn map_write_error(err: sqlx::Error) -> DbError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some("students_student_id_key") => "studentId",
                Some("students_email_key") => "email",
                _ => "id",
            };
            return DbError::Duplicate {
                fields: vec![field.to_string()],
            };
        }
    }
    err.into()
}

#[async_trait]
impl StudentStore for DbRepository {
    async fn insert(&self, student: NewStudent) -> Result<Student, DbError> {
        let created = sqlx::query_as::<_, Student>(
            r#"
            INSERT INTO students (
                id, student_id, first_name, last_name, email, course, year_level, section,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
            RETURNING id, student_id, first_name, last_name, email, course, year_level, section,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&student.student_id)
        .bind(&student.first_name)
        .bind(&student.last_name)
        .bind(&student.email)
        .bind(&student.course)
        .bind(student.year_level)
        .bind(&student.section)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(created)
    }

    async fn list_all(&self) -> Result<Vec<Student>, DbError> {
        let students = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, student_id, first_name, last_name, email, course, year_level, section,
                   created_at, updated_at
            FROM students
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(students)
    }

    async fn find_by_student_id(&self, student_id: &str) -> Result<Option<Student>, DbError> {
        let student = sqlx::query_as::<_, Student>(
            r#"
            SELECT id, student_id, first_name, last_name, email, course, year_level, section,
                   created_at, updated_at
            FROM students
            WHERE student_id = $1
            "#,
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    async fn find_matching(&self, filter: &StudentFilter) -> Result<Vec<Student>, DbError> {
        let students = match filter {
            StudentFilter::Course(course) => {
                sqlx::query_as::<_, Student>(
                    r#"
                    SELECT id, student_id, first_name, last_name, email, course, year_level, section,
                           created_at, updated_at
                    FROM students
                    WHERE course = $1
                    ORDER BY created_at ASC, id ASC
                    "#,
                )
                .bind(course)
                .fetch_all(&self.pool)
                .await?
            }
            StudentFilter::YearLevel(level) => {
                sqlx::query_as::<_, Student>(
                    r#"
                    SELECT id, student_id, first_name, last_name, email, course, year_level, section,
                           created_at, updated_at
                    FROM students
                    WHERE year_level = $1
                    ORDER BY created_at ASC, id ASC
                    "#,
                )
                .bind(*level)
                .fetch_all(&self.pool)
                .await?
            }
            StudentFilter::Section(section) => {
                sqlx::query_as::<_, Student>(
                    r#"
                    SELECT id, student_id, first_name, last_name, email, course, year_level, section,
                           created_at, updated_at
                    FROM students
                    WHERE section = $1
                    ORDER BY created_at ASC, id ASC
                    "#,
                )
                .bind(section)
                .fetch_all(&self.pool)
                .await?
            }
            StudentFilter::Text(query) => {
                // strpos keeps the match literal; LIKE would treat % and _ as wildcards.
                sqlx::query_as::<_, Student>(
                    r#"
                    SELECT id, student_id, first_name, last_name, email, course, year_level, section,
                           created_at, updated_at
                    FROM students
                    WHERE strpos(lower(first_name), lower($1)) > 0
                       OR strpos(lower(last_name), lower($1)) > 0
                       OR strpos(lower(email), lower($1)) > 0
                    ORDER BY created_at ASC, id ASC
                    "#,
                )
                .bind(query)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(students)
    }

    async fn update(&self, id: Uuid, changes: &StudentChanges) -> Result<Option<Student>, DbError> {
        let updated = sqlx::query_as::<_, Student>(
            r#"
            UPDATE students SET
                student_id = COALESCE($2, student_id),
                first_name = COALESCE($3, first_name),
                last_name  = COALESCE($4, last_name),
                email      = COALESCE($5, email),
                course     = COALESCE($6, course),
                year_level = COALESCE($7, year_level),
                section    = COALESCE($8, section),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, student_id, first_name, last_name, email, course, year_level, section,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(changes.student_id.as_deref())
        .bind(changes.first_name.as_deref())
        .bind(changes.last_name.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.course.as_deref())
        .bind(changes.year_level)
        .bind(changes.section.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(updated)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Student>, DbError> {
        let deleted = sqlx::query_as::<_, Student>(
            r#"
            DELETE FROM students
            WHERE id = $1
            RETURNING id, student_id, first_name, last_name, email, course, year_level, section,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(deleted)
    }

    async fn delete_by_student_id(&self, student_id: &str) -> Result<Option<Student>, DbError> {
        let deleted = sqlx::query_as::<_, Student>(
            r#"
            DELETE FROM students
            WHERE student_id = $1
            RETURNING id, student_id, first_name, last_name, email, course, year_level, section,
                      created_at, updated_at
            "#,
        )
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(deleted)
    }
}
