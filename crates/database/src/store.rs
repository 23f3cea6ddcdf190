use crate::DbError;
use async_trait::async_trait;
use core_types::{NewStudent, Student, StudentChanges, StudentFilter};
use uuid::Uuid;

/// The abstract interface to wherever student records live.
///
/// The resource service only ever talks to this trait, so the PostgreSQL
/// repository and the in-memory store are interchangeable. Implementations
/// must enforce uniqueness of `student_id` and `email` and report violations
/// as [`DbError::Duplicate`].
///
/// `Duplicate::fields` is not guaranteed to be exhaustive. PostgreSQL stops at
/// the first violated constraint, so [`DbRepository`](crate::DbRepository)
/// names a single field even when both keys collide, while
/// [`MemoryRepository`](crate::MemoryRepository) names every one.
#[async_trait]
pub trait StudentStore: Send + Sync {
    /// Inserts a validated record, assigning its identifier and timestamps.
    async fn insert(&self, student: NewStudent) -> Result<Student, DbError>;

    /// Returns every record in creation order.
    async fn list_all(&self) -> Result<Vec<Student>, DbError>;

    /// Looks a record up by its business key.
    async fn find_by_student_id(&self, student_id: &str) -> Result<Option<Student>, DbError>;

    /// Returns every record satisfying `filter`, in creation order.
    async fn find_matching(&self, filter: &StudentFilter) -> Result<Vec<Student>, DbError>;

    /// Writes the present fields of `changes` and refreshes `updated_at`.
    /// Returns `None` if no record has this id.
    async fn update(&self, id: Uuid, changes: &StudentChanges) -> Result<Option<Student>, DbError>;

    /// Removes a record by system id, returning it.
    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Student>, DbError>;

    /// Removes a record by business key, returning it.
    async fn delete_by_student_id(&self, student_id: &str) -> Result<Option<Student>, DbError>;
}
