//! # SIS Registry
//!
//! The resource service: one async method per student operation, each taking
//! already-extracted input and returning either a result or a classified
//! [`RegistryError`]. It holds no state of its own beyond the injected store.

use crate::error::RegistryError;
use core_types::{Student, StudentFilter, StudentPayload, UpdateMode};
use database::StudentStore;
use std::sync::Arc;
use uuid::Uuid;

pub mod error;

/// CRUD and query operations over student records.
#[derive(Clone)]
pub struct StudentService {
    store: Arc<dyn StudentStore>,
}

impl StudentService {
    /// Builds the service around an already-opened store.
    pub fn new(store: Arc<dyn StudentStore>) -> Self {
        Self { store }
    }

    /// Validates and inserts a new record.
    pub async fn create(&self, payload: StudentPayload) -> Result<Student, RegistryError> {
        let new_student = payload.into_new_student()?;
        let created = self.store.insert(new_student).await?;
        tracing::info!(id = %created.id, student_id = %created.student_id, "Student created.");
        Ok(created)
    }

    /// All records, in the store's default order.
    pub async fn list_all(&self) -> Result<Vec<Student>, RegistryError> {
        Ok(self.store.list_all().await?)
    }

    pub async fn get_by_student_id(&self, student_id: &str) -> Result<Student, RegistryError> {
        self.store
            .find_by_student_id(student_id)
            .await?
            .ok_or_else(|| business_key_not_found(student_id))
    }

    pub async fn get_by_course(&self, course: &str) -> Result<Vec<Student>, RegistryError> {
        self.matching(StudentFilter::Course(course.to_string())).await
    }

    /// `level` is the raw path segment; a non-integer is treated like a malformed id.
    /// An integer no record could hold simply matches nothing.
    pub async fn get_by_year_level(&self, level: &str) -> Result<Vec<Student>, RegistryError> {
        let level = level
            .trim()
            .parse::<i64>()
            .map_err(|_| RegistryError::MalformedIdentifier(level.to_string()))?;
        match i32::try_from(level) {
            Ok(level) => self.matching(StudentFilter::YearLevel(level)).await,
            Err(_) => Ok(Vec::new()),
        }
    }

    pub async fn get_by_section(&self, section: &str) -> Result<Vec<Student>, RegistryError> {
        self.matching(StudentFilter::Section(section.to_string())).await
    }

    /// Case-insensitive substring search over first name, last name and email.
    pub async fn search(&self, query: Option<&str>) -> Result<Vec<Student>, RegistryError> {
        let query = query
            .filter(|q| !q.is_empty())
            .ok_or_else(|| RegistryError::Validation {
                message: "Search query (q) is required.".to_string(),
            })?;
        self.matching(StudentFilter::Text(query.to_string())).await
    }

    /// Applies `payload` to the record with system id `id`.
    ///
    /// Input is validated before the record is looked up, so an invalid body
    /// against a missing record reports the validation failure.
    pub async fn update_by_id(
        &self,
        id: &str,
        payload: StudentPayload,
        mode: UpdateMode,
    ) -> Result<Student, RegistryError> {
        let id = parse_system_id(id)?;
        let changes = payload.into_update(mode)?;
        let updated = self
            .store
            .update(id, &changes)
            .await?
            .ok_or_else(system_id_not_found)?;
        tracing::info!(%id, ?mode, "Student updated.");
        Ok(updated)
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<Student, RegistryError> {
        let id = parse_system_id(id)?;
        let deleted = self
            .store
            .delete_by_id(id)
            .await?
            .ok_or_else(system_id_not_found)?;
        tracing::info!(%id, student_id = %deleted.student_id, "Student deleted.");
        Ok(deleted)
    }

    pub async fn delete_by_student_id(&self, student_id: &str) -> Result<Student, RegistryError> {
        let deleted = self
            .store
            .delete_by_student_id(student_id)
            .await?
            .ok_or_else(|| business_key_not_found(student_id))?;
        tracing::info!(id = %deleted.id, %student_id, "Student deleted.");
        Ok(deleted)
    }

    async fn matching(&self, filter: StudentFilter) -> Result<Vec<Student>, RegistryError> {
        let students = self.store.find_matching(&filter).await?;
        tracing::debug!(?filter, count = students.len(), "Filter evaluated.");
        Ok(students)
    }
}

fn parse_system_id(id: &str) -> Result<Uuid, RegistryError> {
    Uuid::parse_str(id).map_err(|_| RegistryError::MalformedIdentifier(id.to_string()))
}

fn business_key_not_found(student_id: &str) -> RegistryError {
    RegistryError::NotFound(format!("Student with ID {student_id} not found."))
}

fn system_id_not_found() -> RegistryError {
    RegistryError::NotFound("Student not found.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::MemoryRepository;
    use serde_json::json;

    fn service() -> StudentService {
        StudentService::new(Arc::new(MemoryRepository::new()))
    }

    fn payload(value: serde_json::Value) -> StudentPayload {
        serde_json::from_value(value).unwrap()
    }

    fn student(student_id: &str, first: &str, last: &str, email: &str) -> StudentPayload {
        payload(json!({
            "studentId": student_id,
            "firstName": first,
            "lastName": last,
            "email": email,
            "course": "CS",
            "yearLevel": 2,
            "section": "A"
        }))
    }

    #[tokio::test]
    async fn created_record_is_found_by_business_key_until_deleted() {
        let service = service();
        let created = service
            .create(student("S100", "Ana", "Cruz", "ana@x.com"))
            .await
            .unwrap();

        let found = service.get_by_student_id("S100").await.unwrap();
        assert_eq!(found, created);

        let deleted = service.delete_by_student_id("S100").await.unwrap();
        assert_eq!(deleted.id, created.id);

        let err = service.get_by_student_id("S100").await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(ref m) if m == "Student with ID S100 not found."));
    }

    #[tokio::test]
    async fn duplicate_email_differing_only_in_case_conflicts() {
        let service = service();
        service
            .create(student("S100", "Ana", "Cruz", "ana@x.com"))
            .await
            .unwrap();

        let err = service
            .create(student("S101", "Ann", "Cruz", "ANA@X.COM"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Conflict { ref fields } if fields == &["email"]));
    }

    #[tokio::test]
    async fn invalid_payload_is_a_validation_failure() {
        let err = service()
            .create(payload(json!({ "studentId": "S1", "yearLevel": 9 })))
            .await
            .unwrap_err();
        match err {
            RegistryError::Validation { message } => {
                assert!(message.starts_with("Validation failed: "));
                assert!(message.contains("firstName"));
                assert!(message.contains("yearLevel"));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_requires_a_query() {
        let service = service();
        service
            .create(student("S1", "John", "Smith", "john@x.com"))
            .await
            .unwrap();
        service
            .create(student("S2", "Ana", "Cruz", "asmithson@x.com"))
            .await
            .unwrap();
        service
            .create(student("S3", "Ben", "Lee", "ben@x.com"))
            .await
            .unwrap();

        let lower = service.search(Some("smith")).await.unwrap();
        let upper = service.search(Some("SMITH")).await.unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.len(), 2);

        for query in [None, Some("")] {
            let err = service.search(query).await.unwrap_err();
            assert!(matches!(err, RegistryError::Validation { .. }));
        }
    }

    #[tokio::test]
    async fn filters_return_empty_sequences_instead_of_failing() {
        let service = service();
        service
            .create(student("S1", "Ana", "Cruz", "ana@x.com"))
            .await
            .unwrap();

        assert_eq!(service.get_by_course("CS").await.unwrap().len(), 1);
        assert!(service.get_by_course("Nursing").await.unwrap().is_empty());
        assert!(service.get_by_year_level("4").await.unwrap().is_empty());
        assert!(service.get_by_year_level("99999999999").await.unwrap().is_empty());
        assert!(service.get_by_section("Z").await.unwrap().is_empty());

        let err = service.get_by_year_level("second").await.unwrap_err();
        assert!(matches!(err, RegistryError::MalformedIdentifier(_)));
    }

    #[tokio::test]
    async fn update_is_idempotent_apart_from_updated_at() {
        let service = service();
        let created = service
            .create(student("S1", "Ana", "Cruz", "ana@x.com"))
            .await
            .unwrap();
        let id = created.id.to_string();
        let changes = json!({ "section": "B", "yearLevel": 3 });

        let first = service
            .update_by_id(&id, payload(changes.clone()), UpdateMode::Merge)
            .await
            .unwrap();
        let second = service
            .update_by_id(&id, payload(changes), UpdateMode::Merge)
            .await
            .unwrap();

        assert_eq!(first.section, "B");
        assert_eq!(first.year_level, 3);
        assert_eq!(
            Student {
                updated_at: second.updated_at,
                ..first.clone()
            },
            second
        );
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(second.created_at, created.created_at);
    }

    #[tokio::test]
    async fn replace_update_needs_a_full_record() {
        let service = service();
        let created = service
            .create(student("S1", "Ana", "Cruz", "ana@x.com"))
            .await
            .unwrap();

        let err = service
            .update_by_id(
                &created.id.to_string(),
                payload(json!({ "section": "B" })),
                UpdateMode::Replace,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Validation { .. }));

        let replaced = service
            .update_by_id(
                &created.id.to_string(),
                student("S9", "Anna", "Cruz", "anna@x.com"),
                UpdateMode::Replace,
            )
            .await
            .unwrap();
        assert_eq!(replaced.student_id, "S9");
        assert_eq!(replaced.id, created.id);
    }

    #[tokio::test]
    async fn system_id_failures_are_classified() {
        let service = service();

        let err = service.delete_by_id("not-a-uuid").await.unwrap_err();
        assert!(matches!(err, RegistryError::MalformedIdentifier(_)));

        let missing = Uuid::new_v4().to_string();
        let err = service.delete_by_id(&missing).await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(ref m) if m == "Student not found."));

        let err = service
            .update_by_id(&missing, payload(json!({ "section": "B" })), UpdateMode::Merge)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }
}
