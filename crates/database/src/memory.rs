use crate::DbError;
use crate::store::StudentStore;
use async_trait::async_trait;
use chrono::Utc;
use core_types::{NewStudent, Student, StudentChanges, StudentFilter};
use tokio::sync::RwLock;
use uuid::Uuid;

/// A process-local [`StudentStore`].
///
/// Records are kept in insertion order. Every write checks uniqueness and
/// mutates under a single write lock, so concurrent writers cannot both
/// claim the same `student_id` or `email`.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    records: RwLock<Vec<Student>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Names the unique fields of a prospective write that another record already holds.
fn conflicting_fields(
    records: &[Student],
    student_id: Option<&str>,
    email: Option<&str>,
    except: Option<Uuid>,
) -> Vec<String> {
    let others = move || records.iter().filter(move |s| Some(s.id) != except);
    let mut fields = Vec::new();
    if let Some(student_id) = student_id {
        if others().any(|s| s.student_id == student_id) {
            fields.push("studentId".to_string());
        }
    }
    if let Some(email) = email {
        if others().any(|s| s.email.eq_ignore_ascii_case(email)) {
            fields.push("email".to_string());
        }
    }
    fields
}

#[async_trait]
impl StudentStore for MemoryRepository {
    async fn insert(&self, student: NewStudent) -> Result<Student, DbError> {
        let mut records = self.records.write().await;
        let fields = conflicting_fields(
            &records,
            Some(&student.student_id),
            Some(&student.email),
            None,
        );
        if !fields.is_empty() {
            return Err(DbError::Duplicate { fields });
        }

        let created = Student::from_new(student, Utc::now());
        records.push(created.clone());
        Ok(created)
    }

    async fn list_all(&self) -> Result<Vec<Student>, DbError> {
        Ok(self.records.read().await.clone())
    }

    async fn find_by_student_id(&self, student_id: &str) -> Result<Option<Student>, DbError> {
        let records = self.records.read().await;
        Ok(records.iter().find(|s| s.student_id == student_id).cloned())
    }

    async fn find_matching(&self, filter: &StudentFilter) -> Result<Vec<Student>, DbError> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|s| filter.matches(s)).cloned().collect())
    }

    async fn update(&self, id: Uuid, changes: &StudentChanges) -> Result<Option<Student>, DbError> {
        let mut records = self.records.write().await;
        let fields = conflicting_fields(
            &records,
            changes.student_id.as_deref(),
            changes.email.as_deref(),
            Some(id),
        );

        let Some(student) = records.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        if !fields.is_empty() {
            return Err(DbError::Duplicate { fields });
        }

        student.apply(changes, Utc::now());
        Ok(Some(student.clone()))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<Option<Student>, DbError> {
        let mut records = self.records.write().await;
        let position = records.iter().position(|s| s.id == id);
        Ok(position.map(|index| records.remove(index)))
    }

    async fn delete_by_student_id(&self, student_id: &str) -> Result<Option<Student>, DbError> {
        let mut records = self.records.write().await;
        let position = records.iter().position(|s| s.student_id == student_id);
        Ok(position.map(|index| records.remove(index)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_student(student_id: &str, email: &str) -> NewStudent {
        NewStudent {
            student_id: student_id.to_string(),
            first_name: "Ana".to_string(),
            last_name: "Cruz".to_string(),
            email: email.to_string(),
            course: "CS".to_string(),
            year_level: 2,
            section: "A".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_identity_and_timestamps() {
        let store = MemoryRepository::new();
        let created = store.insert(new_student("S100", "ana@x.com")).await.unwrap();

        assert_eq!(created.created_at, created.updated_at);
        let found = store.find_by_student_id("S100").await.unwrap();
        assert_eq!(found, Some(created));
    }

    #[tokio::test]
    async fn duplicate_keys_are_rejected_without_overwriting() {
        let store = MemoryRepository::new();
        store.insert(new_student("S100", "ana@x.com")).await.unwrap();

        let err = store
            .insert(new_student("S101", "ana@x.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Duplicate { ref fields } if fields == &["email"]));

        let err = store
            .insert(new_student("S100", "ana@x.com"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, DbError::Duplicate { ref fields } if fields == &["studentId", "email"])
        );

        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_checks_uniqueness_against_other_records_only() {
        let store = MemoryRepository::new();
        let ana = store.insert(new_student("S100", "ana@x.com")).await.unwrap();
        store.insert(new_student("S101", "ben@x.com")).await.unwrap();

        // Re-writing a record's own keys is not a conflict.
        let same = StudentChanges {
            student_id: Some("S100".to_string()),
            email: Some("ana@x.com".to_string()),
            ..StudentChanges::default()
        };
        assert!(store.update(ana.id, &same).await.unwrap().is_some());

        let taken = StudentChanges {
            email: Some("ben@x.com".to_string()),
            ..StudentChanges::default()
        };
        let err = store.update(ana.id, &taken).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate { .. }));

        assert!(store.update(Uuid::new_v4(), &same).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deletes_return_the_removed_record() {
        let store = MemoryRepository::new();
        let ana = store.insert(new_student("S100", "ana@x.com")).await.unwrap();
        let ben = store.insert(new_student("S101", "ben@x.com")).await.unwrap();

        assert_eq!(store.delete_by_id(ana.id).await.unwrap(), Some(ana.clone()));
        assert_eq!(store.delete_by_id(ana.id).await.unwrap(), None);
        assert_eq!(
            store.delete_by_student_id("S101").await.unwrap().map(|s| s.id),
            Some(ben.id)
        );
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn filters_preserve_insertion_order() {
        let store = MemoryRepository::new();
        store.insert(new_student("S1", "a@x.com")).await.unwrap();
        store.insert(new_student("S2", "b@x.com")).await.unwrap();

        let found = store
            .find_matching(&StudentFilter::Course("CS".to_string()))
            .await
            .unwrap();
        let ids: Vec<&str> = found.iter().map(|s| s.student_id.as_str()).collect();
        assert_eq!(ids, vec!["S1", "S2"]);

        let none = store
            .find_matching(&StudentFilter::YearLevel(5))
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
