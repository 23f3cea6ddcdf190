use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::enums::UpdateMode;
use crate::error::{FieldViolation, ValidationErrors};

pub const MIN_YEAR_LEVEL: i32 = 1;
pub const MAX_YEAR_LEVEL: i32 = 5;

/// A student record as stored in the `students` table and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    /// System-assigned identifier. Never changes after creation.
    pub id: Uuid,
    /// The business key handed out by the registrar.
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    /// Always stored lowercase.
    pub email: String,
    pub course: String,
    pub year_level: i32,
    pub section: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// Materializes a validated `NewStudent` with a fresh identifier.
    pub fn from_new(new: NewStudent, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id: new.student_id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            course: new.course,
            year_level: new.year_level,
            section: new.section,
            created_at: now,
            updated_at: now,
        }
    }

    /// Writes every present field of `changes` and refreshes `updated_at`.
    pub fn apply(&mut self, changes: &StudentChanges, now: DateTime<Utc>) {
        if let Some(value) = &changes.student_id {
            self.student_id = value.clone();
        }
        if let Some(value) = &changes.first_name {
            self.first_name = value.clone();
        }
        if let Some(value) = &changes.last_name {
            self.last_name = value.clone();
        }
        if let Some(value) = &changes.email {
            self.email = value.clone();
        }
        if let Some(value) = &changes.course {
            self.course = value.clone();
        }
        if let Some(value) = changes.year_level {
            self.year_level = value;
        }
        if let Some(value) = &changes.section {
            self.section = value.clone();
        }
        self.updated_at = now;
    }
}

/// The raw, unvalidated body of a create or update request.
///
/// Every field is optional here so that a missing field is reported as a
/// validation failure instead of a deserialization failure. Unknown fields
/// are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayload {
    pub student_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub course: Option<String>,
    pub year_level: Option<i64>,
    pub section: Option<String>,
}

/// A complete, validated and normalized record ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStudent {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub course: String,
    pub year_level: i32,
    pub section: String,
}

/// A validated set of field changes. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentChanges {
    pub student_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub course: Option<String>,
    pub year_level: Option<i32>,
    pub section: Option<String>,
}

impl From<NewStudent> for StudentChanges {
    fn from(new: NewStudent) -> Self {
        Self {
            student_id: Some(new.student_id),
            first_name: Some(new.first_name),
            last_name: Some(new.last_name),
            email: Some(new.email),
            course: Some(new.course),
            year_level: Some(new.year_level),
            section: Some(new.section),
        }
    }
}

impl StudentPayload {
    /// Validates a payload that must describe a whole record.
    pub fn into_new_student(self) -> Result<NewStudent, ValidationErrors> {
        let mut check = FieldCheck::default();

        let first_name = check.required_text("firstName", self.first_name);
        let last_name = check.required_text("lastName", self.last_name);
        let student_id = check.required_text("studentId", self.student_id);
        let course = check.required_text("course", self.course);
        let year_level = check.required_year_level(self.year_level);
        let section = check.required_text("section", self.section);
        let email = check.required_text("email", self.email).map(|e| e.to_lowercase());

        match (
            check.violations.is_empty(),
            first_name,
            last_name,
            student_id,
            course,
            year_level,
            section,
            email,
        ) {
            (
                true,
                Some(first_name),
                Some(last_name),
                Some(student_id),
                Some(course),
                Some(year_level),
                Some(section),
                Some(email),
            ) => Ok(NewStudent {
                student_id,
                first_name,
                last_name,
                email,
                course,
                year_level,
                section,
            }),
            _ => Err(ValidationErrors(check.violations)),
        }
    }

    /// Validates only the fields that are present.
    pub fn into_changes(self) -> Result<StudentChanges, ValidationErrors> {
        let mut check = FieldCheck::default();

        let changes = StudentChanges {
            first_name: check.present_text("firstName", self.first_name),
            last_name: check.present_text("lastName", self.last_name),
            student_id: check.present_text("studentId", self.student_id),
            course: check.present_text("course", self.course),
            year_level: self.year_level.and_then(|v| check.year_level(v)),
            section: check.present_text("section", self.section),
            email: check
                .present_text("email", self.email)
                .map(|e| e.to_lowercase()),
        };

        if check.violations.is_empty() {
            Ok(changes)
        } else {
            Err(ValidationErrors(check.violations))
        }
    }

    /// Validates according to `mode`: a full record for `Replace`, present fields for `Merge`.
    pub fn into_update(self, mode: UpdateMode) -> Result<StudentChanges, ValidationErrors> {
        if mode.requires_full_record() {
            self.into_new_student().map(StudentChanges::from)
        } else {
            self.into_changes()
        }
    }
}

#[derive(Default)]
struct FieldCheck {
    violations: Vec<FieldViolation>,
}

impl FieldCheck {
    fn required_text(&mut self, field: &'static str, value: Option<String>) -> Option<String> {
        match value.map(|v| v.trim().to_string()) {
            Some(v) if !v.is_empty() => Some(v),
            _ => {
                self.violations.push(FieldViolation::Required { field });
                None
            }
        }
    }

    fn present_text(&mut self, field: &'static str, value: Option<String>) -> Option<String> {
        value.and_then(|v| self.required_text(field, Some(v)))
    }

    fn required_year_level(&mut self, value: Option<i64>) -> Option<i32> {
        match value {
            Some(v) => self.year_level(v),
            None => {
                self.violations.push(FieldViolation::Required { field: "yearLevel" });
                None
            }
        }
    }

    fn year_level(&mut self, value: i64) -> Option<i32> {
        if value < i64::from(MIN_YEAR_LEVEL) {
            self.violations.push(FieldViolation::BelowMinimum {
                field: "yearLevel",
                value,
                min: MIN_YEAR_LEVEL,
            });
            None
        } else if value > i64::from(MAX_YEAR_LEVEL) {
            self.violations.push(FieldViolation::AboveMaximum {
                field: "yearLevel",
                value,
                max: MAX_YEAR_LEVEL,
            });
            None
        } else {
            i32::try_from(value).ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> StudentPayload {
        serde_json::from_value(value).expect("payload should deserialize")
    }

    fn ana() -> serde_json::Value {
        json!({
            "studentId": "S100",
            "firstName": "Ana",
            "lastName": "Cruz",
            "email": "ana@x.com",
            "course": "CS",
            "yearLevel": 2,
            "section": "A"
        })
    }

    #[test]
    fn full_payload_is_trimmed_and_normalized() {
        let new = payload(json!({
            "studentId": "  S100 ",
            "firstName": " Ana",
            "lastName": "Cruz ",
            "email": "  Ana@X.com ",
            "course": "CS",
            "yearLevel": 2,
            "section": "A",
            "nickname": "ignored"
        }))
        .into_new_student()
        .unwrap();

        assert_eq!(new.student_id, "S100");
        assert_eq!(new.first_name, "Ana");
        assert_eq!(new.last_name, "Cruz");
        assert_eq!(new.email, "ana@x.com");
        assert_eq!(new.year_level, 2);
    }

    #[test]
    fn missing_and_blank_fields_are_reported_in_schema_order() {
        let errors = payload(json!({
            "studentId": "S100",
            "firstName": "   ",
            "course": "CS",
            "section": "A",
            "email": "ana@x.com"
        }))
        .into_new_student()
        .unwrap_err();

        assert_eq!(errors.fields(), vec!["firstName", "lastName", "yearLevel"]);
    }

    #[test]
    fn year_level_outside_range_is_rejected() {
        for (level, expected) in [(0, "less than minimum"), (6, "more than maximum")] {
            let mut body = ana();
            body["yearLevel"] = json!(level);
            let errors = payload(body).into_new_student().unwrap_err();
            assert_eq!(errors.fields(), vec!["yearLevel"]);
            assert!(errors.to_string().contains(expected));
        }
    }

    #[test]
    fn merge_validates_only_present_fields() {
        let changes = payload(json!({ "email": "NEW@X.COM", "yearLevel": 5 }))
            .into_update(UpdateMode::Merge)
            .unwrap();

        assert_eq!(changes.email.as_deref(), Some("new@x.com"));
        assert_eq!(changes.year_level, Some(5));
        assert!(changes.first_name.is_none());

        let errors = payload(json!({ "lastName": "" }))
            .into_update(UpdateMode::Merge)
            .unwrap_err();
        assert_eq!(errors.fields(), vec!["lastName"]);
    }

    #[test]
    fn replace_requires_a_complete_record() {
        let errors = payload(json!({ "firstName": "Ana" }))
            .into_update(UpdateMode::Replace)
            .unwrap_err();
        assert!(errors.fields().contains(&"studentId"));

        let changes = payload(ana()).into_update(UpdateMode::Replace).unwrap();
        assert!(changes.section.is_some());
    }

    #[test]
    fn apply_writes_present_fields_and_touches_updated_at() {
        let created = Utc::now();
        let mut student = Student::from_new(payload(ana()).into_new_student().unwrap(), created);
        let later = created + chrono::Duration::seconds(5);

        student.apply(
            &StudentChanges {
                section: Some("B".to_string()),
                ..StudentChanges::default()
            },
            later,
        );

        assert_eq!(student.section, "B");
        assert_eq!(student.first_name, "Ana");
        assert_eq!(student.created_at, created);
        assert_eq!(student.updated_at, later);
    }

    #[test]
    fn student_serializes_with_camel_case_keys() {
        let student = Student::from_new(payload(ana()).into_new_student().unwrap(), Utc::now());
        let value = serde_json::to_value(&student).unwrap();

        assert_eq!(value["studentId"], "S100");
        assert_eq!(value["yearLevel"], 2);
        assert!(value.get("createdAt").is_some());
        assert!(value.get("id").is_some());
    }
}
