use std::fmt;
use thiserror::Error;

/// A single broken field rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldViolation {
    #[error("Path `{field}` is required")]
    Required { field: &'static str },

    #[error("Path `{field}` ({value}) is less than minimum allowed value ({min})")]
    BelowMinimum {
        field: &'static str,
        value: i64,
        min: i32,
    },

    #[error("Path `{field}` ({value}) is more than maximum allowed value ({max})")]
    AboveMaximum {
        field: &'static str,
        value: i64,
        max: i32,
    },
}

impl FieldViolation {
    /// The camelCase name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            FieldViolation::Required { field }
            | FieldViolation::BelowMinimum { field, .. }
            | FieldViolation::AboveMaximum { field, .. } => field,
        }
    }
}

/// Every violation found in one payload, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<FieldViolation>);

impl ValidationErrors {
    /// The names of all offending fields, without duplicates.
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = Vec::new();
        for violation in &self.0 {
            if !fields.contains(&violation.field()) {
                fields.push(violation.field());
            }
        }
        fields
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}
