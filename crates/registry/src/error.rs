use core_types::ValidationErrors;
use database::DbError;
use thiserror::Error;

/// Every way a resource operation can fail.
///
/// Failures are classified here, where they happen; the HTTP layer only maps
/// each variant to a status code.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Malformed, missing or out-of-range input.
    #[error("{message}")]
    Validation { message: String },

    /// A unique field is already taken by another record.
    #[error("Duplicate value for {}. This must be unique.", .fields.join(", "))]
    Conflict { fields: Vec<String> },

    /// No record matches the identifier.
    #[error("{0}")]
    NotFound(String),

    /// A system identifier (or numeric path value) could not be parsed.
    #[error("Resource not found or invalid ID format.")]
    MalformedIdentifier(String),

    /// Anything the store could not do for reasons unrelated to the request.
    #[error("Internal store error: {0}")]
    Internal(#[source] DbError),
}

impl From<ValidationErrors> for RegistryError {
    fn from(errors: ValidationErrors) -> Self {
        RegistryError::Validation {
            message: format!("Validation failed: {errors}"),
        }
    }
}

impl From<DbError> for RegistryError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate { fields } => RegistryError::Conflict { fields },
            other => RegistryError::Internal(other),
        }
    }
}
