//! # Core Types
//!
//! The vocabulary shared by every other crate in the workspace: the `Student`
//! record, the payloads used to create or change one, the query shapes the
//! record store understands, and the field-level validation rules.
//!
//! This crate has no knowledge of HTTP or of any particular storage engine.

pub mod enums;
pub mod error;
pub mod filter;
pub mod student;

// Re-export the core types to provide a clean public API.
pub use enums::UpdateMode;
pub use error::{FieldViolation, ValidationErrors};
pub use filter::StudentFilter;
pub use student::{
    MAX_YEAR_LEVEL, MIN_YEAR_LEVEL, NewStudent, Student, StudentChanges, StudentPayload,
};
