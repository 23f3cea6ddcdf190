//! # SIS Database Crate
//!
//! This crate is the system's record store: the single place that knows how
//! student records are persisted and queried.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** Encapsulates all storage-specific logic behind the
//!   [`StudentStore`] trait. The rest of the application never sees SQL.
//! - **Interchangeable backends:** [`DbRepository`] talks to PostgreSQL through
//!   `sqlx`; [`MemoryRepository`] keeps records in process for tests and demos.
//! - **Asynchronous & Pooled:** All operations are asynchronous, and PostgreSQL
//!   access goes through a shared connection pool (`PgPool`).
//!
//! ## Public API
//!
//! - `open_store`: Builds the backend named in the settings, ready to use.
//! - `connect` / `run_migrations`: Lower-level PostgreSQL bootstrapping.
//! - `StudentStore`: The trait every backend implements.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod repository;
pub mod store;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, open_store, run_migrations};
pub use error::DbError;
pub use memory::MemoryRepository;
pub use repository::DbRepository;
pub use store::StudentStore;
