//! # Perfreview - Employee performance reviews on SQLite
//!
//! A thin object-relational mapping layer for three record types:
//! - `Department`: a named unit with a location
//! - `Employee`: belongs to a department
//! - `Review`: a yearly performance summary for an employee
//!
//! Each record type has a repository that maps it to one table, validates
//! fields before anything reaches storage, and keeps an identity cache of
//! the instances it has saved or loaded. Every operation is one SQL
//! statement, committed immediately.

pub mod cache;
pub mod config;
pub mod department;
pub mod employee;
pub mod review;
pub mod seed;
pub mod storage;
pub mod ui;

// Re-exports for convenient access
pub use cache::IdentityCache;
pub use department::{Department, DepartmentLookup, DepartmentRepository};
pub use employee::{Employee, EmployeeLookup, EmployeeRepository};
pub use review::{Review, ReviewRepository};
pub use storage::SqliteStore;

/// Result type alias for Perfreview operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Perfreview operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A field failed its constraint; raised before any SQL is issued.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The operation needs a persisted instance (one with an id).
    #[error("State error: {0}")]
    State(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_state(&self) -> bool {
        matches!(self, Error::State(_))
    }

    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}
