//! Storage layer for the record types
//!
//! A single SQLite connection backs three tables:
//! - departments(id, name, location)
//! - employees(id, name, job_title, department_id)
//! - reviews(id, year, summary, employee_id)
//!
//! The connection runs in autocommit mode, so every statement issued
//! through `SqliteStore` is committed as soon as it returns.

pub mod row;
pub mod schema;
pub mod sqlite;

pub use row::RawRow;
pub use sqlite::{DbStats, SqliteStore};
