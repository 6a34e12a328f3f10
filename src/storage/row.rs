//! Raw rows as read from storage
//!
//! SQLite columns are dynamically typed: an `INT` column happily holds
//! text. Rows are therefore fetched as untyped values and converted field
//! by field, so a value of the wrong type surfaces as a validation error
//! for that field instead of a driver conversion failure.

use crate::{Error, Result};
use rusqlite::types::Value;

/// One row, columns in `SELECT` order
pub type RawRow = Vec<Value>;

/// Read an integer column.
pub fn integer(row: &RawRow, index: usize, field: &str) -> Result<i64> {
    match row.get(index) {
        Some(Value::Integer(value)) => Ok(*value),
        _ => Err(Error::Validation(format!("{} must be an integer", field))),
    }
}

/// Read a text column.
pub fn text(row: &RawRow, index: usize, field: &str) -> Result<String> {
    match row.get(index) {
        Some(Value::Text(value)) => Ok(value.clone()),
        _ => Err(Error::Validation(format!("{} must be text", field))),
    }
}

/// Read the primary key, which every table stores in column 0.
pub fn primary_key(row: &RawRow) -> Result<i64> {
    integer(row, 0, "id")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_column() {
        let row: RawRow = vec![Value::Integer(7), Value::Text("2021".into())];
        assert_eq!(integer(&row, 0, "id").unwrap(), 7);
        assert!(integer(&row, 1, "year").unwrap_err().is_validation());
        assert!(integer(&row, 5, "missing").unwrap_err().is_validation());
    }

    #[test]
    fn test_text_column() {
        let row: RawRow = vec![Value::Text("ok".into()), Value::Null];
        assert_eq!(text(&row, 0, "summary").unwrap(), "ok");
        let err = text(&row, 1, "summary").unwrap_err();
        assert_eq!(err.to_string(), "Validation error: summary must be text");
    }
}
