//! Database schema definitions

/// SQL to create the departments table
pub const CREATE_DEPARTMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS departments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    location TEXT NOT NULL
)
"#;

/// SQL to create the employees table
pub const CREATE_EMPLOYEES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    job_title TEXT NOT NULL,
    department_id INTEGER NOT NULL,
    FOREIGN KEY (department_id) REFERENCES departments(id)
)
"#;

/// SQL to create the reviews table
pub const CREATE_REVIEWS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS reviews (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    year INT NOT NULL,
    summary TEXT NOT NULL,
    employee_id INTEGER NOT NULL,
    FOREIGN KEY (employee_id) REFERENCES employees(id)
)
"#;

pub const DROP_DEPARTMENTS_TABLE: &str = "DROP TABLE IF EXISTS departments";
pub const DROP_EMPLOYEES_TABLE: &str = "DROP TABLE IF EXISTS employees";
pub const DROP_REVIEWS_TABLE: &str = "DROP TABLE IF EXISTS reviews";

/// All table creation statements, parents before children
pub fn all_create_statements() -> Vec<&'static str> {
    vec![
        CREATE_DEPARTMENTS_TABLE,
        CREATE_EMPLOYEES_TABLE,
        CREATE_REVIEWS_TABLE,
    ]
}

/// All drop statements, children before parents
pub fn all_drop_statements() -> Vec<&'static str> {
    vec![
        DROP_REVIEWS_TABLE,
        DROP_EMPLOYEES_TABLE,
        DROP_DEPARTMENTS_TABLE,
    ]
}
