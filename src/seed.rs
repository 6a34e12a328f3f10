//! Sample data for a fresh database
//!
//! Drops and recreates every table, then inserts two departments, a handful
//! of employees and their reviews.

use tracing::info;
use crate::department::DepartmentRepository;
use crate::employee::EmployeeRepository;
use crate::review::ReviewRepository;
use crate::storage::{DbStats, SqliteStore};
use crate::Result;

const DEPARTMENTS: &[(&str, &str)] = &[
    ("Payroll", "Building A, 5th Floor"),
    ("Human Resources", "Building C, East Wing"),
];

/// (name, job title, index into DEPARTMENTS)
const EMPLOYEES: &[(&str, &str, usize)] = &[
    ("Amir", "Accountant", 0),
    ("Bola", "Manager", 0),
    ("Charlie", "Manager", 1),
    ("Dani", "Benefits Coordinator", 1),
    ("Hao", "New Hires Coordinator", 1),
];

/// (year, summary, index into EMPLOYEES)
const REVIEWS: &[(i64, &str, usize)] = &[
    (2023, "Efficient in processing payroll", 0),
    (2024, "Keeps the close on schedule", 0),
    (2023, "Strong communication skills", 1),
    (2022, "Good leadership during the reorg", 2),
    (2024, "Benefits enrollment ran smoothly", 3),
    (2023, "Onboarding feedback is excellent", 4),
];

/// Reset the schema and insert the sample rows.
pub fn run(store: &SqliteStore) -> Result<DbStats> {
    store.drop_all_tables()?;
    store.create_all_tables()?;

    let mut departments = DepartmentRepository::new(store);
    let mut department_ids = Vec::with_capacity(DEPARTMENTS.len());
    for (name, location) in DEPARTMENTS {
        let department = departments.create(name, location)?;
        department_ids.extend(department.id());
    }

    let mut employees = EmployeeRepository::new(store);
    let mut employee_ids = Vec::with_capacity(EMPLOYEES.len());
    for (name, job_title, department) in EMPLOYEES {
        let employee = employees.create(name, job_title, department_ids[*department])?;
        employee_ids.extend(employee.id());
    }

    let mut reviews = ReviewRepository::new(store);
    for (year, summary, employee) in REVIEWS {
        reviews.create(*year, summary, employee_ids[*employee])?;
    }

    let stats = store.stats()?;
    info!(
        departments = stats.departments,
        employees = stats.employees,
        reviews = stats.reviews,
        "Seeded database"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_counts() {
        let store = SqliteStore::open_in_memory().unwrap();
        let stats = run(&store).unwrap();
        assert_eq!(stats.departments, DEPARTMENTS.len());
        assert_eq!(stats.employees, EMPLOYEES.len());
        assert_eq!(stats.reviews, REVIEWS.len());
    }

    #[test]
    fn test_seed_is_repeatable() {
        let store = SqliteStore::open_in_memory().unwrap();
        run(&store).unwrap();
        let stats = run(&store).unwrap();
        assert_eq!(stats.reviews, REVIEWS.len());

        let mut employees = EmployeeRepository::new(&store);
        let amir = employees.find_by_name("Amir").unwrap().unwrap();
        let mut reviews = ReviewRepository::new(&store);
        assert_eq!(reviews.for_employee(&amir).unwrap().len(), 2);
    }
}
