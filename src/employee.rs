//! Employees - the subjects of performance reviews

use serde::Serialize;
use tracing::{debug, info, warn};
use crate::cache::IdentityCache;
use crate::department::{Department, DepartmentLookup};
use crate::storage::row::{self, RawRow};
use crate::storage::SqliteStore;
use crate::{Error, Result};

const SELECT_COLUMNS: &str = "SELECT id, name, job_title, department_id FROM employees";

/// An employee, persisted in the `employees` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Employee {
    id: Option<i64>,
    name: String,
    job_title: String,
    department_id: i64,
}

impl Employee {
    /// Build an unsaved employee.
    ///
    /// `department_id` is checked against `departments` once, here; a
    /// department deleted afterwards is not noticed until the row is
    /// materialized again.
    pub fn new(
        name: impl Into<String>,
        job_title: impl Into<String>,
        department_id: i64,
        departments: &dyn DepartmentLookup,
    ) -> Result<Self> {
        let mut employee = Self {
            id: None,
            name: String::new(),
            job_title: String::new(),
            department_id: 0,
        };
        employee.set_name(name)?;
        employee.set_job_title(job_title)?;
        employee.set_department_id(department_id, departments)?;
        Ok(employee)
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn job_title(&self) -> &str {
        &self.job_title
    }

    pub fn department_id(&self) -> i64 {
        self.department_id
    }

    #[cfg(test)]
    pub(crate) fn stub(id: i64) -> Self {
        Self {
            id: Some(id),
            name: "Stub".to_string(),
            job_title: "Stub".to_string(),
            department_id: 1,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::Validation("name must not be empty".to_string()));
        }
        self.name = name;
        Ok(())
    }

    pub fn set_job_title(&mut self, job_title: impl Into<String>) -> Result<()> {
        let job_title = job_title.into();
        if job_title.is_empty() {
            return Err(Error::Validation("job_title must not be empty".to_string()));
        }
        self.job_title = job_title;
        Ok(())
    }

    pub fn set_department_id(
        &mut self,
        department_id: i64,
        departments: &dyn DepartmentLookup,
    ) -> Result<()> {
        if departments.find_department(department_id)?.is_none() {
            return Err(Error::Validation(
                "department_id must reference a department in the database".to_string(),
            ));
        }
        self.department_id = department_id;
        Ok(())
    }
}

impl std::fmt::Display for Employee {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = self.id.map(|id| id.to_string()).unwrap_or_else(|| "None".to_string());
        write!(
            f,
            "<Employee {}: {}, {}, Department ID: {}>",
            id, self.name, self.job_title, self.department_id
        )
    }
}

/// Resolve an employee by primary key.
///
/// Review validation goes through this trait, never through a concrete
/// repository.
pub trait EmployeeLookup {
    fn find_employee(&self, id: i64) -> Result<Option<Employee>>;
}

impl EmployeeLookup for SqliteStore {
    fn find_employee(&self, id: i64) -> Result<Option<Employee>> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        match self.fetch_one(&sql, [id])? {
            Some(row) => Ok(Some(Employee {
                id: Some(row::primary_key(&row)?),
                name: row::text(&row, 1, "name")?,
                job_title: row::text(&row, 2, "job_title")?,
                department_id: row::integer(&row, 3, "department_id")?,
            })),
            None => Ok(None),
        }
    }
}

/// Maps `Employee` to the `employees` table.
pub struct EmployeeRepository<'a> {
    store: &'a SqliteStore,
    departments: &'a dyn DepartmentLookup,
    cache: IdentityCache<Employee>,
}

impl<'a> EmployeeRepository<'a> {
    /// Repository that validates departments against the same store
    pub fn new(store: &'a SqliteStore) -> Self {
        Self::with_lookup(store, store)
    }

    pub fn with_lookup(store: &'a SqliteStore, departments: &'a dyn DepartmentLookup) -> Self {
        Self {
            store,
            departments,
            cache: IdentityCache::new(),
        }
    }

    pub fn departments(&self) -> &'a dyn DepartmentLookup {
        self.departments
    }

    pub fn cache(&self) -> &IdentityCache<Employee> {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    // ========== Schema ==========

    pub fn create_table(&self) -> Result<()> {
        self.store.execute(crate::storage::schema::CREATE_EMPLOYEES_TABLE, [])?;
        info!("Created employees table");
        Ok(())
    }

    pub fn drop_table(&self) -> Result<()> {
        self.store.execute(crate::storage::schema::DROP_EMPLOYEES_TABLE, [])?;
        info!("Dropped employees table");
        Ok(())
    }

    // ========== Persistence ==========

    pub fn save(&mut self, employee: &mut Employee) -> Result<()> {
        let id = self.store.insert(
            "INSERT INTO employees (name, job_title, department_id) VALUES (?1, ?2, ?3)",
            (&employee.name, &employee.job_title, employee.department_id),
        )?;
        employee.id = Some(id);
        self.cache.insert(id, employee.clone());
        debug!(id, "Saved employee");
        Ok(())
    }

    pub fn create(&mut self, name: &str, job_title: &str, department_id: i64) -> Result<Employee> {
        let mut employee = Employee::new(name, job_title, department_id, self.departments)?;
        self.save(&mut employee)?;
        Ok(employee)
    }

    pub fn update(&mut self, employee: &Employee) -> Result<()> {
        let id = employee
            .id
            .ok_or_else(|| Error::State("Cannot update employee without an ID.".to_string()))?;
        let changed = self.store.execute(
            "UPDATE employees SET name = ?1, job_title = ?2, department_id = ?3 WHERE id = ?4",
            (&employee.name, &employee.job_title, employee.department_id, id),
        )?;
        if changed > 0 {
            self.cache.insert(id, employee.clone());
        }
        Ok(())
    }

    pub fn delete(&mut self, employee: &mut Employee) -> Result<()> {
        let id = employee
            .id
            .ok_or_else(|| Error::State("Cannot delete employee without an ID.".to_string()))?;
        self.store.execute("DELETE FROM employees WHERE id = ?1", [id])?;
        self.cache.remove(id);
        employee.id = None;
        Ok(())
    }

    // ========== Queries ==========

    /// Build an employee from a `(id, name, job_title, department_id)` row
    /// and cache it. The department reference is re-validated.
    pub fn instance_from_db(&mut self, row: Option<RawRow>) -> Result<Option<Employee>> {
        let Some(row) = row else {
            return Ok(None);
        };
        let id = row::primary_key(&row)?;
        let built = row::text(&row, 1, "name").and_then(|name| {
            Employee::new(
                name,
                row::text(&row, 2, "job_title")?,
                row::integer(&row, 3, "department_id")?,
                self.departments,
            )
        });
        let mut employee = built.inspect_err(|e| warn!(id, "Employee row failed validation: {}", e))?;
        employee.id = Some(id);
        self.cache.insert(id, employee.clone());
        Ok(Some(employee))
    }

    pub fn find_by_id(&mut self, id: i64) -> Result<Option<Employee>> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let row = self.store.fetch_one(&sql, [id])?;
        self.instance_from_db(row)
    }

    pub fn find_by_name(&mut self, name: &str) -> Result<Option<Employee>> {
        let sql = format!("{} WHERE name = ?1", SELECT_COLUMNS);
        let row = self.store.fetch_one(&sql, [name])?;
        self.instance_from_db(row)
    }

    pub fn find_by_department(&mut self, department_id: i64) -> Result<Vec<Employee>> {
        let sql = format!("{} WHERE department_id = ?1", SELECT_COLUMNS);
        let rows = self.store.fetch_all(&sql, [department_id])?;
        self.materialize_all(rows)
    }

    pub fn get_all(&mut self) -> Result<Vec<Employee>> {
        let rows = self.store.fetch_all(SELECT_COLUMNS, [])?;
        self.materialize_all(rows)
    }

    fn materialize_all(&mut self, rows: Vec<RawRow>) -> Result<Vec<Employee>> {
        let mut employees = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(employee) = self.instance_from_db(Some(row))? {
                employees.push(employee);
            }
        }
        Ok(employees)
    }

    /// Employees assigned to `department`
    pub fn for_department(&mut self, department: &Department) -> Result<Vec<Employee>> {
        let id = department.id().ok_or_else(|| {
            Error::State("Cannot list employees of a department without an ID.".to_string())
        })?;
        self.find_by_department(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::department::DepartmentRepository;
    use std::collections::HashSet;

    /// Department lookup backed by a fixed set of ids
    struct KnownDepartments(HashSet<i64>);

    impl DepartmentLookup for KnownDepartments {
        fn find_department(&self, id: i64) -> Result<Option<Department>> {
            if self.0.contains(&id) {
                Ok(Some(Department::new("Stub", "Nowhere")?))
            } else {
                Ok(None)
            }
        }
    }

    fn setup() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_all_tables().unwrap();
        store
    }

    #[test]
    fn test_validation_with_double() {
        let known = KnownDepartments(HashSet::from([1]));

        assert!(Employee::new("Lee", "Manager", 1, &known).is_ok());
        assert!(Employee::new("", "Manager", 1, &known).unwrap_err().is_validation());
        assert!(Employee::new("Lee", "", 1, &known).unwrap_err().is_validation());
        assert!(Employee::new("Lee", "Manager", 2, &known).unwrap_err().is_validation());
    }

    #[test]
    fn test_failed_setter_keeps_value() {
        let known = KnownDepartments(HashSet::from([1]));
        let mut employee = Employee::new("Lee", "Manager", 1, &known).unwrap();

        assert!(employee.set_department_id(5, &known).is_err());
        assert_eq!(employee.department_id(), 1);
    }

    #[test]
    fn test_employee_crud() {
        let store = setup();
        let mut departments = DepartmentRepository::new(&store);
        let payroll = departments.create("Payroll", "Building A").unwrap();
        let dept_id = payroll.id().unwrap();

        let mut repo = EmployeeRepository::new(&store);
        let mut lee = repo.create("Lee", "Manager", dept_id).unwrap();
        let id = lee.id().unwrap();

        lee.set_job_title("Director").unwrap();
        repo.update(&lee).unwrap();
        let found = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(found.job_title(), "Director");
        assert_eq!(repo.find_by_name("Lee").unwrap(), Some(found));

        let stale = lee.clone();
        repo.delete(&mut lee).unwrap();
        assert!(lee.id().is_none());
        assert!(repo.find_by_id(id).unwrap().is_none());

        // Updating a stale copy of the deleted row must not re-cache it
        repo.update(&stale).unwrap();
        assert!(repo.cache().is_empty());
    }

    #[test]
    fn test_unknown_department_rejected() {
        let store = setup();
        let mut repo = EmployeeRepository::new(&store);
        let err = repo.create("Lee", "Manager", 42).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.stats().unwrap().employees, 0);
    }

    #[test]
    fn test_department_employees() {
        let store = setup();
        let mut departments = DepartmentRepository::new(&store);
        let payroll = departments.create("Payroll", "Building A").unwrap();
        let hr = departments.create("Human Resources", "Building C").unwrap();

        let mut repo = EmployeeRepository::new(&store);
        repo.create("Lee", "Manager", payroll.id().unwrap()).unwrap();
        repo.create("Sasha", "Accountant", payroll.id().unwrap()).unwrap();
        repo.create("Tal", "Recruiter", hr.id().unwrap()).unwrap();

        let staff = repo.for_department(&payroll).unwrap();
        assert_eq!(staff.len(), 2);
        assert!(staff.iter().all(|e| e.department_id() == payroll.id().unwrap()));

        let unsaved = Department::new("Legal", "Building D").unwrap();
        assert!(repo.for_department(&unsaved).unwrap_err().is_state());
    }

    #[test]
    fn test_materialize_after_department_removed() {
        let store = SqliteStore::open_in_memory().unwrap().with_foreign_keys(false).unwrap();
        store.create_all_tables().unwrap();
        let mut departments = DepartmentRepository::new(&store);
        let mut payroll = departments.create("Payroll", "Building A").unwrap();

        let mut repo = EmployeeRepository::new(&store);
        let lee = repo.create("Lee", "Manager", payroll.id().unwrap()).unwrap();
        departments.delete(&mut payroll).unwrap();

        let err = repo.find_by_id(lee.id().unwrap()).unwrap_err();
        assert!(err.is_validation());
    }
}
