//! Departments - the organizational unit every employee belongs to

use serde::Serialize;
use tracing::{debug, info, warn};
use crate::cache::IdentityCache;
use crate::storage::row::{self, RawRow};
use crate::storage::SqliteStore;
use crate::{Error, Result};

const SELECT_COLUMNS: &str = "SELECT id, name, location FROM departments";

/// A department, persisted in the `departments` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Department {
    id: Option<i64>,
    name: String,
    location: String,
}

impl Department {
    /// Build an unsaved department, validating both fields.
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Result<Self> {
        let mut department = Self {
            id: None,
            name: String::new(),
            location: String::new(),
        };
        department.set_name(name)?;
        department.set_location(location)?;
        Ok(department)
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::Validation("name must not be empty".to_string()));
        }
        self.name = name;
        Ok(())
    }

    pub fn set_location(&mut self, location: impl Into<String>) -> Result<()> {
        let location = location.into();
        if location.is_empty() {
            return Err(Error::Validation("location must not be empty".to_string()));
        }
        self.location = location;
        Ok(())
    }
}

impl std::fmt::Display for Department {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "<Department {}: {}, {}>", id, self.name, self.location),
            None => write!(f, "<Department None: {}, {}>", self.name, self.location),
        }
    }
}

/// Resolve a department by primary key.
///
/// Employee validation depends on this capability rather than on a
/// repository, so tests can hand in any implementation.
pub trait DepartmentLookup {
    fn find_department(&self, id: i64) -> Result<Option<Department>>;
}

impl DepartmentLookup for SqliteStore {
    fn find_department(&self, id: i64) -> Result<Option<Department>> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        match self.fetch_one(&sql, [id])? {
            Some(row) => Ok(Some(Department {
                id: Some(row::primary_key(&row)?),
                name: row::text(&row, 1, "name")?,
                location: row::text(&row, 2, "location")?,
            })),
            None => Ok(None),
        }
    }
}

/// Maps `Department` to the `departments` table.
pub struct DepartmentRepository<'a> {
    store: &'a SqliteStore,
    cache: IdentityCache<Department>,
}

impl<'a> DepartmentRepository<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self {
            store,
            cache: IdentityCache::new(),
        }
    }

    pub fn cache(&self) -> &IdentityCache<Department> {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    // ========== Schema ==========

    pub fn create_table(&self) -> Result<()> {
        self.store.execute(crate::storage::schema::CREATE_DEPARTMENTS_TABLE, [])?;
        info!("Created departments table");
        Ok(())
    }

    pub fn drop_table(&self) -> Result<()> {
        self.store.execute(crate::storage::schema::DROP_DEPARTMENTS_TABLE, [])?;
        info!("Dropped departments table");
        Ok(())
    }

    // ========== Persistence ==========

    /// Insert a new row and assign the generated id to `department`.
    pub fn save(&mut self, department: &mut Department) -> Result<()> {
        let id = self.store.insert(
            "INSERT INTO departments (name, location) VALUES (?1, ?2)",
            (&department.name, &department.location),
        )?;
        department.id = Some(id);
        self.cache.insert(id, department.clone());
        debug!(id, "Saved department");
        Ok(())
    }

    pub fn create(&mut self, name: &str, location: &str) -> Result<Department> {
        let mut department = Department::new(name, location)?;
        self.save(&mut department)?;
        Ok(department)
    }

    pub fn update(&mut self, department: &Department) -> Result<()> {
        let id = department
            .id
            .ok_or_else(|| Error::State("Cannot update department without an ID.".to_string()))?;
        let changed = self.store.execute(
            "UPDATE departments SET name = ?1, location = ?2 WHERE id = ?3",
            (&department.name, &department.location, id),
        )?;
        if changed > 0 {
            self.cache.insert(id, department.clone());
        }
        Ok(())
    }

    pub fn delete(&mut self, department: &mut Department) -> Result<()> {
        let id = department
            .id
            .ok_or_else(|| Error::State("Cannot delete department without an ID.".to_string()))?;
        self.store.execute("DELETE FROM departments WHERE id = ?1", [id])?;
        self.cache.remove(id);
        department.id = None;
        Ok(())
    }

    // ========== Queries ==========

    /// Build a department from a `(id, name, location)` row and cache it.
    pub fn instance_from_db(&mut self, row: Option<RawRow>) -> Result<Option<Department>> {
        let Some(row) = row else {
            return Ok(None);
        };
        let id = row::primary_key(&row)?;
        let mut department = Department::new(
            row::text(&row, 1, "name")?,
            row::text(&row, 2, "location")?,
        )
        .inspect_err(|e| warn!(id, "Department row failed validation: {}", e))?;
        department.id = Some(id);
        self.cache.insert(id, department.clone());
        Ok(Some(department))
    }

    pub fn find_by_id(&mut self, id: i64) -> Result<Option<Department>> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let row = self.store.fetch_one(&sql, [id])?;
        self.instance_from_db(row)
    }

    pub fn find_by_name(&mut self, name: &str) -> Result<Option<Department>> {
        let sql = format!("{} WHERE name = ?1", SELECT_COLUMNS);
        let row = self.store.fetch_one(&sql, [name])?;
        self.instance_from_db(row)
    }

    pub fn get_all(&mut self) -> Result<Vec<Department>> {
        let rows = self.store.fetch_all(SELECT_COLUMNS, [])?;
        let mut departments = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(department) = self.instance_from_db(Some(row))? {
                departments.push(department);
            }
        }
        Ok(departments)
    }
}
