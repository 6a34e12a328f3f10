//! Reviews - yearly performance summaries
//!
//! A `Review` is a plain value with validated fields. `ReviewRepository`
//! maps it to the `reviews` table:
//!
//! - `save` / `create` insert a row and assign the generated id
//! - `update` overwrites the row for the review's id (last write wins)
//! - `delete` removes the row and detaches the value (id reset to `None`)
//! - `find_by_id` / `get_all` materialize rows back into reviews
//!
//! Every row read goes through [`ReviewRepository::instance_from_db`], which
//! re-runs the field validators. A row that references an employee who has
//! since been removed therefore fails to load with a validation error.

use serde::Serialize;
use tracing::{debug, info, warn};
use crate::cache::IdentityCache;
use crate::employee::{Employee, EmployeeLookup};
use crate::storage::row::{self, RawRow};
use crate::storage::SqliteStore;
use crate::{Error, Result};

/// Earliest year a review may cover
pub const MIN_YEAR: i64 = 2000;

const SELECT_COLUMNS: &str = "SELECT id, year, summary, employee_id FROM reviews";

/// A performance review, persisted in the `reviews` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    id: Option<i64>,
    year: i64,
    summary: String,
    employee_id: i64,
}

impl Review {
    /// Build an unsaved review.
    ///
    /// Fails with [`Error::Validation`] when `year` is before 2000, when
    /// `summary` is empty, or when `employees` cannot resolve `employee_id`.
    /// Nothing is written to storage.
    pub fn new(
        year: i64,
        summary: impl Into<String>,
        employee_id: i64,
        employees: &dyn EmployeeLookup,
    ) -> Result<Self> {
        let mut review = Self {
            id: None,
            year: MIN_YEAR,
            summary: String::new(),
            employee_id: 0,
        };
        review.set_year(year)?;
        review.set_summary(summary)?;
        review.set_employee_id(employee_id, employees)?;
        Ok(review)
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn employee_id(&self) -> i64 {
        self.employee_id
    }

    pub fn set_year(&mut self, year: i64) -> Result<()> {
        if year < MIN_YEAR {
            return Err(Error::Validation(format!("year must be {} or later", MIN_YEAR)));
        }
        self.year = year;
        Ok(())
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) -> Result<()> {
        let summary = summary.into();
        if summary.is_empty() {
            return Err(Error::Validation("summary must not be empty".to_string()));
        }
        self.summary = summary;
        Ok(())
    }

    /// Point-in-time check: the employee must exist now. Later removal of
    /// the employee is not tracked.
    pub fn set_employee_id(&mut self, employee_id: i64, employees: &dyn EmployeeLookup) -> Result<()> {
        if employees.find_employee(employee_id)?.is_none() {
            return Err(Error::Validation(
                "employee_id must reference an employee in the database".to_string(),
            ));
        }
        self.employee_id = employee_id;
        Ok(())
    }
}

impl std::fmt::Display for Review {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = self.id.map(|id| id.to_string()).unwrap_or_else(|| "None".to_string());
        write!(
            f,
            "<Review {}: {}, {}, Employee: {}>",
            id, self.year, self.summary, self.employee_id
        )
    }
}

/// Maps `Review` to the `reviews` table and keeps an identity cache of the
/// reviews it has saved or loaded.
pub struct ReviewRepository<'a> {
    store: &'a SqliteStore,
    employees: &'a dyn EmployeeLookup,
    cache: IdentityCache<Review>,
}

impl<'a> ReviewRepository<'a> {
    /// Repository that validates employees against the same store
    pub fn new(store: &'a SqliteStore) -> Self {
        Self::with_lookup(store, store)
    }

    /// Repository with a substitute employee lookup
    pub fn with_lookup(store: &'a SqliteStore, employees: &'a dyn EmployeeLookup) -> Self {
        Self {
            store,
            employees,
            cache: IdentityCache::new(),
        }
    }

    pub fn employees(&self) -> &'a dyn EmployeeLookup {
        self.employees
    }

    pub fn cache(&self) -> &IdentityCache<Review> {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    // ========== Schema ==========

    pub fn create_table(&self) -> Result<()> {
        self.store.execute(crate::storage::schema::CREATE_REVIEWS_TABLE, [])?;
        info!("Created reviews table");
        Ok(())
    }

    pub fn drop_table(&self) -> Result<()> {
        self.store.execute(crate::storage::schema::DROP_REVIEWS_TABLE, [])?;
        info!("Dropped reviews table");
        Ok(())
    }

    // ========== Persistence ==========

    /// Insert a new row with the review's current fields, then assign the
    /// generated key to `review.id` and cache it.
    pub fn save(&mut self, review: &mut Review) -> Result<()> {
        let id = self.store.insert(
            "INSERT INTO reviews (year, summary, employee_id) VALUES (?1, ?2, ?3)",
            (review.year, &review.summary, review.employee_id),
        )?;
        review.id = Some(id);
        self.cache.insert(id, review.clone());
        debug!(id, employee_id = review.employee_id, "Saved review");
        Ok(())
    }

    /// Construct and save in one step
    pub fn create(&mut self, year: i64, summary: &str, employee_id: i64) -> Result<Review> {
        let mut review = Review::new(year, summary, employee_id, self.employees)?;
        self.save(&mut review)?;
        Ok(review)
    }

    /// Overwrite the stored row with the review's current fields. The cache
    /// entry is refreshed only when a row matched.
    pub fn update(&mut self, review: &Review) -> Result<()> {
        let id = review
            .id
            .ok_or_else(|| Error::State("Cannot update review without an ID.".to_string()))?;
        let changed = self.store.execute(
            "UPDATE reviews SET year = ?1, summary = ?2, employee_id = ?3 WHERE id = ?4",
            (review.year, &review.summary, review.employee_id, id),
        )?;
        // A deleted row must not come back into the cache
        if changed > 0 {
            self.cache.insert(id, review.clone());
        }
        debug!(id, changed, "Updated review");
        Ok(())
    }

    /// Remove the stored row, evict it from the cache and reset `review.id`.
    pub fn delete(&mut self, review: &mut Review) -> Result<()> {
        let id = review
            .id
            .ok_or_else(|| Error::State("Cannot delete review without an ID.".to_string()))?;
        self.store.execute("DELETE FROM reviews WHERE id = ?1", [id])?;
        self.cache.remove(id);
        review.id = None;
        debug!(id, "Deleted review");
        Ok(())
    }

    // ========== Queries ==========

    /// Materialize a `(id, year, summary, employee_id)` row.
    ///
    /// Returns `Ok(None)` for a missing row. Otherwise the fields are
    /// validated exactly as in [`Review::new`] and the fresh review replaces
    /// any cached entry for the same id.
    pub fn instance_from_db(&mut self, row: Option<RawRow>) -> Result<Option<Review>> {
        let Some(row) = row else {
            return Ok(None);
        };
        let id = row::primary_key(&row)?;
        let built = row::integer(&row, 1, "year").and_then(|year| {
            Review::new(
                year,
                row::text(&row, 2, "summary")?,
                row::integer(&row, 3, "employee_id")?,
                self.employees,
            )
        });
        let mut review = built.inspect_err(|e| warn!(id, "Review row failed validation: {}", e))?;
        review.id = Some(id);
        self.cache.insert(id, review.clone());
        Ok(Some(review))
    }

    pub fn find_by_id(&mut self, id: i64) -> Result<Option<Review>> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let row = self.store.fetch_one(&sql, [id])?;
        self.instance_from_db(row)
    }

    /// Every stored review. Order is whatever SQLite returns.
    pub fn get_all(&mut self) -> Result<Vec<Review>> {
        let rows = self.store.fetch_all(SELECT_COLUMNS, [])?;
        self.materialize_all(rows)
    }

    pub fn find_by_employee(&mut self, employee_id: i64) -> Result<Vec<Review>> {
        let sql = format!("{} WHERE employee_id = ?1", SELECT_COLUMNS);
        let rows = self.store.fetch_all(&sql, [employee_id])?;
        self.materialize_all(rows)
    }

    /// Reviews written for `employee`
    pub fn for_employee(&mut self, employee: &Employee) -> Result<Vec<Review>> {
        let id = employee.id().ok_or_else(|| {
            Error::State("Cannot list reviews of an employee without an ID.".to_string())
        })?;
        self.find_by_employee(id)
    }

    fn materialize_all(&mut self, rows: Vec<RawRow>) -> Result<Vec<Review>> {
        let mut reviews = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(review) = self.instance_from_db(Some(row))? {
                reviews.push(review);
            }
        }
        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::department::DepartmentRepository;
    use crate::employee::EmployeeRepository;
    use rusqlite::types::Value;
    use std::cell::Cell;
    use std::collections::HashSet;

    /// Employee lookup backed by a fixed set of ids; counts calls.
    struct KnownEmployees {
        ids: HashSet<i64>,
        calls: Cell<usize>,
    }

    impl KnownEmployees {
        fn new(ids: &[i64]) -> Self {
            Self {
                ids: ids.iter().copied().collect(),
                calls: Cell::new(0),
            }
        }
    }

    impl EmployeeLookup for KnownEmployees {
        fn find_employee(&self, id: i64) -> Result<Option<Employee>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.ids.contains(&id).then(|| Employee::stub(id)))
        }
    }

    /// Store with one department and one employee; returns the employee id
    fn setup() -> (SqliteStore, i64) {
        let store = SqliteStore::open_in_memory().unwrap();
        store.create_all_tables().unwrap();
        let employee_id = {
            let mut departments = DepartmentRepository::new(&store);
            let payroll = departments.create("Payroll", "Building A").unwrap();
            let mut employees = EmployeeRepository::new(&store);
            let lee = employees.create("Lee", "Manager", payroll.id().unwrap()).unwrap();
            lee.id().unwrap()
        };
        (store, employee_id)
    }

    #[test]
    fn test_year_boundary() {
        let employees = KnownEmployees::new(&[1]);

        let err = Review::new(1999, "late", 1, &employees).unwrap_err();
        assert!(err.is_validation());
        assert!(Review::new(2000, "on time", 1, &employees).is_ok());
    }

    #[test]
    fn test_empty_summary_rejected() {
        let employees = KnownEmployees::new(&[1]);
        assert!(Review::new(2021, "", 1, &employees).unwrap_err().is_validation());
    }

    #[test]
    fn test_unknown_employee_rejected() {
        let employees = KnownEmployees::new(&[1]);
        let err = Review::new(2021, "ok", 2, &employees).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: employee_id must reference an employee in the database"
        );
    }

    #[test]
    fn test_construction_checks_employee_once() {
        let employees = KnownEmployees::new(&[1]);
        let review = Review::new(2021, "ok", 1, &employees).unwrap();
        assert!(review.id().is_none());
        assert_eq!(employees.calls.get(), 1);
    }

    #[test]
    fn test_failed_setter_keeps_value() {
        let employees = KnownEmployees::new(&[1]);
        let mut review = Review::new(2021, "ok", 1, &employees).unwrap();

        assert!(review.set_year(1980).is_err());
        assert!(review.set_summary("").is_err());
        assert!(review.set_employee_id(9, &employees).is_err());
        assert_eq!(review.year(), 2021);
        assert_eq!(review.summary(), "ok");
        assert_eq!(review.employee_id(), 1);
    }

    #[test]
    fn test_save_assigns_id_and_round_trips() {
        let (store, employee_id) = setup();
        let mut repo = ReviewRepository::new(&store);

        let mut review = Review::new(2022, "Solid year", employee_id, &store).unwrap();
        repo.save(&mut review).unwrap();
        let id = review.id().unwrap();
        assert_eq!(repo.cache().get(id), Some(&review));

        let found = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(found.year(), 2022);
        assert_eq!(found.summary(), "Solid year");
        assert_eq!(found.employee_id(), employee_id);
    }

    #[test]
    fn test_create_round_trip() {
        let (store, employee_id) = setup();
        let mut repo = ReviewRepository::new(&store);

        let created = repo.create(2021, "ok", employee_id).unwrap();
        let found = repo.find_by_id(created.id().unwrap()).unwrap().unwrap();
        assert_eq!(found, created);
    }

    #[test]
    fn test_update_and_delete_need_id() {
        let (store, employee_id) = setup();
        let mut repo = ReviewRepository::new(&store);
        let mut review = Review::new(2021, "ok", employee_id, &store).unwrap();

        assert!(repo.update(&review).unwrap_err().is_state());
        assert!(repo.delete(&mut review).unwrap_err().is_state());
        assert_eq!(store.stats().unwrap().reviews, 0);
    }

    #[test]
    fn test_update_overwrites_row() {
        let (store, employee_id) = setup();
        let mut repo = ReviewRepository::new(&store);
        let mut review = repo.create(2021, "ok", employee_id).unwrap();

        review.set_year(2023).unwrap();
        review.set_summary("Great improvement").unwrap();
        repo.update(&review).unwrap();

        let found = repo.find_by_id(review.id().unwrap()).unwrap().unwrap();
        assert_eq!(found.year(), 2023);
        assert_eq!(found.summary(), "Great improvement");
    }

    #[test]
    fn test_delete_detaches() {
        let (store, employee_id) = setup();
        let mut repo = ReviewRepository::new(&store);
        let mut review = repo.create(2021, "ok", employee_id).unwrap();
        let old_id = review.id().unwrap();

        repo.delete(&mut review).unwrap();
        assert!(review.id().is_none());
        assert!(!repo.cache().contains(old_id));
        assert!(repo.find_by_id(old_id).unwrap().is_none());
    }

    #[test]
    fn test_update_after_delete_leaves_no_cache_entry() {
        let (store, employee_id) = setup();
        let mut repo = ReviewRepository::new(&store);
        let mut review = repo.create(2021, "ok", employee_id).unwrap();
        let stale = review.clone();
        let id = review.id().unwrap();

        repo.delete(&mut review).unwrap();
        repo.update(&stale).unwrap();

        assert!(!repo.cache().contains(id));
        assert!(repo.find_by_id(id).unwrap().is_none());
    }

    #[test]
    fn test_get_all_returns_every_row() {
        let (store, employee_id) = setup();
        let mut repo = ReviewRepository::new(&store);
        for year in 2020..2025 {
            repo.create(year, "Yearly check-in", employee_id).unwrap();
        }

        let all = repo.get_all().unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(repo.cache().len(), 5);
    }

    #[test]
    fn test_materialization_overwrites_cache() {
        let (store, employee_id) = setup();
        let mut repo = ReviewRepository::new(&store);
        let review = repo.create(2021, "ok", employee_id).unwrap();
        let id = review.id().unwrap();

        // Change the row behind the repository's back
        store
            .execute("UPDATE reviews SET summary = ?1 WHERE id = ?2", ("edited", id))
            .unwrap();
        assert_eq!(repo.cache().get(id).unwrap().summary(), "ok");

        repo.find_by_id(id).unwrap();
        assert_eq!(repo.cache().get(id).unwrap().summary(), "edited");
    }

    #[test]
    fn test_instance_from_db_none() {
        let (store, _) = setup();
        let mut repo = ReviewRepository::new(&store);
        assert!(repo.instance_from_db(None).unwrap().is_none());
        assert!(repo.cache().is_empty());
    }

    #[test]
    fn test_instance_from_db_validates_row() {
        let (store, employee_id) = setup();
        let mut repo = ReviewRepository::new(&store);

        let stale = vec![
            Value::Integer(10),
            Value::Integer(1999),
            Value::Text("old".into()),
            Value::Integer(employee_id),
        ];
        assert!(repo.instance_from_db(Some(stale)).unwrap_err().is_validation());
        assert!(!repo.cache().contains(10));
    }

    #[test]
    fn test_non_integer_year_in_row() {
        let (store, employee_id) = setup();
        store
            .execute(
                "INSERT INTO reviews (year, summary, employee_id) VALUES ('twenty', 'odd', ?1)",
                [employee_id],
            )
            .unwrap();

        let mut repo = ReviewRepository::new(&store);
        let err = repo.find_by_id(1).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: year must be an integer");
    }

    #[test]
    fn test_materialize_after_employee_removed() {
        let store = SqliteStore::open_in_memory().unwrap().with_foreign_keys(false).unwrap();
        store.create_all_tables().unwrap();
        let mut departments = DepartmentRepository::new(&store);
        let payroll = departments.create("Payroll", "Building A").unwrap();
        let mut employees = EmployeeRepository::new(&store);
        let mut lee = employees.create("Lee", "Manager", payroll.id().unwrap()).unwrap();

        let mut repo = ReviewRepository::new(&store);
        let review = repo.create(2021, "ok", lee.id().unwrap()).unwrap();
        employees.delete(&mut lee).unwrap();

        let err = repo.find_by_id(review.id().unwrap()).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_foreign_key_enforced_by_storage() {
        let (store, employee_id) = setup();
        let mut repo = ReviewRepository::new(&store);
        repo.create(2021, "ok", employee_id).unwrap();

        let err = store
            .execute("DELETE FROM employees WHERE id = ?1", [employee_id])
            .unwrap_err();
        assert!(err.is_storage());
    }

    #[test]
    fn test_save_surfaces_storage_error() {
        let (store, employee_id) = setup();
        let employees = KnownEmployees::new(&[employee_id, 77]);
        let mut repo = ReviewRepository::with_lookup(&store, &employees);

        // The double accepts 77 but the table has no such employee
        let err = repo.create(2021, "ok", 77).unwrap_err();
        assert!(err.is_storage());
        assert!(repo.cache().is_empty());
    }

    #[test]
    fn test_employee_reviews() {
        let (store, employee_id) = setup();
        let mut repo = ReviewRepository::new(&store);
        repo.create(2021, "ok", employee_id).unwrap();
        repo.create(2022, "better", employee_id).unwrap();

        let mut employees = EmployeeRepository::new(&store);
        let lee = employees.find_by_id(employee_id).unwrap().unwrap();
        assert_eq!(repo.for_employee(&lee).unwrap().len(), 2);

        let unsaved = Employee::new("Kim", "Clerk", lee.department_id(), &store).unwrap();
        assert!(repo.for_employee(&unsaved).unwrap_err().is_state());
    }

    #[test]
    fn test_schema_lifecycle() {
        let store = SqliteStore::open_in_memory().unwrap();
        let repo = ReviewRepository::new(&store);

        repo.create_table().unwrap();
        repo.create_table().unwrap();
        assert!(store.table_exists("reviews").unwrap());

        repo.drop_table().unwrap();
        repo.drop_table().unwrap();
        assert!(!store.table_exists("reviews").unwrap());
    }

    #[test]
    fn test_display() {
        let employees = KnownEmployees::new(&[3]);
        let review = Review::new(2021, "ok", 3, &employees).unwrap();
        assert_eq!(review.to_string(), "<Review None: 2021, ok, Employee: 3>");
    }
}
