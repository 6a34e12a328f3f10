use tabled::{settings::Style, Table, Tabled};
use crate::{Department, Employee, Review};
use crate::storage::DbStats;

fn id_cell(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}

#[derive(Tabled)]
struct DepartmentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Location")]
    location: String,
}

impl From<&Department> for DepartmentRow {
    fn from(department: &Department) -> Self {
        Self {
            id: id_cell(department.id()),
            name: department.name().to_string(),
            location: department.location().to_string(),
        }
    }
}

#[derive(Tabled)]
struct EmployeeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Job Title")]
    job_title: String,
    #[tabled(rename = "Department")]
    department_id: i64,
}

impl From<&Employee> for EmployeeRow {
    fn from(employee: &Employee) -> Self {
        Self {
            id: id_cell(employee.id()),
            name: employee.name().to_string(),
            job_title: employee.job_title().to_string(),
            department_id: employee.department_id(),
        }
    }
}

#[derive(Tabled)]
struct ReviewRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Year")]
    year: i64,
    #[tabled(rename = "Employee")]
    employee_id: i64,
    #[tabled(rename = "Summary")]
    summary: String,
}

impl From<&Review> for ReviewRow {
    fn from(review: &Review) -> Self {
        Self {
            id: id_cell(review.id()),
            year: review.year(),
            employee_id: review.employee_id(),
            summary: review.summary().to_string(),
        }
    }
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Table")]
    table: &'static str,
    #[tabled(rename = "Rows")]
    rows: usize,
}

fn render<R: Tabled>(rows: Vec<R>) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn department_table(departments: &[Department]) -> String {
    render(departments.iter().map(DepartmentRow::from).collect())
}

pub fn employee_table(employees: &[Employee]) -> String {
    render(employees.iter().map(EmployeeRow::from).collect())
}

pub fn review_table(reviews: &[Review]) -> String {
    render(reviews.iter().map(ReviewRow::from).collect())
}

pub fn stats_table(stats: &DbStats) -> String {
    render(vec![
        StatRow { table: "departments", rows: stats.departments },
        StatRow { table: "employees", rows: stats.employees },
        StatRow { table: "reviews", rows: stats.reviews },
    ])
}
