use crate::{emit_json, DepartmentCommand, EmployeeCommand, OutputMode, ReviewCommand};
use perfreview::config;
use perfreview::storage::SqliteStore;
use perfreview::ui::{self, Icons};
use perfreview::{Department, DepartmentRepository, Employee, EmployeeRepository, Review, ReviewRepository};
use std::path::Path;

pub fn run_init(
    config_path: &Path,
    db_path: &Path,
    foreign_keys: bool,
    force: bool,
    output_mode: OutputMode,
) -> anyhow::Result<()> {
    config::init_database(config_path, db_path, foreign_keys, force)?;

    if output_mode.is_human() {
        ui::header(Icons::DATABASE, "Initialized perfreview");
        ui::detail("Config", &config_path.display().to_string());
        ui::detail("Database", &db_path.display().to_string());
    } else {
        emit_json(&serde_json::json!({
            "config": config_path,
            "database": db_path,
        }))?;
    }
    Ok(())
}

pub fn run_reset(store: &SqliteStore, output_mode: OutputMode) -> anyhow::Result<()> {
    store.drop_all_tables()?;
    store.create_all_tables()?;

    if output_mode.is_human() {
        ui::success("All tables dropped and recreated");
    } else {
        emit_json(&store.stats()?)?;
    }
    Ok(())
}

pub fn run_seed(store: &SqliteStore, output_mode: OutputMode) -> anyhow::Result<()> {
    let stats = perfreview::seed::run(store)?;

    if output_mode.is_human() {
        ui::header(Icons::SEED, "Seeded sample data");
        println!("{}", ui::stats_table(&stats));
    } else {
        emit_json(&stats)?;
    }
    Ok(())
}

pub fn run_stats(store: &SqliteStore, db_path: &Path, output_mode: OutputMode) -> anyhow::Result<()> {
    let stats = store.stats()?;

    if output_mode.is_human() {
        ui::header(Icons::STATS, &format!("Perfreview Statistics ({})", db_path.display()));
        println!("{}", ui::stats_table(&stats));
    } else {
        emit_json(&stats)?;
    }
    Ok(())
}

// ========== Departments ==========

pub fn run_department(store: &SqliteStore, command: DepartmentCommand, output_mode: OutputMode) -> anyhow::Result<()> {
    let mut repo = DepartmentRepository::new(store);

    match command {
        DepartmentCommand::Add { name, location } => {
            let department = repo.create(&name, &location)?;
            show_department(&department, output_mode)?;
        }
        DepartmentCommand::List => {
            let departments = repo.get_all()?;
            list(&departments, Icons::DEPARTMENT, "Departments", ui::department_table, output_mode)?;
        }
        DepartmentCommand::Show { id } => {
            let department = require(repo.find_by_id(id)?, "Department", id)?;
            show_department(&department, output_mode)?;
        }
        DepartmentCommand::Update { id, name, location } => {
            let mut department = require(repo.find_by_id(id)?, "Department", id)?;
            if let Some(name) = name {
                department.set_name(name)?;
            }
            if let Some(location) = location {
                department.set_location(location)?;
            }
            repo.update(&department)?;
            show_department(&department, output_mode)?;
        }
        DepartmentCommand::Delete { id } => {
            let mut department = require(repo.find_by_id(id)?, "Department", id)?;
            repo.delete(&mut department)?;
            deleted("Department", id, output_mode)?;
        }
        DepartmentCommand::Employees { id } => {
            let department = require(repo.find_by_id(id)?, "Department", id)?;
            let mut employees = EmployeeRepository::new(store);
            let staff = employees.for_department(&department)?;
            let title = format!("Employees of {}", department.name());
            list(&staff, Icons::PERSON, &title, ui::employee_table, output_mode)?;
        }
    }
    Ok(())
}

fn show_department(department: &Department, output_mode: OutputMode) -> anyhow::Result<()> {
    if !output_mode.is_human() {
        return emit_json(department);
    }
    ui::header(Icons::DEPARTMENT, &department.to_string());
    ui::detail("Name", department.name());
    ui::detail("Location", department.location());
    Ok(())
}

// ========== Employees ==========

pub fn run_employee(store: &SqliteStore, command: EmployeeCommand, output_mode: OutputMode) -> anyhow::Result<()> {
    let mut repo = EmployeeRepository::new(store);

    match command {
        EmployeeCommand::Add { name, job_title, department } => {
            let employee = repo.create(&name, &job_title, department)?;
            show_employee(&employee, output_mode)?;
        }
        EmployeeCommand::List => {
            let employees = repo.get_all()?;
            list(&employees, Icons::PERSON, "Employees", ui::employee_table, output_mode)?;
        }
        EmployeeCommand::Show { id } => {
            let employee = require(repo.find_by_id(id)?, "Employee", id)?;
            show_employee(&employee, output_mode)?;
        }
        EmployeeCommand::Update { id, name, job_title, department } => {
            let mut employee = require(repo.find_by_id(id)?, "Employee", id)?;
            if let Some(name) = name {
                employee.set_name(name)?;
            }
            if let Some(job_title) = job_title {
                employee.set_job_title(job_title)?;
            }
            if let Some(department) = department {
                employee.set_department_id(department, repo.departments())?;
            }
            repo.update(&employee)?;
            show_employee(&employee, output_mode)?;
        }
        EmployeeCommand::Delete { id } => {
            let mut employee = require(repo.find_by_id(id)?, "Employee", id)?;
            repo.delete(&mut employee)?;
            deleted("Employee", id, output_mode)?;
        }
        EmployeeCommand::Reviews { id } => {
            let employee = require(repo.find_by_id(id)?, "Employee", id)?;
            let mut reviews = ReviewRepository::new(store);
            let written = reviews.for_employee(&employee)?;
            let title = format!("Reviews of {}", employee.name());
            list(&written, Icons::REVIEW, &title, ui::review_table, output_mode)?;
        }
    }
    Ok(())
}

fn show_employee(employee: &Employee, output_mode: OutputMode) -> anyhow::Result<()> {
    if !output_mode.is_human() {
        return emit_json(employee);
    }
    ui::header(Icons::PERSON, &employee.to_string());
    ui::detail("Name", employee.name());
    ui::detail("Job title", employee.job_title());
    ui::detail("Department", &employee.department_id().to_string());
    Ok(())
}

// ========== Reviews ==========

pub fn run_review(store: &SqliteStore, command: ReviewCommand, output_mode: OutputMode) -> anyhow::Result<()> {
    let mut repo = ReviewRepository::new(store);

    match command {
        ReviewCommand::Add { year, summary, employee } => {
            let review = repo.create(year, &summary, employee)?;
            show_review(&review, output_mode)?;
        }
        ReviewCommand::List => {
            let reviews = repo.get_all()?;
            list(&reviews, Icons::REVIEW, "Reviews", ui::review_table, output_mode)?;
        }
        ReviewCommand::Show { id } => {
            let review = require(repo.find_by_id(id)?, "Review", id)?;
            show_review(&review, output_mode)?;
        }
        ReviewCommand::Update { id, year, summary, employee } => {
            let mut review = require(repo.find_by_id(id)?, "Review", id)?;
            if let Some(year) = year {
                review.set_year(year)?;
            }
            if let Some(summary) = summary {
                review.set_summary(summary)?;
            }
            if let Some(employee) = employee {
                review.set_employee_id(employee, repo.employees())?;
            }
            repo.update(&review)?;
            show_review(&review, output_mode)?;
        }
        ReviewCommand::Delete { id } => {
            let mut review = require(repo.find_by_id(id)?, "Review", id)?;
            repo.delete(&mut review)?;
            deleted("Review", id, output_mode)?;
        }
    }
    Ok(())
}

fn show_review(review: &Review, output_mode: OutputMode) -> anyhow::Result<()> {
    if !output_mode.is_human() {
        return emit_json(review);
    }
    ui::header(Icons::REVIEW, &review.to_string());
    ui::detail("Year", &review.year().to_string());
    ui::detail("Employee", &review.employee_id().to_string());
    ui::detail("Summary", review.summary());
    Ok(())
}

// ========== Helpers ==========

fn require<T>(found: Option<T>, kind: &str, id: i64) -> anyhow::Result<T> {
    found.ok_or_else(|| anyhow::anyhow!("{} {} not found", kind, id))
}

fn list<T: serde::Serialize>(
    items: &[T],
    icon: &str,
    title: &str,
    render: fn(&[T]) -> String,
    output_mode: OutputMode,
) -> anyhow::Result<()> {
    if !output_mode.is_human() {
        return emit_json(items);
    }
    ui::header(icon, &format!("{} ({})", title, items.len()));
    if items.is_empty() {
        println!("{} Nothing stored yet.", Icons::EMPTY);
    } else {
        println!("{}", render(items));
    }
    Ok(())
}

fn deleted(kind: &str, id: i64, output_mode: OutputMode) -> anyhow::Result<()> {
    if !output_mode.is_human() {
        return emit_json(&serde_json::json!({ "deleted": kind.to_lowercase(), "id": id }));
    }
    ui::success(&format!("{} {} deleted {}", kind, id, Icons::DEL));
    Ok(())
}
