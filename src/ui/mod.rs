pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{detail, header, success};
pub use table::{department_table, employee_table, review_table, stats_table};
pub use theme::{theme, Theme};
