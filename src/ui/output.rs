use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(icon: &str, text: &str) {
    println!("{} {}", icon, text.style(theme().header));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success));
}

/// Indented `label: value` line under a header
pub fn detail(label: &str, value: &str) {
    println!("  {} {}", format!("{}:", label).style(theme().label), value);
}
