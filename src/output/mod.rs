//! Renders per-program scope records for stdout.
//!
//! Formatting is deliberately thin: a field-selection string and a delimiter.
//! Anything richer belongs to whatever consumes the lines.

use crate::app::{DragnetError, Result};
use crate::scope::{ProgramData, ScopeElement};

/// Valid field-selection letters: target, description, category, program URL.
const FIELDS: &str = "tdcu";

/// Check a field-selection string before any network activity happens.
pub fn validate_fields(fields: &str) -> Result<()> {
    if fields.is_empty() {
        return Err(DragnetError::Config(
            "output field selection is empty".into(),
        ));
    }
    match fields.chars().find(|c| !FIELDS.contains(*c)) {
        Some(unknown) => Err(DragnetError::Config(format!(
            "unknown output field '{}' (valid: {})",
            unknown, FIELDS
        ))),
        None => Ok(()),
    }
}

pub fn format_element(
    program: &ProgramData,
    element: &ScopeElement,
    fields: &str,
    delimiter: &str,
) -> String {
    let parts: Vec<&str> = fields
        .chars()
        .filter_map(|c| match c {
            't' => Some(element.target.as_str()),
            'd' => Some(element.description.as_str()),
            'c' => Some(element.category.as_str()),
            'u' => Some(program.url.as_str()),
            _ => None,
        })
        .collect();
    parts.join(delimiter)
}

/// Print every in-scope element of one program, one line per element.
pub fn print_program(program: &ProgramData, fields: &str, delimiter: &str) {
    for element in &program.in_scope {
        println!("{}", format_element(program, element, fields, delimiter));
    }
}
