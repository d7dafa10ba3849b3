//! List command implementation

use std::process::ExitCode;

use crate::transforms::{self, Transform};

use super::EXIT_SUCCESS;

/// Execute the list command
pub fn run_list() -> ExitCode {
    print!("{}", format_listing());
    ExitCode::from(EXIT_SUCCESS)
}

/// One line per registered transform, names padded to a common width.
fn format_listing() -> String {
    let all = transforms::all();
    let width = all.iter().map(|t| t.name().len()).max().unwrap_or(0);
    all.iter().map(|t| format!("{:<width$}  {}\n", t.name(), t.description(), width = width)).collect()
}
