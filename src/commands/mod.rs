/// `relay add-all`
pub mod add_all;
/// `relay hide`
pub mod hide;
/// `relay launch`
pub mod launch;
/// `relay list`
pub mod list;
/// `relay scan`
pub mod scan;
/// `relay validate`
pub mod validate;

use crate::output::{self, Verbosity};
use colored::Colorize;

fn quiet() -> bool {
    output::get_verbosity() == Verbosity::Quiet
}

/// Prints a success line (hidden with `--quiet`).
pub fn print_success(message: &str) {
    if quiet() {
        return;
    }
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error line to stderr.
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints an informational line (hidden with `--quiet`).
pub fn print_info(message: &str) {
    if quiet() {
        return;
    }
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Prints a warning line.
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}
