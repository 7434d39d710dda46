//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for rendered text/data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}
