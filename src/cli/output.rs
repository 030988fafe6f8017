//! Terminal output
//!
//! Data goes to stdout, diagnostics to stderr. `colored` honours NO_COLOR and
//! CLICOLOR_FORCE on its own.

use std::fmt::Display;
use std::io::Write;

use colored::Colorize;

use crate::domain::{Availability, Book};

pub fn error(msg: impl Display) {
    eprintln!("{} {msg}", "error:".red().bold());
}

pub fn warning(msg: impl Display) {
    eprintln!("{} {msg}", "warning:".yellow().bold());
}

/// `<label>: <subject>` with a green label, e.g. "Book added: Dune".
pub fn done(label: &str, subject: impl Display) {
    println!("{}: {subject}", label.green());
}

pub fn heading(text: impl Display) {
    println!("{}", text.to_string().cyan().bold());
}

pub fn bullet(text: impl Display) {
    println!("  - {text}");
}

/// Secondary information, dimmed and indented.
pub fn note(text: impl Display) {
    println!("  {}", text.to_string().dimmed());
}

/// Uncoloured data for piping.
pub fn plain(text: impl Display) {
    println!("{text}");
}

/// One catalog entry with its availability highlighted.
pub fn book(book: &Book) {
    let state = match book.availability() {
        Availability::Available => "available".green(),
        Availability::Borrowed => "borrowed".red(),
    };
    println!(
        "{}  {} [{}] {state}",
        book.title.bold(),
        book.author,
        book.identifier
    );
}

pub fn prompt(text: &str) {
    print!("{} ", text.cyan());
    std::io::stdout().flush().ok();
}
