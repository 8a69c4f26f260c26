//! Colored CLI display utilities for fact-check output.
//!
//! `write_*` functions target any writer so the session runner can be
//! driven with in-memory streams. `print_*` functions go to stdout.

use std::io::{self, Write};

use chrono::Utc;
use owo_colors::OwoColorize;

/// Get current timestamp in the same format as tracing.
fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string()
}

/// Truncate a string to a maximum number of characters, adding ellipsis if truncated.
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        "...".to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    }
}

/// Write a prompt without a trailing newline.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_prompt(out: &mut impl Write, question: &str) -> io::Result<()> {
    write!(out, "{} ", question.bold())?;
    out.flush()
}

/// Write the analysis result.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_result(out: &mut impl Write, text: &str) -> io::Result<()> {
    writeln!(out, "\n{}", "[RESULT]".green().bold())?;
    writeln!(out, "{}", text.trim_end())?;
    out.flush()
}

/// Write where a session export was saved.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_export(out: &mut impl Write, path: &std::path::Path) -> io::Result<()> {
    writeln!(
        out,
        "{} Session exported to {}",
        "[EXPORT]".blue().bold(),
        path.display().cyan()
    )?;
    out.flush()
}

/// Write an error with optional detail on a second line.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_error(out: &mut impl Write, message: &str, detail: Option<&str>) -> io::Result<()> {
    writeln!(out, "{} {}", "[ERROR]".red().bold(), message)?;
    if let Some(detail) = detail {
        writeln!(out, "        {}", truncate(detail, 500).dimmed())?;
    }
    out.flush()
}

/// Write a warning.
///
/// # Errors
///
/// Returns any error from the underlying writer.
pub fn write_warning(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "{} {}", "[WARN]".yellow().bold(), message)?;
    out.flush()
}

/// Print an error message.
pub fn print_error(message: &str) {
    let _ = write_error(&mut io::stdout(), message, None);
}

/// Print that a provider is being asked.
pub fn print_provider_attempt(provider: &str, model: &str) {
    println!(
        "{} {} {} ({}) - {}",
        timestamp().dimmed(),
        "[AI]".magenta().bold(),
        provider.cyan(),
        model.dimmed(),
        "analyzing".yellow()
    );
    let _ = io::stdout().flush();
}

/// Print provider outcome.
pub fn print_provider_result(provider: &str, model: &str, error: Option<&str>) {
    let ts = timestamp();
    match error {
        None => println!(
            "{} {} {} ({}) - {}",
            ts.dimmed(),
            "[AI]".magenta().bold(),
            provider.cyan(),
            model.dimmed(),
            "done".green()
        ),
        Some(e) => println!(
            "{} {} {} ({}) - {} {}",
            ts.dimmed(),
            "[AI]".magenta().bold(),
            provider.cyan(),
            model.dimmed(),
            "failed".red(),
            truncate(e, 150).dimmed()
        ),
    }
    let _ = io::stdout().flush();
}
