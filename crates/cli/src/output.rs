//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output.

use owo_colors::{OwoColorize, Stream};
use std::sync::atomic::{AtomicBool, Ordering};

static QUIET: AtomicBool = AtomicBool::new(false);

/// Suppress non-error output for the rest of the process
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

fn quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        if !quiet() {
            println!("{} {}", "✓".if_supports_color(Stream::Stdout, |t| t.green()), message);
        }
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".if_supports_color(Stream::Stderr, |t| t.red()), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".if_supports_color(Stream::Stderr, |t| t.yellow()), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        if !quiet() {
            println!("{} {}", "ℹ".if_supports_color(Stream::Stdout, |t| t.blue()), message);
        }
    }

    /// Print a step message (for multi-step operations)
    pub fn step(step: usize, total: usize, message: &str) {
        if !quiet() {
            let counter = format!("[{}/{}]", step, total);
            println!("{} {}", counter.if_supports_color(Stream::Stdout, |t| t.dimmed()), message);
        }
    }

    /// Print the command line about to run, indented under its step
    pub fn command(command_line: &str) {
        if !quiet() {
            println!(
                "      {} {}",
                "$".if_supports_color(Stream::Stdout, |t| t.dimmed()),
                command_line.if_supports_color(Stream::Stdout, |t| t.dimmed())
            );
        }
    }

    /// Print a header
    pub fn header(message: &str) {
        if !quiet() {
            println!();
            println!("{}", message.if_supports_color(Stream::Stdout, |t| t.bold()));
            println!("{}", "─".repeat(message.chars().count()));
        }
    }
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining_secs)
    }
}

/// Format a file size for display
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Exact byte count followed by the human-readable size, e.g. `2048 bytes (2.00 KB)`
pub fn format_size_exact(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} bytes", bytes)
    } else {
        format!("{} bytes ({})", bytes, format_size(bytes))
    }
}
