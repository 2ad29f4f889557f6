//! Terminal capability detection and utilities

use owo_colors::{colors::css, OwoColorize};
use wanderwise::ExpiryStatus;

/// Detects whether colored output should be enabled
pub fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Extension trait for colorizing output
pub trait Colorize {
    /// Color as success (green)
    fn success(&self) -> String;
    /// Color as warning (amber)
    fn warning(&self) -> String;
    /// Color as danger (red)
    fn danger(&self) -> String;
    /// Dim the text
    fn dim(&self) -> String;
}

impl Colorize for str {
    fn success(&self) -> String {
        if supports_color() {
            self.fg::<css::Green>().to_string()
        } else {
            self.to_string()
        }
    }

    fn warning(&self) -> String {
        if supports_color() {
            self.fg::<css::Orange>().to_string()
        } else {
            self.to_string()
        }
    }

    fn danger(&self) -> String {
        if supports_color() {
            self.fg::<css::Red>().to_string()
        } else {
            self.to_string()
        }
    }

    fn dim(&self) -> String {
        if supports_color() {
            self.dimmed().to_string()
        } else {
            self.to_string()
        }
    }
}

impl Colorize for String {
    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warning(&self) -> String {
        self.as_str().warning()
    }

    fn danger(&self) -> String {
        self.as_str().danger()
    }

    fn dim(&self) -> String {
        self.as_str().dim()
    }
}

/// The status label, colored by severity.
pub fn status_label(status: ExpiryStatus) -> String {
    let label = status.label();
    match status {
        ExpiryStatus::Expired | ExpiryStatus::Critical => label.danger(),
        ExpiryStatus::Warning => label.warning(),
        ExpiryStatus::Valid => label.success(),
    }
}

/// A five-character star bar, e.g. `★★★☆☆`.
pub fn stars(count: u8) -> String {
    let filled = usize::from(count.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}
