//! Progress bars and CLI output utilities
//!
//! Progress display for long-running scans plus the small console helpers
//! the command handlers share. Progress bars suspend cleanly when a log
//! line has to go out, so output stays readable.

use crate::workflow::TaskEvent;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;

// ============================================================================
// Styles
// ============================================================================

/// Spinner style for scanning operations
fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap()
        .tick_chars("⣾⣽⣻⢿⡿⣟⣯⣷")
}

/// Bar style for counted phases
fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("  {spinner:.green} [{bar:40.cyan/dim}] {pos}/{len} {msg}")
        .unwrap()
        .progress_chars("━━╾─")
}

// ============================================================================
// Console output helpers
// ============================================================================

/// Print a header section
pub fn print_header(title: &str) {
    println!();
    println!("═══ {} ═══", title);
    println!();
}

/// Print a success message with checkmark
pub fn print_success(msg: &str) {
    println!("  ✓ {}", msg);
}

/// Print an info message with bullet
pub fn print_info(msg: &str) {
    println!("  • {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("  ⚠ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    println!("  ✗ {}", msg);
}

// ============================================================================
// Task progress display
// ============================================================================

/// Renders the event stream of a background task as a spinner that turns
/// into a progress bar once a phase reports a known total.
pub struct TaskProgress {
    bar: ProgressBar,
    phase: Option<String>,
}

impl TaskProgress {
    pub fn new(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message(message.to_string());
        Self { bar, phase: None }
    }

    /// Feed one task event into the display.
    pub fn handle(&mut self, event: &TaskEvent) {
        match event {
            TaskEvent::Progress {
                phase,
                processed,
                total,
                ..
            } => {
                match total {
                    Some(total) => {
                        if self.phase.as_deref() != Some(phase.as_str()) {
                            self.bar.set_style(bar_style());
                            self.bar.set_length(*total as u64);
                            self.phase = Some(phase.clone());
                        }
                        self.bar.set_position(*processed as u64);
                        self.bar.set_message(phase.clone());
                    }
                    None => {
                        self.bar.set_message(format!("{}: {} files", phase, processed));
                    }
                }
            }
            TaskEvent::Message { text } => {
                let text = text.clone();
                self.bar.suspend(|| println!("  {}", text));
            }
            _ => {}
        }
    }

    /// Stop the display, leaving a final message.
    pub fn finish(&self, msg: &str) {
        self.bar.finish_and_clear();
        if !msg.is_empty() {
            print_success(msg);
        }
    }

    /// Stop the display after a failure.
    pub fn finish_with_error(&self, msg: &str) {
        self.bar.finish_and_clear();
        print_error(msg);
    }
}

// ============================================================================
// Utility functions
// ============================================================================

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Format a duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}

// ============================================================================
// Dual writer for file + console logging
// ============================================================================

/// A writer that writes to both console and file
///
/// Used for logging to both stderr and a log file simultaneously.
pub struct DualWriter {
    pub console: std::io::Stderr,
    pub file: std::fs::File,
}

impl Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let _ = self.console.write(buf);
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let _ = self.console.flush();
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 bytes");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30.0s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
    }
}
