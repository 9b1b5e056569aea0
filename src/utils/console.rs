// src/utils/console.rs

//! Console output with server-style formatting.
//!
//! Diagnostics go through the `log` facade; this module prints the listing
//! itself (status lines, records, summaries) to stdout.

use chrono::Local;

/// Prefix a line with a timestamp and a tag.
fn format_line(tag: &str, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] [{}] {}", timestamp, tag, message)
}

/// Print a status line.
pub fn status(message: &str) {
    println!("{}", format_line("STATUS", message));
}

/// Print a success line.
pub fn success(message: &str) {
    println!("{}", format_line("OK", &format!("✓ {}", message)));
}

/// Print a failure line.
pub fn failure(message: &str) {
    println!("{}", format_line("FAIL", &format!("✗ {}", message)));
}

/// Print a header.
pub fn header(title: &str) {
    let border = "═".repeat(60);
    println!("{}", border);
    println!("  {}", title);
    println!("{}", border);
}

/// Print a separator line.
pub fn separator() {
    println!("{}", "─".repeat(60));
}

/// Print an indented line.
pub fn sub_item(message: &str) {
    println!("    {}", message);
}

/// Print a summary section.
pub fn summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("{}", format_line("SUMMARY", title));
    for (key, value) in items {
        println!("    {}: {}", key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line_layout() {
        let line = format_line("STATUS", "Materials: 3");
        assert!(line.starts_with('['));
        assert!(line.ends_with("[STATUS] Materials: 3"));
    }
}
