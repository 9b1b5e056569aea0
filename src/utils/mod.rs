//! Utility functions and helpers.

pub mod console;
pub mod debounce;
pub mod http;
pub mod url;

use chrono::Utc;

pub use debounce::Debouncer;

/// Render timestamp shown next to result counts (`YYYY-MM-DD HH:MM:SS`, UTC).
pub fn render_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Milliseconds since the epoch, used as a cache-busting token.
pub fn cache_token() -> i64 {
    Utc::now().timestamp_millis()
}

/// Fill `{name}` placeholders in a message template.
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |acc, (name, value)| {
            acc.replace(&format!("{{{name}}}"), value)
        })
}
