//! `dateTime.iso8601` normalization.
//!
//! XML-RPC servers disagree on the timestamp layout: the original protocol
//! description shows the compact `20030401T12:00:00` form, many servers send
//! `20030401T120000`, and strict validators expect the punctuated
//! `2003-04-01T12:00:00`. Every timestamp that enters or leaves this crate is
//! rewritten to the punctuated form.

use chrono::NaiveDateTime;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// `chrono` format string of the canonical layout.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-?(\d{2})-?(\d{2})T(\d{2}):?(\d{2}):?(\d{2})$")
        .expect("date pattern is a valid regex")
});

/// Rewrite `text` to `YYYY-MM-DDTHH:MM:SS`, inserting any missing `-` and
/// `:` separators.
///
/// Returns `None` when `text` does not follow the
/// `YYYY(-)?MM(-)?DDTHH(:)?MM(:)?SS` digit pattern.
///
/// ```rust
/// use xmlrpc_serde::datetime::normalize;
///
/// assert_eq!(normalize("20030401T120000").as_deref(), Some("2003-04-01T12:00:00"));
/// assert_eq!(normalize("2003-04-01T12:00:00").as_deref(), Some("2003-04-01T12:00:00"));
/// assert_eq!(normalize("yesterday"), None);
/// ```
pub fn normalize(text: &str) -> Option<String> {
    let caps = DATE_PATTERN.captures(text)?;
    Some(format!(
        "{}-{}-{}T{}:{}:{}",
        &caps[1], &caps[2], &caps[3], &caps[4], &caps[5], &caps[6]
    ))
}

/// Read-path variant of [`normalize`]: text that does not follow the digit
/// pattern is handed back unchanged.
pub fn normalize_lenient(text: &str) -> Cow<'_, str> {
    match normalize(text) {
        Some(canonical) if canonical != text => Cow::Owned(canonical),
        _ => Cow::Borrowed(text),
    }
}

/// True when `text` is already in canonical form.
pub fn is_canonical(text: &str) -> bool {
    normalize(text).is_some_and(|c| c == text)
}

/// Format a timestamp in canonical form.
pub fn format(dt: &NaiveDateTime) -> String {
    dt.format(CANONICAL_FORMAT).to_string()
}

/// Parse a timestamp in any layout accepted by [`normalize`].
pub fn parse(text: &str) -> Option<NaiveDateTime> {
    let canonical = normalize(text)?;
    NaiveDateTime::parse_from_str(&canonical, CANONICAL_FORMAT).ok()
}
