//! Per-field normalization rules
//!
//! Each rule either produces a normalized value or reports that the input
//! did not meet its precondition. Rules never fail.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;
use url::Url;

/// Layout of `date_added` before the timezone name.
pub const DATE_ADDED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timezone names accepted after the timestamp; all read as UTC.
pub const DATE_ADDED_ZONES: [&str; 2] = ["UTC", "GMT"];

/// Outcome of applying a rule to one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome<T> {
    /// The value was normalized into a new representation
    Normalized(T),
    /// The precondition was not met; keep the original value
    Unchanged,
}

impl<T> FieldOutcome<T> {
    pub fn is_normalized(&self) -> bool {
        matches!(self, FieldOutcome::Normalized(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            FieldOutcome::Normalized(value) => Some(value),
            FieldOutcome::Unchanged => None,
        }
    }
}

/// Parse `YYYY-MM-DD HH:MM:SS <zone>`
pub fn parse_date_added(raw: &str) -> FieldOutcome<DateTime<Utc>> {
    let Some((stamp, zone)) = raw.rsplit_once(' ') else {
        return FieldOutcome::Unchanged;
    };

    if !DATE_ADDED_ZONES.iter().any(|z| z.eq_ignore_ascii_case(zone)) {
        return FieldOutcome::Unchanged;
    }

    match NaiveDateTime::parse_from_str(stamp, DATE_ADDED_FORMAT) {
        Ok(naive) => FieldOutcome::Normalized(naive.and_utc()),
        Err(_) => FieldOutcome::Unchanged,
    }
}

/// `"true"` / `"false"` in any letter case become booleans.
///
/// This also catches free-text fields that happen to hold those words; the
/// source data is expected to use them only as flags.
pub fn coerce_bool(raw: &str) -> FieldOutcome<bool> {
    match raw.to_lowercase().as_str() {
        "true" => FieldOutcome::Normalized(true),
        "false" => FieldOutcome::Normalized(false),
        _ => FieldOutcome::Unchanged,
    }
}

/// Lowercase the authority of an absolute URL, leaving the rest verbatim
///
/// The authority is the text between the `://` that directly follows the
/// scheme and the first `/`, `?` or `#`, so user info and port are lowercased
/// along with the host. URLs written without `//` after the scheme have no
/// authority to rewrite.
pub fn normalize_url_host(raw: &str) -> FieldOutcome<String> {
    let parsed = match Url::parse(raw) {
        Ok(parsed) => parsed,
        Err(_) => return FieldOutcome::Unchanged,
    };
    if !parsed.has_host() {
        return FieldOutcome::Unchanged;
    }

    // Url::parse ignores leading control characters and spaces
    let lead = raw.len() - raw.trim_start_matches(|c: char| c <= ' ').len();
    let scheme_end = lead + parsed.scheme().len();
    if !raw.get(scheme_end..).is_some_and(|rest| rest.starts_with("://")) {
        return FieldOutcome::Unchanged;
    }
    let start = scheme_end + 3;
    let end = raw[start..]
        .find(|c| matches!(c, '/' | '?' | '#'))
        .map_or(raw.len(), |offset| start + offset);

    let mut normalized = String::with_capacity(raw.len());
    normalized.push_str(&raw[..start]);
    normalized.push_str(&raw[start..end].to_lowercase());
    normalized.push_str(&raw[end..]);

    FieldOutcome::Normalized(normalized)
}

/// Lowercase every string tag; other elements pass through
pub fn lowercase_tags(tags: &[Value]) -> Vec<Value> {
    tags.iter()
        .map(|tag| match tag {
            Value::String(s) => Value::String(s.to_lowercase()),
            other => other.clone(),
        })
        .collect()
}
