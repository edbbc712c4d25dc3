//! Transform stage
//!
//! Every record is normalized on its own, by these rules in this order:
//!
//! 1. **Blacklist flattening**: each `blacklists.<key>` becomes a top-level
//!    `blacklist_<key>` field and `blacklists` is removed.
//! 2. **Date normalization**: `date_added` strings shaped like
//!    `2023-01-15 10:30:00 UTC` become date-times.
//! 3. **Boolean coercion**: any string field equal to `true`/`false`
//!    (ignoring case) becomes a boolean, flattened fields included.
//! 4. **Tag lowercasing**: every string in `tags` is lowercased.
//! 5. **URL host normalization**: the authority of `url` is lowercased.
//!
//! Dates are converted before boolean coercion so a parsed date-time is no
//! longer a string by the time step 3 looks at it.

mod record;
mod rules;

pub use record::{FieldValue, UrlRecord};
pub use rules::{
    coerce_bool, lowercase_tags, normalize_url_host, parse_date_added, FieldOutcome,
    DATE_ADDED_FORMAT, DATE_ADDED_ZONES,
};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

pub const BLACKLISTS_FIELD: &str = "blacklists";
pub const BLACKLIST_PREFIX: &str = "blacklist_";
pub const DATE_ADDED_FIELD: &str = "date_added";
pub const TAGS_FIELD: &str = "tags";
pub const URL_FIELD: &str = "url";

/// Counters for one transform pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransformStats {
    pub records: usize,
    pub blacklist_fields: usize,
    pub dates_normalized: usize,
    pub dates_unchanged: usize,
    pub booleans_coerced: usize,
    pub urls_normalized: usize,
    pub urls_unchanged: usize,
}

impl std::ops::AddAssign for TransformStats {
    fn add_assign(&mut self, other: Self) {
        self.records += other.records;
        self.blacklist_fields += other.blacklist_fields;
        self.dates_normalized += other.dates_normalized;
        self.dates_unchanged += other.dates_unchanged;
        self.booleans_coerced += other.booleans_coerced;
        self.urls_normalized += other.urls_normalized;
        self.urls_unchanged += other.urls_unchanged;
    }
}

/// Output of the transform stage
#[derive(Debug, Clone, Default)]
pub struct Transformed {
    pub records: Vec<UrlRecord>,
    pub stats: TransformStats,
}

/// Normalize every record, preserving order
pub fn transform<I>(records: I) -> Transformed
where
    I: IntoIterator,
    I::Item: Into<UrlRecord>,
{
    let mut out = Transformed::default();

    for raw in records {
        let (record, stats) = transform_record(raw.into());
        out.records.push(record);
        out.stats += stats;
    }

    let stats = &out.stats;
    info!(
        records = stats.records,
        blacklist_fields = stats.blacklist_fields,
        dates_normalized = stats.dates_normalized,
        dates_unchanged = stats.dates_unchanged,
        booleans_coerced = stats.booleans_coerced,
        urls_normalized = stats.urls_normalized,
        urls_unchanged = stats.urls_unchanged,
        "Transform complete"
    );

    out
}

/// Apply all rules to a single record
pub fn transform_record(mut record: UrlRecord) -> (UrlRecord, TransformStats) {
    let mut stats = TransformStats {
        records: 1,
        ..TransformStats::default()
    };

    stats.blacklist_fields = flatten_blacklists(&mut record);

    match normalize_date_added(&mut record) {
        Some(true) => stats.dates_normalized += 1,
        Some(false) => stats.dates_unchanged += 1,
        None => {},
    }

    stats.booleans_coerced = coerce_booleans(&mut record);

    lowercase_record_tags(&mut record);

    match normalize_record_url(&mut record) {
        Some(true) => stats.urls_normalized += 1,
        Some(false) => stats.urls_unchanged += 1,
        None => {},
    }

    (record, stats)
}

/// Returns the number of `blacklist_*` fields written.
fn flatten_blacklists(record: &mut UrlRecord) -> usize {
    let entries = match record.get(BLACKLISTS_FIELD) {
        Some(FieldValue::Json(Value::Object(entries))) => entries.clone(),
        Some(_) => {
            debug!("blacklists is not a mapping; left as-is");
            return 0;
        },
        None => return 0,
    };

    record.remove(BLACKLISTS_FIELD);
    let count = entries.len();
    for (key, value) in entries {
        record.insert(format!("{BLACKLIST_PREFIX}{key}"), value);
    }
    count
}

/// `None` when there is no string `date_added`, otherwise whether it parsed.
fn normalize_date_added(record: &mut UrlRecord) -> Option<bool> {
    let field = record.get_mut(DATE_ADDED_FIELD)?;
    let raw = field.as_str()?;

    match parse_date_added(raw) {
        FieldOutcome::Normalized(at) => {
            *field = FieldValue::DateTime(at);
            Some(true)
        },
        FieldOutcome::Unchanged => {
            debug!(value = raw, "date_added does not match the expected layout");
            Some(false)
        },
    }
}

fn coerce_booleans(record: &mut UrlRecord) -> usize {
    let mut coerced = 0;
    for value in record.values_mut() {
        let Some(flag) = value.as_str().and_then(|s| coerce_bool(s).into_option()) else {
            continue;
        };
        *value = FieldValue::Json(Value::Bool(flag));
        coerced += 1;
    }
    coerced
}

fn lowercase_record_tags(record: &mut UrlRecord) {
    if let Some(FieldValue::Json(Value::Array(tags))) = record.get_mut(TAGS_FIELD) {
        *tags = lowercase_tags(tags);
    }
}

/// `None` when there is no string `url`, otherwise whether it was rewritten.
fn normalize_record_url(record: &mut UrlRecord) -> Option<bool> {
    let field = record.get_mut(URL_FIELD)?;
    let raw = field.as_str()?;

    match normalize_url_host(raw) {
        FieldOutcome::Normalized(url) => {
            *field = FieldValue::Json(Value::String(url));
            Some(true)
        },
        FieldOutcome::Unchanged => {
            debug!(value = raw, "url could not be parsed; left as-is");
            Some(false)
        },
    }
}
