//! Default English string bundle
//!
//! Full message resolution lives in the frontend; the backend ships one
//! built-in bundle so rendered tables carry readable column titles and row
//! labels. Key names are part of the external contract and must not change.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static MESSAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("topsql.detail.fields.cpu_time", "CPU Time"),
        ("topsql.detail.fields.plan", "Plan"),
        ("topsql.detail.fields.exec_count_per_sec", "Executions/sec"),
        ("topsql.detail.fields.scan_records_per_sec", "Scanned Records/sec"),
        ("topsql.detail.fields.scan_indexes_per_sec", "Scanned Indexes/sec"),
        ("topsql.detail.fields.duration_per_exec_ms", "Mean Duration"),
        ("topsql.detail.overall", "Overall"),
        (
            "topsql.detail.overall_tooltip",
            "Sum of the CPU time of all plans of this SQL statement",
        ),
        ("topsql.detail.no_plan", "No Plan"),
        (
            "topsql.detail.no_plan_tooltip",
            "CPU time that could not be attributed to a specific execution plan",
        ),
    ])
});

/// Resolve a translation key, falling back to the key itself when unknown.
pub fn t(key: &str) -> &str {
    MESSAGES.get(key).copied().unwrap_or(key)
}
