//! Top SQL data models
//!
//! A `SqlRecord` is one aggregated SQL statement over the selected time
//! window; it owns zero or more `PlanItem`s, one per distinct execution plan.
//! Per-plan CPU time arrives as time-bucketed samples in milliseconds; the
//! rate fields are already normalized per second by the collector.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which component the record was collected from. Determines the applicable
/// rate-metric columns: scan rates exist on tikv, per-exec latency on tidb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InstanceType {
    Tidb,
    Tikv,
}

/// One execution plan of a SQL statement.
///
/// `plan_digest` may be absent or empty, meaning the collector could not
/// attribute the samples to a concrete plan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct PlanItem {
    #[serde(default)]
    pub plan_digest: Option<String>,
    #[serde(default)]
    pub plan_text: Option<String>,
    /// Per-time-bucket CPU time samples, milliseconds.
    #[serde(default)]
    pub cpu_time_ms: Option<Vec<u64>>,
    #[serde(default)]
    pub exec_count_per_sec: Option<f64>,
    #[serde(default)]
    pub scan_records_per_sec: Option<f64>,
    #[serde(default)]
    pub scan_indexes_per_sec: Option<f64>,
    #[serde(default)]
    pub duration_per_exec_ms: Option<f64>,
}

impl PlanItem {
    /// Total CPU time across all buckets; an absent array sums to 0.
    pub fn total_cpu_time_ms(&self) -> u64 {
        self.cpu_time_ms
            .as_ref()
            .map(|samples| samples.iter().sum())
            .unwrap_or(0)
    }

    /// True when the plan digest is absent or empty.
    pub fn has_no_digest(&self) -> bool {
        self.plan_digest.as_deref().map_or(true, str::is_empty)
    }
}

/// One aggregated SQL statement with its plans.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct SqlRecord {
    #[serde(default)]
    pub sql_digest: String,
    #[serde(default)]
    pub sql_text: Option<String>,
    /// Catch-all bucket aggregating statements below the top-N cut.
    #[serde(default)]
    pub is_other: bool,
    #[serde(default)]
    pub plans: Vec<PlanItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_cpu_time_sums_buckets() {
        let plan = PlanItem {
            cpu_time_ms: Some(vec![1, 2, 3]),
            ..Default::default()
        };
        assert_eq!(plan.total_cpu_time_ms(), 6);
    }

    #[test]
    fn test_total_cpu_time_absent_array_is_zero() {
        assert_eq!(PlanItem::default().total_cpu_time_ms(), 0);
    }

    #[test]
    fn test_has_no_digest() {
        assert!(PlanItem::default().has_no_digest());
        let empty = PlanItem { plan_digest: Some(String::new()), ..Default::default() };
        assert!(empty.has_no_digest());
        let real = PlanItem { plan_digest: Some("d1".to_string()), ..Default::default() };
        assert!(!real.has_no_digest());
    }

    #[test]
    fn test_record_deserializes_with_missing_fields() {
        let record: SqlRecord =
            serde_json::from_str(r#"{"sql_digest":"abc","plans":[{}]}"#).unwrap();
        assert_eq!(record.sql_digest, "abc");
        assert!(!record.is_other);
        assert_eq!(record.plans.len(), 1);
        assert_eq!(record.plans[0].total_cpu_time_ms(), 0);
    }
}
