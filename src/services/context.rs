//! Overview context: data-source contract and page configuration
//!
//! The Overview page receives exactly one immutable pair of (data source,
//! config) for its lifetime. `ContextSlot` is the provider side; consumers
//! read the current value and get `None` when nothing has been provided.
//! This module performs no network I/O and no validation of the config's
//! internal consistency; both are the producer's responsibility.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{
    AlertManagerInstance, GrafanaInstance, MetricsQueryParams, MetricsQueryResponse, PdInstance,
    StoreTopology, TidbInstance,
};
use crate::utils::ApiResult;

/// Capability contract of the Overview page: topology lookups plus a
/// Prometheus range query. Implementations own the transport.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn get_tidb_topology(&self) -> ApiResult<Vec<TidbInstance>>;

    async fn get_store_topology(&self) -> ApiResult<StoreTopology>;

    async fn get_pd_topology(&self) -> ApiResult<Vec<PdInstance>>;

    async fn get_grafana_topology(&self) -> ApiResult<Option<GrafanaInstance>>;

    async fn get_alert_manager_topology(&self) -> ApiResult<Option<AlertManagerInstance>>;

    /// Number of firing alerts on the given Alertmanager address.
    async fn get_alert_count(&self, address: &str) -> ApiResult<u64>;

    async fn metrics_query(&self, params: &MetricsQueryParams)
        -> ApiResult<MetricsQueryResponse>;
}

/// How a metric series treats null sample points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransformNullValue {
    /// Nulls become 0 (counters that stop reporting).
    AsZero,
    /// Nulls stay null (gauges where a gap is meaningful).
    #[default]
    Keep,
}

/// One PromQL expression within a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct QuerySpec {
    pub promql: String,
    /// Legend template, e.g. `"{instance}"`.
    pub name: String,
}

/// Unit applied to a chart's Y axis and tooltips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MetricUnit {
    Short,
    None,
    Ms,
    Bytes,
    Percent,
}

/// One named chart on the Overview metrics strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MetricQueryDef {
    pub title: String,
    pub queries: Vec<QuerySpec>,
    pub unit: MetricUnit,
    #[serde(default)]
    pub null_value: TransformNullValue,
}

/// Selectable recent-duration presets for the time-range picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimeRangeSelectorConfig {
    /// Offered "last N seconds" choices, ascending.
    pub recent_seconds: Vec<u32>,
    /// Whether an absolute from/to picker is also offered.
    pub custom_absolute_range: bool,
}

impl TimeRangeSelectorConfig {
    /// Whether a time range is expressible under this policy.
    pub fn allows(&self, range: &TimeRange) -> bool {
        match range {
            TimeRange::Recent { seconds } => self.recent_seconds.contains(seconds),
            TimeRange::Absolute { .. } => self.custom_absolute_range,
        }
    }
}

/// A query window as picked in the time-range selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimeRange {
    /// The trailing N seconds, resolved against "now" at query time.
    Recent { seconds: u32 },
    /// A fixed absolute window.
    Absolute {
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },
}

impl TimeRange {
    /// Resolve to unix-second bounds for a metrics range query.
    pub fn to_epoch_range(&self) -> (i64, i64) {
        match self {
            TimeRange::Recent { seconds } => {
                let end = chrono::Utc::now();
                let start = end - chrono::Duration::seconds(i64::from(*seconds));
                (start.timestamp(), end.timestamp())
            },
            TimeRange::Absolute { start, end } => (start.timestamp(), end.timestamp()),
        }
    }
}

/// Generic UI context configuration shared by every page of the console.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
pub struct UiConfig {
    #[serde(default)]
    pub cluster_name: String,
    /// Minutes east of UTC used when rendering absolute timestamps.
    #[serde(default)]
    pub timezone_offset_min: i32,
    #[serde(default)]
    pub public_path_prefix: String,
}

/// Configuration of the Overview page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OverviewConfig {
    #[serde(default)]
    pub ui: UiConfig,
    pub metrics_queries: Vec<MetricQueryDef>,
    #[serde(default)]
    pub promql_addr_configurable: bool,
    #[serde(default)]
    pub time_range_selector: Option<TimeRangeSelectorConfig>,
    #[serde(default)]
    pub show_view_more_metrics: bool,
}

impl Default for OverviewConfig {
    fn default() -> Self {
        Self {
            ui: UiConfig::default(),
            metrics_queries: Self::default_queries(),
            promql_addr_configurable: false,
            time_range_selector: Some(TimeRangeSelectorConfig {
                recent_seconds: vec![300, 900, 1800, 3600, 21600, 86400, 259200],
                custom_absolute_range: true,
            }),
            show_view_more_metrics: true,
        }
    }
}

impl OverviewConfig {
    /// Built-in chart catalogue for the Overview metrics strip.
    pub fn default_queries() -> Vec<MetricQueryDef> {
        vec![
            MetricQueryDef {
                title: "Queries Per Second".to_string(),
                queries: vec![QuerySpec {
                    promql: "sum(rate(tidb_executor_statement_total[$__rate_interval]))"
                        .to_string(),
                    name: "total".to_string(),
                }],
                unit: MetricUnit::Short,
                null_value: TransformNullValue::AsZero,
            },
            MetricQueryDef {
                title: "Latency".to_string(),
                queries: vec![
                    QuerySpec {
                        promql: "histogram_quantile(0.99, sum(rate(tidb_server_handle_query_duration_seconds_bucket[$__rate_interval])) by (le))".to_string(),
                        name: "99%".to_string(),
                    },
                    QuerySpec {
                        promql: "histogram_quantile(0.9, sum(rate(tidb_server_handle_query_duration_seconds_bucket[$__rate_interval])) by (le))".to_string(),
                        name: "90%".to_string(),
                    },
                ],
                unit: MetricUnit::Ms,
                null_value: TransformNullValue::Keep,
            },
            MetricQueryDef {
                title: "CPU Usage".to_string(),
                queries: vec![QuerySpec {
                    promql: "rate(process_cpu_seconds_total{job=~\"tidb|tikv\"}[$__rate_interval])"
                        .to_string(),
                    name: "{instance}".to_string(),
                }],
                unit: MetricUnit::Percent,
                null_value: TransformNullValue::Keep,
            },
            MetricQueryDef {
                title: "Memory".to_string(),
                queries: vec![QuerySpec {
                    promql: "process_resident_memory_bytes{job=~\"tidb|tikv\"}".to_string(),
                    name: "{instance}".to_string(),
                }],
                unit: MetricUnit::Bytes,
                null_value: TransformNullValue::Keep,
            },
            MetricQueryDef {
                title: "IO MBps".to_string(),
                queries: vec![QuerySpec {
                    promql: "sum(rate(tikv_engine_flow_bytes[$__rate_interval])) by (instance)"
                        .to_string(),
                    name: "{instance}".to_string(),
                }],
                unit: MetricUnit::Bytes,
                null_value: TransformNullValue::AsZero,
            },
        ]
    }
}

/// The single shared value distributed to the Overview subtree.
pub struct OverviewContextValue {
    pub data_source: Arc<dyn DataSource>,
    pub config: OverviewConfig,
}

/// Provider slot for the Overview context.
///
/// One writer (whoever wires the application together), many readers. A
/// reader outside any provided scope observes `None` and must degrade
/// gracefully rather than fail.
#[derive(Default)]
pub struct ContextSlot {
    value: RwLock<Option<Arc<OverviewContextValue>>>,
}

impl ContextSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a context value, replacing any previous one.
    pub fn provide(&self, value: Arc<OverviewContextValue>) {
        *self.value.write().expect("context slot lock poisoned") = Some(value);
    }

    /// Remove the current value; subsequent reads observe the absent sentinel.
    pub fn clear(&self) {
        *self.value.write().expect("context slot lock poisoned") = None;
    }

    /// Current context value, or `None` when not provided.
    pub fn current(&self) -> Option<Arc<OverviewContextValue>> {
        self.value.read().expect("context slot lock poisoned").clone()
    }
}
