use axum::{
    Json,
    extract::{Path, Query, State},
};
use std::sync::Arc;

use crate::AppState;
use crate::models::{
    AlertManagerInstance, GrafanaInstance, MetricsQueryParams, MetricsQueryResponse, PdInstance,
    StoreTopology, TidbInstance,
};
use crate::services::{OverviewConfig, OverviewContextValue};
use crate::utils::{ApiError, ApiResult};

/// The Overview handlers are plain consumers of the context slot: when no
/// provider installed a value they observe the absent sentinel and answer
/// with 404 instead of panicking.
fn require_context(state: &AppState) -> ApiResult<Arc<OverviewContextValue>> {
    state
        .overview_context
        .current()
        .ok_or_else(|| ApiError::not_found("Overview context not provided"))
}

// Get the effective Overview page configuration
#[utoipa::path(
    get,
    path = "/api/overview/config",
    responses(
        (status = 200, description = "Overview page configuration", body = OverviewConfig),
        (status = 404, description = "Overview context not provided")
    ),
    tag = "Overview"
)]
pub async fn get_overview_config(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<OverviewConfig>> {
    let context = require_context(&state)?;
    Ok(Json(context.config.clone()))
}

// List TiDB instances
#[utoipa::path(
    get,
    path = "/api/topology/tidb",
    responses(
        (status = 200, description = "List of TiDB instances", body = Vec<TidbInstance>),
        (status = 502, description = "PD unreachable")
    ),
    tag = "Topology"
)]
pub async fn get_tidb_topology(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<TidbInstance>>> {
    let context = require_context(&state)?;
    let instances = context.data_source.get_tidb_topology().await?;
    tracing::debug!("Fetched {} TiDB instances", instances.len());
    Ok(Json(instances))
}

// List storage instances (TiKV and TiFlash)
#[utoipa::path(
    get,
    path = "/api/topology/store",
    responses(
        (status = 200, description = "Storage topology split by engine", body = StoreTopology),
        (status = 502, description = "PD unreachable")
    ),
    tag = "Topology"
)]
pub async fn get_store_topology(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<StoreTopology>> {
    let context = require_context(&state)?;
    Ok(Json(context.data_source.get_store_topology().await?))
}

// List PD members
#[utoipa::path(
    get,
    path = "/api/topology/pd",
    responses(
        (status = 200, description = "List of PD members", body = Vec<PdInstance>),
        (status = 502, description = "PD unreachable")
    ),
    tag = "Topology"
)]
pub async fn get_pd_topology(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<PdInstance>>> {
    let context = require_context(&state)?;
    Ok(Json(context.data_source.get_pd_topology().await?))
}

// Get the registered Grafana endpoint, if any
#[utoipa::path(
    get,
    path = "/api/topology/grafana",
    responses(
        (status = 200, description = "Grafana endpoint or null", body = Option<GrafanaInstance>),
    ),
    tag = "Topology"
)]
pub async fn get_grafana_topology(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Option<GrafanaInstance>>> {
    let context = require_context(&state)?;
    Ok(Json(context.data_source.get_grafana_topology().await?))
}

// Get the registered Alertmanager endpoint, if any
#[utoipa::path(
    get,
    path = "/api/topology/alertmanager",
    responses(
        (status = 200, description = "Alertmanager endpoint or null", body = Option<AlertManagerInstance>),
    ),
    tag = "Topology"
)]
pub async fn get_alert_manager_topology(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Option<AlertManagerInstance>>> {
    let context = require_context(&state)?;
    Ok(Json(context.data_source.get_alert_manager_topology().await?))
}

// Count firing alerts on one Alertmanager
#[utoipa::path(
    get,
    path = "/api/topology/alertmanager/{address}/count",
    params(
        ("address" = String, Path, description = "Alertmanager address, host:port")
    ),
    responses(
        (status = 200, description = "Number of firing alerts", body = u64),
        (status = 502, description = "Alertmanager unreachable")
    ),
    tag = "Topology"
)]
pub async fn get_alert_count(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> ApiResult<Json<u64>> {
    let context = require_context(&state)?;
    Ok(Json(context.data_source.get_alert_count(&address).await?))
}

// Run a Prometheus range query
#[utoipa::path(
    get,
    path = "/api/metrics/query",
    params(
        ("start_time_sec" = i64, Query, description = "Range start, unix seconds"),
        ("end_time_sec" = i64, Query, description = "Range end, unix seconds"),
        ("step_sec" = i64, Query, description = "Resolution step, seconds"),
        ("query" = String, Query, description = "PromQL expression")
    ),
    responses(
        (status = 200, description = "Range query result", body = MetricsQueryResponse),
        (status = 400, description = "Invalid range parameters"),
        (status = 502, description = "Prometheus unreachable")
    ),
    tag = "Metrics"
)]
pub async fn metrics_query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MetricsQueryParams>,
) -> ApiResult<Json<MetricsQueryResponse>> {
    let context = require_context(&state)?;
    let response = context.data_source.metrics_query(&params).await?;
    Ok(Json(response))
}
