use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tidb_console::config::Config;
use tidb_console::services::{
    ContextSlot, FileSelectionStore, HttpDataSource, OverviewConfig, OverviewContextValue,
    SelectionStore, TopSqlService,
};
use tidb_console::{AppState, handlers, models, services};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Overview
        handlers::overview::get_overview_config,
        handlers::overview::get_tidb_topology,
        handlers::overview::get_store_topology,
        handlers::overview::get_pd_topology,
        handlers::overview::get_grafana_topology,
        handlers::overview::get_alert_manager_topology,
        handlers::overview::get_alert_count,
        handlers::overview::metrics_query,
        // Top SQL
        handlers::topsql::get_detail_table,
        handlers::topsql::select_plan,
    ),
    components(
        schemas(
            models::NodeStatus,
            models::TidbInstance,
            models::StoreInstance,
            models::StoreTopology,
            models::PdInstance,
            models::GrafanaInstance,
            models::AlertManagerInstance,
            models::MetricsQueryParams,
            models::MetricsQueryResponse,
            models::InstanceType,
            models::PlanItem,
            models::SqlRecord,
            services::OverviewConfig,
            services::UiConfig,
            services::MetricQueryDef,
            services::MetricUnit,
            services::QuerySpec,
            services::TransformNullValue,
            services::TimeRangeSelectorConfig,
            services::PlanRecord,
            services::PlanRecordSet,
            services::ColumnId,
            services::DetailCell,
            services::DetailColumn,
            services::DetailRow,
            services::ListDetailTable,
            handlers::topsql::DetailTableRequest,
            handlers::topsql::SelectPlanRequest,
        )
    ),
    tags(
        (name = "Overview", description = "Overview page configuration"),
        (name = "Topology", description = "Cluster topology endpoints"),
        (name = "Metrics", description = "Prometheus range queries"),
        (name = "Top SQL", description = "Top SQL plan statistics"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Load configuration first
    let config = Config::load()?;

    // Initialize logging
    let log_filter = tracing_subscriber::EnvFilter::new(&config.logging.level);

    let registry = tracing_subscriber::registry().with(log_filter);

    // Add file logging if configured
    if let Some(log_file) = &config.logging.file {
        let log_path = std::path::Path::new(log_file);
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        let log_dir = log_path.parent().and_then(|p| p.to_str()).unwrap_or("logs");
        let file_name = log_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("meridian.log");
        // Remove .log extension if present (rolling appender adds date suffix)
        let file_prefix = file_name.strip_suffix(".log").unwrap_or(file_name);

        let file_appender = tracing_appender::rolling::daily(log_dir, file_prefix);
        let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
            .with(tracing_subscriber::fmt::layer())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
    tracing::info!("Meridian starting up");
    tracing::info!("Configuration loaded successfully");

    // Wire the Overview context: one immutable (data source, config) pair
    // provided for the lifetime of this process.
    let data_source = Arc::new(HttpDataSource::new(config.cluster.clone()));
    let overview_config = OverviewConfig {
        promql_addr_configurable: config.overview.promql_addr_configurable,
        show_view_more_metrics: config.overview.show_view_more_metrics,
        ..OverviewConfig::default()
    };

    let overview_context = Arc::new(ContextSlot::new());
    overview_context.provide(Arc::new(OverviewContextValue {
        data_source,
        config: overview_config,
    }));
    tracing::info!("Overview context provided (PD: {})", config.cluster.pd_endpoint);

    // Selection state persists across restarts in a small JSON file.
    let selection_store: Arc<dyn SelectionStore> =
        Arc::new(FileSelectionStore::load(&config.ui_state.file)?);
    let topsql_service = Arc::new(TopSqlService::new(selection_store));

    let app_state = Arc::new(AppState {
        overview_context: Arc::clone(&overview_context),
        topsql_service: Arc::clone(&topsql_service),
    });

    let api_routes = Router::new()
        // Overview
        .route("/api/overview/config", get(handlers::overview::get_overview_config))
        // Topology
        .route("/api/topology/tidb", get(handlers::overview::get_tidb_topology))
        .route("/api/topology/store", get(handlers::overview::get_store_topology))
        .route("/api/topology/pd", get(handlers::overview::get_pd_topology))
        .route("/api/topology/grafana", get(handlers::overview::get_grafana_topology))
        .route(
            "/api/topology/alertmanager",
            get(handlers::overview::get_alert_manager_topology),
        )
        .route(
            "/api/topology/alertmanager/:address/count",
            get(handlers::overview::get_alert_count),
        )
        // Metrics
        .route("/api/metrics/query", get(handlers::overview::metrics_query))
        // Top SQL
        .route("/api/topsql/detail/table", post(handlers::topsql::get_detail_table))
        .route("/api/topsql/detail/select", post(handlers::topsql::select_plan))
        .with_state(Arc::clone(&app_state));

    let health_routes = Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(ready_check));

    let app = Router::new()
        .merge(SwaggerUi::new("/api-docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_routes)
        .merge(health_routes);

    let app = app
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive());

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("API documentation available at http://{}/api-docs", addr);
    tracing::info!("Meridian is ready to serve requests");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

async fn ready_check() -> &'static str {
    "READY"
}
