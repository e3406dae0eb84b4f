pub mod cluster_client;
pub mod context;
pub mod topsql;

pub use cluster_client::HttpDataSource;
pub use context::{
    ContextSlot, DataSource, MetricQueryDef, MetricUnit, OverviewConfig, OverviewContextValue,
    QuerySpec, TimeRange, TimeRangeSelectorConfig, TransformNullValue, UiConfig,
};
pub use topsql::{
    ColumnId, DetailCell, DetailColumn, DetailRow, FileSelectionStore, LIST_DETAIL_SELECTED_KEY,
    ListDetailTable, MemorySelectionStore, PlanRecord, PlanRecordSet, SelectionStore,
    TopSqlService, derive_plan_records,
};
