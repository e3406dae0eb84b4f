pub mod topology;
pub mod topsql;

pub use topology::{
    AlertManagerInstance, GrafanaInstance, MetricsQueryParams, MetricsQueryResponse, NodeStatus,
    PdInstance, StoreInstance, StoreTopology, TidbInstance,
};
pub use topsql::{InstanceType, PlanItem, SqlRecord};
