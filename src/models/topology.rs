//! Cluster topology and metrics query models
//!
//! These are the response shapes of the Overview data-source operations. The
//! wire shapes follow the PD / ng-monitoring HTTP APIs; the console itself
//! adds nothing on top.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Liveness of a single cluster member as reported by PD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Up,
    Down,
    Offline,
    Unreachable,
}

/// One TiDB server instance.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TidbInstance {
    pub ip: String,
    pub port: u16,
    pub status_port: u16,
    pub version: String,
    pub status: NodeStatus,
}

/// One storage instance (TiKV or TiFlash).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoreInstance {
    pub ip: String,
    pub port: u16,
    pub version: String,
    pub status: NodeStatus,
    /// Store labels as reported by PD; TiFlash carries `engine=tiflash`.
    #[serde(default)]
    pub labels: std::collections::HashMap<String, String>,
}

/// Storage topology split by engine.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StoreTopology {
    pub tikv: Vec<StoreInstance>,
    pub tiflash: Vec<StoreInstance>,
}

/// One PD member.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PdInstance {
    pub ip: String,
    pub port: u16,
    pub version: String,
    pub status: NodeStatus,
}

/// Grafana endpoint registered in etcd, if any.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GrafanaInstance {
    pub ip: String,
    pub port: u16,
}

/// Alertmanager endpoint registered in etcd, if any.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AlertManagerInstance {
    pub ip: String,
    pub port: u16,
}

impl AlertManagerInstance {
    /// Address string used for the alert-count lookup.
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

/// Parameters of a Prometheus range query.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct MetricsQueryParams {
    pub start_time_sec: i64,
    pub end_time_sec: i64,
    pub step_sec: i64,
    pub query: String,
}

/// Prometheus range-query response, passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetricsQueryResponse {
    pub status: String,
    pub data: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_manager_address() {
        let am = AlertManagerInstance { ip: "10.0.1.8".to_string(), port: 9093 };
        assert_eq!(am.address(), "10.0.1.8:9093");
    }

    #[test]
    fn test_node_status_serde_lowercase() {
        assert_eq!(serde_json::to_string(&NodeStatus::Up).unwrap(), "\"up\"");
        let s: NodeStatus = serde_json::from_str("\"down\"").unwrap();
        assert_eq!(s, NodeStatus::Down);
    }
}
