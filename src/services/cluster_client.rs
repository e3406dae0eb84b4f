//! HTTP-backed implementation of the Overview data source
//!
//! Topology comes from the PD API, metrics from the Prometheus range-query
//! API, alert counts from Alertmanager. Each operation is a single request;
//! retries and caching are left to callers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::ClusterConfig;
use crate::models::{
    AlertManagerInstance, GrafanaInstance, MetricsQueryParams, MetricsQueryResponse, NodeStatus,
    PdInstance, StoreInstance, StoreTopology, TidbInstance,
};
use crate::services::DataSource;
use crate::utils::{ApiError, ApiResult};

pub struct HttpDataSource {
    http_client: Client,
    cluster: ClusterConfig,
}

impl HttpDataSource {
    pub fn new(cluster: ClusterConfig) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(cluster.request_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::error!("Failed to build HTTP client: {}. Falling back to defaults.", e);
                Client::default()
            });

        Self { http_client, cluster }
    }

    fn pd_url(&self, path: &str) -> String {
        format!("{}{}", self.cluster.pd_endpoint.trim_end_matches('/'), path)
    }

    fn prometheus_url(&self, path: &str) -> String {
        format!("{}{}", self.cluster.prometheus_endpoint.trim_end_matches('/'), path)
    }

    async fn get_json(&self, url: &str) -> ApiResult<Value> {
        let response = self.http_client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::upstream(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }
        Ok(response.json().await?)
    }

    fn parse_address(address: &str) -> Option<(String, u16)> {
        let trimmed = address
            .trim_start_matches("http://")
            .trim_start_matches("https://");
        let (ip, port) = trimmed.rsplit_once(':')?;
        Some((ip.to_string(), port.parse().ok()?))
    }

    fn parse_store(store: &Value) -> Option<StoreInstance> {
        let meta = store.get("store")?;
        let (ip, port) = Self::parse_address(meta.get("address")?.as_str()?)?;
        let status = match store
            .get("store")
            .and_then(|s| s.get("state_name"))
            .and_then(Value::as_str)
            .unwrap_or("")
        {
            "Up" => NodeStatus::Up,
            "Offline" => NodeStatus::Offline,
            "Down" => NodeStatus::Down,
            _ => NodeStatus::Unreachable,
        };
        let labels = meta
            .get("labels")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|l| {
                        Some((
                            l.get("key")?.as_str()?.to_string(),
                            l.get("value")?.as_str()?.to_string(),
                        ))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(StoreInstance {
            ip,
            port,
            version: meta
                .get("version")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            status,
            labels,
        })
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn get_tidb_topology(&self) -> ApiResult<Vec<TidbInstance>> {
        // TiDB servers register themselves in etcd under /topology/tidb;
        // PD exposes the merged view.
        let body = self.get_json(&self.pd_url("/topology/tidb")).await?;
        let mut instances = Vec::new();
        for node in body.as_array().into_iter().flatten() {
            let Some((ip, port)) = node
                .get("address")
                .and_then(Value::as_str)
                .and_then(Self::parse_address)
            else {
                tracing::warn!("Skipping TiDB topology entry without a parsable address");
                continue;
            };
            instances.push(TidbInstance {
                ip,
                port,
                status_port: node
                    .get("status_port")
                    .and_then(Value::as_u64)
                    .unwrap_or(10080) as u16,
                version: node
                    .get("version")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
                status: if node.get("alive").and_then(Value::as_bool).unwrap_or(false) {
                    NodeStatus::Up
                } else {
                    NodeStatus::Down
                },
            });
        }
        tracing::debug!("Fetched {} TiDB instances", instances.len());
        Ok(instances)
    }

    async fn get_store_topology(&self) -> ApiResult<StoreTopology> {
        let body = self.get_json(&self.pd_url("/pd/api/v1/stores")).await?;
        let mut tikv = Vec::new();
        let mut tiflash = Vec::new();
        for store in body
            .get("stores")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let Some(instance) = Self::parse_store(store) else {
                tracing::warn!("Skipping store entry without a parsable address");
                continue;
            };
            if instance.labels.get("engine").map(String::as_str) == Some("tiflash") {
                tiflash.push(instance);
            } else {
                tikv.push(instance);
            }
        }
        Ok(StoreTopology { tikv, tiflash })
    }

    async fn get_pd_topology(&self) -> ApiResult<Vec<PdInstance>> {
        let body = self.get_json(&self.pd_url("/pd/api/v1/members")).await?;
        let mut members = Vec::new();
        for member in body
            .get("members")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let address = member
                .get("client_urls")
                .and_then(Value::as_array)
                .and_then(|urls| urls.first())
                .and_then(Value::as_str)
                .unwrap_or("");
            let Some((ip, port)) = Self::parse_address(address) else {
                tracing::warn!("Skipping PD member without a parsable client URL");
                continue;
            };
            members.push(PdInstance {
                ip,
                port,
                version: member
                    .get("binary_version")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
                // The members endpoint only lists reachable members.
                status: NodeStatus::Up,
            });
        }
        Ok(members)
    }

    async fn get_grafana_topology(&self) -> ApiResult<Option<GrafanaInstance>> {
        let body = self.get_json(&self.pd_url("/topology/grafana")).await?;
        Ok(body
            .get("address")
            .and_then(Value::as_str)
            .and_then(Self::parse_address)
            .map(|(ip, port)| GrafanaInstance { ip, port }))
    }

    async fn get_alert_manager_topology(&self) -> ApiResult<Option<AlertManagerInstance>> {
        let body = self.get_json(&self.pd_url("/topology/alertmanager")).await?;
        Ok(body
            .get("address")
            .and_then(Value::as_str)
            .and_then(Self::parse_address)
            .map(|(ip, port)| AlertManagerInstance { ip, port }))
    }

    async fn get_alert_count(&self, address: &str) -> ApiResult<u64> {
        let url = format!("http://{}/api/v2/alerts?active=true", address);
        let body = self.get_json(&url).await?;
        Ok(body.as_array().map(|alerts| alerts.len() as u64).unwrap_or(0))
    }

    async fn metrics_query(
        &self,
        params: &MetricsQueryParams,
    ) -> ApiResult<MetricsQueryResponse> {
        if params.step_sec <= 0 {
            return Err(ApiError::bad_request("step_sec must be positive"));
        }
        if params.end_time_sec < params.start_time_sec {
            return Err(ApiError::bad_request("end_time_sec precedes start_time_sec"));
        }

        let url = self.prometheus_url("/api/v1/query_range");
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("query", params.query.as_str()),
                ("start", &params.start_time_sec.to_string()),
                ("end", &params.end_time_sec.to_string()),
                ("step", &params.step_sec.to_string()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::upstream(format!(
                "Prometheus range query returned {}",
                response.status()
            )));
        }
        let body: Value = response.json().await?;
        Ok(MetricsQueryResponse {
            status: body
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("error")
                .to_string(),
            data: body.get("data").cloned().unwrap_or(Value::Null),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address_variants() {
        assert_eq!(
            HttpDataSource::parse_address("10.0.1.5:4000"),
            Some(("10.0.1.5".to_string(), 4000))
        );
        assert_eq!(
            HttpDataSource::parse_address("http://pd-0:2379"),
            Some(("pd-0".to_string(), 2379))
        );
        assert_eq!(HttpDataSource::parse_address("no-port"), None);
        assert_eq!(HttpDataSource::parse_address("bad:port"), None);
    }

    #[test]
    fn test_parse_store_splits_tiflash_by_label() {
        let store: Value = serde_json::json!({
            "store": {
                "address": "10.0.1.7:3930",
                "version": "7.5.0",
                "state_name": "Up",
                "labels": [{"key": "engine", "value": "tiflash"}]
            }
        });
        let parsed = HttpDataSource::parse_store(&store).unwrap();
        assert_eq!(parsed.labels.get("engine").map(String::as_str), Some("tiflash"));
        assert_eq!(parsed.status, NodeStatus::Up);
        assert_eq!(parsed.port, 3930);
    }
}
