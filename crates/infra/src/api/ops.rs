//! Private operational telemetry

use portico_domain::constants::{
    API_PRIVATE_OPS_ALERTS, API_PRIVATE_OPS_HEALTH, API_PRIVATE_OPS_HISTORY,
    API_PRIVATE_OPS_METRICS, API_PRIVATE_OPS_SUMMARY,
};
use portico_domain::{OpsAlerts, OpsHealth, OpsHistory, OpsMetrics, OpsSummary, Result};
use serde::de::DeserializeOwned;

use crate::http::{RequestExecutor, RequestOptions};

#[derive(Debug, Clone)]
pub struct OpsApi {
    executor: RequestExecutor,
}

impl OpsApi {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    pub async fn metrics(&self, token: &str) -> Result<OpsMetrics> {
        self.get(API_PRIVATE_OPS_METRICS, token).await
    }

    pub async fn alerts(&self, token: &str) -> Result<OpsAlerts> {
        self.get(API_PRIVATE_OPS_ALERTS, token).await
    }

    pub async fn health(&self, token: &str) -> Result<OpsHealth> {
        self.get(API_PRIVATE_OPS_HEALTH, token).await
    }

    pub async fn history(&self, token: &str) -> Result<OpsHistory> {
        self.get(API_PRIVATE_OPS_HISTORY, token).await
    }

    pub async fn summary(&self, token: &str) -> Result<OpsSummary> {
        self.get(API_PRIVATE_OPS_SUMMARY, token).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T> {
        self.executor.request_with_token(path, token, RequestOptions::get()).await
    }
}
