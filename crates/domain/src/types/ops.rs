//! Operational telemetry exposed by the private ops endpoints

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Ok,
    Warn,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationScope {
    Window,
    Total,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpsWindow {
    pub seconds: u64,
    pub requests: u64,
    pub errors5xx: u64,
    pub auth_failures: u64,
    pub error_rate: f64,
    pub auth_fail_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpsMetrics {
    pub started_at_unix: i64,
    pub requests_total: u64,
    pub errors5xx: u64,
    pub auth_failures: u64,
    pub error_rate: f64,
    pub auth_fail_rate: f64,
    pub window: OpsWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertThresholds {
    pub min_requests: u64,
    pub warn5xx_rate: f64,
    pub critical5xx_rate: f64,
    pub warn_auth_fail_rate: f64,
    pub critical_auth_fail_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpsAlerts {
    pub level: AlertLevel,
    pub reasons: Vec<String>,
    pub evaluation_scope: EvaluationScope,
    pub thresholds: AlertThresholds,
    pub snapshot: OpsMetrics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpsHealth {
    pub status: AlertLevel,
    pub generated_at_unix: i64,
    pub alerts: OpsAlerts,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpsHistoryItem {
    pub timestamp_unix: i64,
    pub status: AlertLevel,
    pub scope: EvaluationScope,
    pub requests_total: u64,
    pub window_requests: u64,
    pub error_rate: f64,
    pub auth_fail_rate: f64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpsHistory {
    pub items: Vec<OpsHistoryItem>,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleWindow {
    pub size: u64,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDistribution {
    pub ok: u64,
    pub warn: u64,
    pub critical: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateAverages {
    pub error_rate: f64,
    pub auth_fail_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpsSummary {
    pub status: AlertLevel,
    pub samples: SampleWindow,
    pub distribution: LevelDistribution,
    pub averages: RateAverages,
    pub current_health: OpsHealth,
}
