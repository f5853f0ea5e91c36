//! Developer tool endpoints

use serde::{Deserialize, Serialize};

/// Body shared by the base64 endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInput {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Base64Encoded {
    pub encoded: String,
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Base64Decoded {
    pub decoded: String,
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UuidResponse {
    pub uuid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfSignedCertRequest {
    pub common_name: String,
    pub organization: String,
    pub valid_days: u32,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelfSignedCert {
    pub cert_pem: String,
    pub key_pem: String,
    pub cert_base64: String,
    pub pfx_base64: String,
    pub password: String,
}
