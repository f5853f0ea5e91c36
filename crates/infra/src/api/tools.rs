//! Developer tool endpoints

use portico_domain::constants::{
    API_TOOLS_BASE64_DECODE, API_TOOLS_BASE64_ENCODE, API_TOOLS_CERTS_SELF_SIGNED,
    API_TOOLS_UUID_V4,
};
use portico_domain::{
    Base64Decoded, Base64Encoded, Result, SelfSignedCert, SelfSignedCertRequest, ToolInput,
    UuidResponse,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::http::{RequestExecutor, RequestOptions};

#[derive(Debug, Clone)]
pub struct ToolsApi {
    executor: RequestExecutor,
}

impl ToolsApi {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    pub async fn encode_base64(&self, value: impl Into<String>) -> Result<Base64Encoded> {
        self.post(API_TOOLS_BASE64_ENCODE, &ToolInput { value: value.into() }).await
    }

    pub async fn decode_base64(&self, value: impl Into<String>) -> Result<Base64Decoded> {
        self.post(API_TOOLS_BASE64_DECODE, &ToolInput { value: value.into() }).await
    }

    pub async fn uuid_v4(&self) -> Result<UuidResponse> {
        self.executor
            .request(
                API_TOOLS_UUID_V4,
                RequestOptions::get().header("Content-Type", "application/json"),
            )
            .await
    }

    pub async fn self_signed_cert(&self, request: &SelfSignedCertRequest) -> Result<SelfSignedCert> {
        self.post(API_TOOLS_CERTS_SELF_SIGNED, request).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let options = RequestOptions::post().header("Content-Type", "application/json").json(body)?;
        self.executor.request(path, options).await
    }
}
