//! Request executor
//!
//! Every backend call goes through [`RequestExecutor`]: one attempt, no
//! retries. Response bodies are read as text and parsed leniently, non-2xx
//! statuses become [`ClientError`]s, and a 401 is published on the session
//! signal before the error is returned.

use std::time::Duration;

use portico_common::{AuthEvent, SessionSignal};
use portico_domain::constants::{DEFAULT_ERROR_MESSAGE, REQUEST_ID_HEADER};
use portico_domain::{ClientError, PorticoError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client as ReqwestClient, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};
use url::Url;

use super::request::RequestOptions;
use crate::errors::InfraError;

/// HTTP executor bound to one backend origin.
#[derive(Clone)]
pub struct RequestExecutor {
    client: ReqwestClient,
    base_url: String,
    signal: Option<SessionSignal>,
}

impl RequestExecutor {
    /// Start building an executor for `base_url`.
    pub fn builder(base_url: impl Into<String>) -> RequestExecutorBuilder {
        RequestExecutorBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn signal(&self) -> Option<&SessionSignal> {
        self.signal.as_ref()
    }

    /// Perform `options` against `base_url + path` and decode the JSON body.
    ///
    /// # Errors
    /// - `PorticoError::Api` for a non-2xx status
    /// - `PorticoError::Network` when no response was received
    /// - `PorticoError::Decode` when a 2xx body does not fit `T`
    /// - `PorticoError::InvalidInput` for an unusable header
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let (method, caller_headers, body) = options.into_parts();
        let mut headers = HeaderMap::new();
        merge_headers(&mut headers, &caller_headers)?;

        let payload = self.execute(path, method, headers, body).await?;
        decode(path, payload)
    }

    /// Like [`request`](Self::request) with `Authorization: Bearer <token>`.
    ///
    /// `Content-Type: application/json` is added when a body is present.
    /// Caller headers win over both.
    ///
    /// # Errors
    /// Same as [`request`](Self::request).
    pub async fn request_with_token<T: DeserializeOwned>(
        &self,
        path: &str,
        token: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let (method, caller_headers, body) = options.into_parts();
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| PorticoError::InvalidInput("bearer token is not a valid header".into()))?;
        headers.insert(AUTHORIZATION, bearer);
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        merge_headers(&mut headers, &caller_headers)?;

        let payload = self.execute(path, method, headers, body).await?;
        decode(path, payload)
    }

    #[instrument(skip_all, fields(method = %method, path = %path))]
    async fn execute(
        &self,
        path: &str,
        method: reqwest::Method,
        headers: HeaderMap,
        body: Option<String>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.client.request(method.clone(), &url).headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        debug!(%method, %url, "sending HTTP request");
        let response = builder.send().await.map_err(|err| {
            debug!(%method, %url, error = %err, "HTTP request failed");
            PorticoError::from(InfraError::from(err))
        })?;

        let status = response.status();
        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        debug!(%method, %url, %status, "received HTTP response");

        let text = response.text().await.map_err(|err| PorticoError::from(InfraError::from(err)))?;
        let payload = safe_json(&text);

        if status.is_success() {
            return Ok(payload);
        }

        if status == StatusCode::UNAUTHORIZED {
            if let Some(signal) = &self.signal {
                signal.emit(AuthEvent::Expired);
            }
        }

        let error = client_error(status, &payload, request_id);
        warn!(
            %method,
            %url,
            status = error.status,
            code = error.code.as_deref().unwrap_or(""),
            request_id = error.request_id.as_deref().unwrap_or(""),
            "backend returned an error"
        );
        Err(PorticoError::Api(error))
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("base_url", &self.base_url)
            .field("publishes_signal", &self.signal.is_some())
            .finish()
    }
}

/// Builder for [`RequestExecutor`].
#[derive(Debug)]
pub struct RequestExecutorBuilder {
    base_url: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    default_headers: Option<HeaderMap>,
    signal: Option<SessionSignal>,
}

impl RequestExecutorBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: None,
            user_agent: None,
            default_headers: None,
            signal: None,
        }
    }

    /// Whole-request timeout. Unset means none.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    /// Publish 401 responses on `signal`.
    pub fn signal(mut self, signal: SessionSignal) -> Self {
        self.signal = Some(signal);
        self
    }

    /// # Errors
    /// `PorticoError::Config` for an unparsable base URL or client settings
    /// reqwest rejects.
    pub fn build(self) -> Result<RequestExecutor> {
        Url::parse(&self.base_url).map_err(|err| {
            PorticoError::Config(format!("Invalid API base URL '{}': {err}", self.base_url))
        })?;

        let mut builder = ReqwestClient::builder().no_proxy();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(agent) = self.user_agent {
            builder = builder.user_agent(agent);
        }

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder
            .build()
            .map_err(|err| PorticoError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(RequestExecutor {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            signal: self.signal,
        })
    }
}

fn merge_headers(headers: &mut HeaderMap, caller: &[(String, String)]) -> Result<()> {
    for (name, value) in caller {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| PorticoError::InvalidInput(format!("invalid header name '{name}'")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| PorticoError::InvalidInput(format!("invalid value for header '{name}'")))?;
        headers.insert(name, value);
    }
    Ok(())
}

/// Empty or non-JSON bodies read as `{}`.
fn safe_json(text: &str) -> Value {
    if text.is_empty() {
        return Value::Object(Map::new());
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::Object(Map::new()))
}

fn client_error(status: StatusCode, payload: &Value, request_id: Option<String>) -> ClientError {
    let message = payload
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .unwrap_or(DEFAULT_ERROR_MESSAGE);

    let mut error = ClientError::new(status.as_u16()).with_message(message);
    if let Some(code) = payload.get("code").and_then(Value::as_str) {
        error = error.with_code(code);
    }
    if let Some(details) = payload.get("details").filter(|details| !details.is_null()) {
        error = error.with_details(details.clone());
    }
    if let Some(request_id) = request_id {
        error = error.with_request_id(request_id);
    }
    error
}

fn decode<T: DeserializeOwned>(path: &str, payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(|err| {
        PorticoError::Decode(format!("unexpected response shape from {path}: {err}"))
    })
}
