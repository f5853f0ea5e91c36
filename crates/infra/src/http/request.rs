//! Per-call request description

use portico_domain::{PorticoError, Result};
use reqwest::Method;
use serde::Serialize;

/// Method, caller headers and optional JSON body for one call.
///
/// Headers are kept in insertion order; a later header with the same name
/// (case-insensitive) replaces an earlier one when the request is built.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    method: Method,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self { method, headers: Vec::new(), body: None }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Serialize `body` as the JSON request body.
    ///
    /// Does not add a content type; [`RequestExecutor::request_with_token`]
    /// adds one, plain requests set it themselves.
    ///
    /// [`RequestExecutor::request_with_token`]: super::RequestExecutor::request_with_token
    ///
    /// # Errors
    /// `PorticoError::InvalidInput` when `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let encoded = serde_json::to_string(body).map_err(|err| {
            PorticoError::InvalidInput(format!("request body is not serializable: {err}"))
        })?;
        self.body = Some(encoded);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    pub(crate) fn into_parts(self) -> (Method, Vec<(String, String)>, Option<String>) {
        (self.method, self.headers, self.body)
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn json_body_is_serialized_once() {
        let options = RequestOptions::post().json(&json!({ "email": "a@b.c" })).unwrap();

        assert!(options.has_body());
        let (method, headers, body) = options.into_parts();
        assert_eq!(method, Method::POST);
        assert!(headers.is_empty());
        assert_eq!(body.as_deref(), Some(r#"{"email":"a@b.c"}"#));
    }

    #[test]
    fn headers_keep_insertion_order() {
        let options = RequestOptions::get().header("X-One", "1").header("x-two", "2");

        assert_eq!(
            options.headers(),
            &[("X-One".to_string(), "1".to_string()), ("x-two".to_string(), "2".to_string())]
        );
        assert_eq!(RequestOptions::default().method(), &Method::GET);
    }
}
