//! Contact form submission

use portico_domain::constants::API_CONTACT;
use portico_domain::{ContactRequest, ContactResponse, Result};

use crate::http::{RequestExecutor, RequestOptions};

#[derive(Debug, Clone)]
pub struct ContactApi {
    executor: RequestExecutor,
}

impl ContactApi {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    pub async fn submit(&self, request: &ContactRequest) -> Result<ContactResponse> {
        let options =
            RequestOptions::post().header("Content-Type", "application/json").json(request)?;
        self.executor.request(API_CONTACT, options).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn submit_posts_form() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/contact"))
            .and(body_json(json!({ "name": "Ana", "email": "ana@example.com", "message": "Hi" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sent": true })))
            .expect(1)
            .mount(&server)
            .await;

        let api = ContactApi::new(RequestExecutor::builder(server.uri()).build().unwrap());
        let response = api
            .submit(&ContactRequest {
                name: "Ana".into(),
                email: "ana@example.com".into(),
                message: "Hi".into(),
            })
            .await
            .unwrap();

        assert!(response.sent);
    }

    #[tokio::test]
    async fn rate_limited_submission_surfaces_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "code": "RATE_LIMITED",
                "message": "Too many messages"
            })))
            .mount(&server)
            .await;

        let api = ContactApi::new(RequestExecutor::builder(server.uri()).build().unwrap());
        let err = api
            .submit(&ContactRequest { name: "A".into(), email: "a@b.c".into(), message: "m".into() })
            .await
            .unwrap_err();

        let client = err.as_client_error().unwrap();
        assert_eq!(client.code.as_deref(), Some("RATE_LIMITED"));
        assert_eq!(client.message, "Too many messages");
    }
}
