//! Login, registration and token refresh

use async_trait::async_trait;
use portico_core::SessionRefresher;
use portico_domain::constants::{
    API_LOGIN, API_PRIVATE_ME, API_PRIVATE_REFRESH, API_REGISTER, AUTH_INCOMPLETE_MESSAGE,
};
use portico_domain::{AuthSuccess, Credentials, PorticoError, Profile, RefreshResponse, Result};
use tracing::{info, instrument};

use crate::http::{RequestExecutor, RequestOptions};

#[derive(Debug, Clone)]
pub struct AuthApi {
    executor: RequestExecutor,
}

impl AuthApi {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor }
    }

    /// # Errors
    /// The backend's error, or `PorticoError::Auth` when it answered without
    /// a token.
    #[instrument(skip_all)]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthSuccess> {
        self.authenticate(API_LOGIN, credentials).await
    }

    /// # Errors
    /// Same as [`login`](Self::login).
    #[instrument(skip_all)]
    pub async fn register(&self, credentials: &Credentials) -> Result<AuthSuccess> {
        self.authenticate(API_REGISTER, credentials).await
    }

    /// Exchange `token` for a new one.
    pub async fn refresh(&self, token: &str) -> Result<RefreshResponse> {
        self.executor.request_with_token(API_PRIVATE_REFRESH, token, RequestOptions::post()).await
    }

    pub async fn me(&self, token: &str) -> Result<Profile> {
        self.executor.request_with_token(API_PRIVATE_ME, token, RequestOptions::get()).await
    }

    async fn authenticate(&self, path: &str, credentials: &Credentials) -> Result<AuthSuccess> {
        let options =
            RequestOptions::post().header("Content-Type", "application/json").json(credentials)?;
        let success: AuthSuccess = self.executor.request(path, options).await?;

        match success.token.as_deref() {
            Some(token) if !token.is_empty() => {
                info!(path, "authenticated");
                Ok(success)
            }
            _ => Err(PorticoError::Auth(AUTH_INCOMPLETE_MESSAGE.to_string())),
        }
    }
}

#[async_trait]
impl SessionRefresher for AuthApi {
    async fn refresh(&self, token: &str) -> Result<Option<String>> {
        let response = AuthApi::refresh(self, token).await?;
        Ok(response.token.filter(|token| !token.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn api(server: &MockServer) -> AuthApi {
        AuthApi::new(RequestExecutor::builder(server.uri()).build().unwrap())
    }

    #[tokio::test]
    async fn login_posts_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "email": "ana@example.com", "password": "pw" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "jwt-1",
                "id": 7,
                "name": "Ana",
                "email": "ana@example.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let success =
            api(&server).login(&Credentials::new("ana@example.com", "pw")).await.unwrap();

        assert_eq!(success.token.as_deref(), Some("jwt-1"));
        assert_eq!(success.name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn register_without_token_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/register"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "u-1" })))
            .mount(&server)
            .await;

        let err = api(&server).register(&Credentials::new("a@b.c", "pw")).await.unwrap_err();

        assert_eq!(err, PorticoError::Auth(AUTH_INCOMPLETE_MESSAGE.to_string()));
    }

    #[tokio::test]
    async fn refresher_returns_new_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/private/refresh"))
            .and(header("authorization", "Bearer old"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "new" })))
            .expect(1)
            .mount(&server)
            .await;

        let api = api(&server);
        let refreshed = SessionRefresher::refresh(&api, "old").await.unwrap();

        assert_eq!(refreshed.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn refresher_without_token_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).mount(&server).await;

        let api = api(&server);
        assert_eq!(SessionRefresher::refresh(&api, "old").await.unwrap(), None);
    }

    #[tokio::test]
    async fn me_sends_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/private/me"))
            .and(header("authorization", "Bearer jwt-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": 1, "name": "Ana" })),
            )
            .mount(&server)
            .await;

        let profile = api(&server).me("jwt-1").await.unwrap();
        assert_eq!(profile.name.as_deref(), Some("Ana"));
    }
}
