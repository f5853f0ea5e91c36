//! Portfolio experiences

use portico_common::{Clock, SystemClock};
use portico_core::PublicCache;
use portico_domain::constants::{API_EXPERIENCES, API_PRIVATE_EXPERIENCES, PUBLIC_EXPERIENCES_CACHE_KEY};
use portico_domain::{DeleteResult, Experience, ExperiencePayload, Result};

use super::listing::{PublicListing, Resource};
use crate::http::RequestExecutor;

const EXPERIENCES: Resource = Resource {
    public_path: API_EXPERIENCES,
    private_path: API_PRIVATE_EXPERIENCES,
    cache_key: PUBLIC_EXPERIENCES_CACHE_KEY,
};

#[derive(Debug, Clone)]
pub struct ExperiencesApi<C: Clock = SystemClock> {
    listing: PublicListing<C>,
}

impl<C: Clock> ExperiencesApi<C> {
    pub fn new(executor: RequestExecutor, cache: PublicCache<C>) -> Self {
        Self { listing: PublicListing::new(executor, cache, EXPERIENCES) }
    }

    /// Public listing, served from the public cache for the configured TTL.
    pub async fn list_public(&self) -> Result<Vec<Experience>> {
        self.listing.list_public().await
    }

    pub async fn list_private(&self, token: &str) -> Result<Vec<Experience>> {
        self.listing.list_private(token).await
    }

    pub async fn create(&self, token: &str, payload: &ExperiencePayload) -> Result<Experience> {
        self.listing.create(token, payload).await
    }

    pub async fn update(&self, token: &str, id: &str, payload: &ExperiencePayload) -> Result<Experience> {
        self.listing.update(token, id, payload).await
    }

    pub async fn delete(&self, token: &str, id: &str) -> Result<DeleteResult> {
        self.listing.delete(token, id).await
    }

    pub async fn clear_public_cache(&self) {
        self.listing.invalidate().await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use portico_common::MemoryStore;
    use portico_core::CacheSettings;
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn experience(id: &str, title: &str) -> Value {
        json!({
            "id": id,
            "title": title,
            "summary": "summary",
            "body": "<p>body</p>",
            "imageUrls": [],
            "tags": ["rust"],
            "visibility": "public",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        })
    }

    fn api(server: &MockServer) -> ExperiencesApi {
        let executor = RequestExecutor::builder(server.uri()).build().unwrap();
        let cache = PublicCache::new(Arc::new(MemoryStore::new()), CacheSettings::default());
        ExperiencesApi::new(executor, cache)
    }

    #[tokio::test]
    async fn public_listing_is_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/experiences"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "items": [experience("e1", "Lead")] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = api(&server);
        let first = api.list_public().await.unwrap();
        let second = api.list_public().await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn delete_invalidates_public_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/experiences"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/private/experiences/e1"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "deleted": true, "id": "e1" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let api = api(&server);
        api.list_public().await.unwrap();
        let result = api.delete("tok", "e1").await.unwrap();
        api.list_public().await.unwrap();

        assert_eq!(result, DeleteResult { deleted: true, id: "e1".into() });
    }

    #[tokio::test]
    async fn update_puts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/private/experiences/e1"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(experience("e1", "Staff")))
            .expect(1)
            .mount(&server)
            .await;

        let payload = ExperiencePayload { title: "Staff".into(), ..Default::default() };
        let updated = api(&server).update("tok", "e1", &payload).await.unwrap();

        assert_eq!(updated.title, "Staff");
    }

    #[tokio::test]
    async fn failed_mutation_keeps_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/experiences"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "message": "invalid" })))
            .mount(&server)
            .await;

        let api = api(&server);
        api.list_public().await.unwrap();
        let err = api.create("tok", &ExperiencePayload::default()).await.unwrap_err();
        api.list_public().await.unwrap();

        assert_eq!(err.as_client_error().map(|e| e.status), Some(422));
    }

    #[tokio::test]
    async fn cleared_public_cache_refetches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/experiences"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .expect(2)
            .mount(&server)
            .await;

        let api = api(&server);
        api.list_public().await.unwrap();
        api.clear_public_cache().await;
        api.list_public().await.unwrap();
    }
}
