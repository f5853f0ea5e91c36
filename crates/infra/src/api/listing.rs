//! Cached public listing with private CRUD
//!
//! Shared by the content facades: the public listing is served through the
//! public cache under the configured TTL, and every successful mutation on
//! the private path invalidates that listing.

use portico_common::{Clock, SystemClock};
use portico_core::{CacheOptions, PublicCache};
use portico_domain::{DeleteResult, Items, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::http::{RequestExecutor, RequestOptions};

/// Paths and cache key of one content resource.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Resource {
    pub public_path: &'static str,
    pub private_path: &'static str,
    pub cache_key: &'static str,
}

#[derive(Debug, Clone)]
pub(crate) struct PublicListing<C: Clock = SystemClock> {
    executor: RequestExecutor,
    cache: PublicCache<C>,
    resource: Resource,
}

impl<C: Clock> PublicListing<C> {
    pub fn new(executor: RequestExecutor, cache: PublicCache<C>, resource: Resource) -> Self {
        Self { executor, cache, resource }
    }

    pub async fn list_public<T>(&self) -> Result<Vec<T>>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
    {
        let executor = self.executor.clone();
        let path = self.resource.public_path;
        let listing: Items<T> = self
            .cache
            .get(
                self.resource.cache_key,
                move || async move { executor.request(path, RequestOptions::get()).await },
                CacheOptions::default(),
            )
            .await?;
        Ok(listing.items)
    }

    pub async fn list_private<T: DeserializeOwned>(&self, token: &str) -> Result<Vec<T>> {
        let listing: Items<T> = self
            .executor
            .request_with_token(self.resource.private_path, token, RequestOptions::get())
            .await?;
        Ok(listing.items)
    }

    pub async fn create<P, T>(&self, token: &str, payload: &P) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let options = RequestOptions::post().json(payload)?;
        let created =
            self.executor.request_with_token(self.resource.private_path, token, options).await?;
        self.invalidate().await;
        Ok(created)
    }

    pub async fn update<P, T>(&self, token: &str, id: &str, payload: &P) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let options = RequestOptions::put().json(payload)?;
        let updated =
            self.executor.request_with_token(&self.item_path(id), token, options).await?;
        self.invalidate().await;
        Ok(updated)
    }

    pub async fn delete(&self, token: &str, id: &str) -> Result<DeleteResult> {
        let result = self
            .executor
            .request_with_token(&self.item_path(id), token, RequestOptions::delete())
            .await?;
        self.invalidate().await;
        Ok(result)
    }

    pub async fn invalidate(&self) {
        debug!(key = self.resource.cache_key, "invalidating public listing");
        self.cache.invalidate([self.resource.cache_key]).await;
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{id}", self.resource.private_path)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use portico_common::{MemoryStore, MockClock};
    use portico_core::CacheSettings;
    use serde::Deserialize;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const NOTES: Resource = Resource {
        public_path: "/api/notes",
        private_path: "/api/private/notes",
        cache_key: "public-notes",
    };

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
    }

    fn listing(server: &MockServer, clock: &MockClock, ttl_ms: u64) -> PublicListing<MockClock> {
        let executor = RequestExecutor::builder(server.uri()).build().unwrap();
        let settings = CacheSettings { default_ttl: Duration::from_millis(ttl_ms), ..Default::default() };
        let cache = PublicCache::with_clock(Arc::new(MemoryStore::new()), clock.clone(), settings);
        PublicListing::new(executor, cache, NOTES)
    }

    #[tokio::test]
    async fn public_listing_expires_after_configured_ttl() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [{ "id": "n1" }] })))
            .expect(2)
            .mount(&server)
            .await;
        let clock = MockClock::at_millis(1_700_000_000_000);
        let notes = listing(&server, &clock, 5_000);

        let first: Vec<Note> = notes.list_public().await.unwrap();
        clock.advance(Duration::from_millis(4_999));
        let cached: Vec<Note> = notes.list_public().await.unwrap();
        clock.advance(Duration::from_millis(2));
        let refetched: Vec<Note> = notes.list_public().await.unwrap();

        assert_eq!(first, cached);
        assert_eq!(cached, refetched);
    }

    #[tokio::test]
    async fn create_invalidates_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/notes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/private/notes"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "n2" })))
            .expect(1)
            .mount(&server)
            .await;
        let clock = MockClock::at_millis(1_700_000_000_000);
        let notes = listing(&server, &clock, 60_000);

        let _: Vec<Note> = notes.list_public().await.unwrap();
        let created: Note = notes.create("tok", &json!({ "title": "n" })).await.unwrap();
        let _: Vec<Note> = notes.list_public().await.unwrap();

        assert_eq!(created.id, "n2");
    }
}
