//! Integration tests for the API facades
//!
//! Exercises the executor, public cache and SQLite store together against a
//! mock backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use portico_common::{AuthEvent, KeyValueStore, MockClock, SessionSignal};
use portico_core::{CacheSettings, PublicCache};
use portico_domain::PorticoError;
use portico_infra::{RequestExecutor, SkillsApi, SqliteStore, SqliteStoreConfig};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn skill(id: &str) -> Value {
    json!({
        "id": id,
        "title": "Rust",
        "summary": "summary",
        "body": "<p>body</p>",
        "imageUrls": ["cover.png"],
        "tags": ["systems"],
        "visibility": "public",
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-01-01T00:00:00Z"
    })
}

fn skills_api(
    server: &MockServer,
    store: Arc<dyn KeyValueStore>,
    clock: &MockClock,
) -> SkillsApi<MockClock> {
    let executor = RequestExecutor::builder(server.uri()).build().unwrap();
    let cache = PublicCache::with_clock(store, clock.clone(), CacheSettings::default());
    SkillsApi::new(executor, cache)
}

#[tokio::test]
async fn test_expired_listing_served_stale_when_backend_fails() {
    let server = MockServer::start().await;
    let clock = MockClock::at_millis(1_700_000_000_000);
    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::in_memory().unwrap());
    let api = skills_api(&server, store, &clock);

    Mock::given(method("GET"))
        .and(path("/api/skills"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [skill("s1")] })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    let fresh = api.list_public().await.unwrap();
    assert_eq!(fresh[0].id, "s1");

    clock.advance(Duration::from_secs(61));
    Mock::given(method("GET"))
        .and(path("/api/skills"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "message": "Database unavailable" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let stale = api.list_public().await.unwrap();
    assert_eq!(stale, fresh);
}

#[tokio::test]
async fn test_persisted_listing_survives_restart() {
    let server = MockServer::start().await;
    let clock = MockClock::at_millis(1_700_000_000_000);
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("portico.db");

    Mock::given(method("GET"))
        .and(path("/api/skills"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [skill("s1")] })))
        .expect(1)
        .mount(&server)
        .await;

    {
        let store = Arc::new(SqliteStore::open(&db_path, SqliteStoreConfig::default()).unwrap());
        let api = skills_api(&server, store, &clock);
        api.list_public().await.unwrap();
    }

    // A new process: empty memory tier, same database file.
    let store = Arc::new(SqliteStore::open(&db_path, SqliteStoreConfig::default()).unwrap());
    let api = skills_api(&server, store, &clock);

    let restored = api.list_public().await.unwrap();
    assert_eq!(restored.len(), 1);
    assert_eq!(restored[0].image_urls, vec!["cover.png"]);
}

#[tokio::test]
async fn test_concurrent_listings_share_one_request() {
    let server = MockServer::start().await;
    let clock = MockClock::at_millis(1_700_000_000_000);
    let api = skills_api(&server, Arc::new(SqliteStore::in_memory().unwrap()), &clock);

    Mock::given(method("GET"))
        .and(path("/api/skills"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "items": [skill("s1")] }))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (a, b, c) = tokio::join!(api.list_public(), api.list_public(), api.list_public());

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(c.unwrap().len(), 1);
}

#[tokio::test]
async fn test_unauthorized_private_listing_emits_expired_once() {
    let server = MockServer::start().await;
    let signal = SessionSignal::new();
    let heard = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&heard);
    let _subscription = signal.subscribe(move |event| {
        assert_eq!(event, AuthEvent::Expired);
        counter.fetch_add(1, Ordering::SeqCst);
    });

    Mock::given(method("GET"))
        .and(path("/api/private/skills"))
        .respond_with(
            ResponseTemplate::new(401)
                .insert_header("X-Request-ID", "req-401")
                .set_body_json(json!({ "message": "Token expired", "code": "TOKEN_EXPIRED" })),
        )
        .mount(&server)
        .await;

    let executor = RequestExecutor::builder(server.uri()).signal(signal.clone()).build().unwrap();
    let cache = PublicCache::new(Arc::new(SqliteStore::in_memory().unwrap()), CacheSettings::default());
    let api = SkillsApi::new(executor, cache);

    let err = api.list_private("stale-token").await.unwrap_err();

    assert_eq!(heard.load(Ordering::SeqCst), 1);
    match err {
        PorticoError::Api(client) => {
            assert_eq!(client.status, 401);
            assert_eq!(client.message, "Token expired");
            assert_eq!(client.code.as_deref(), Some("TOKEN_EXPIRED"));
            assert_eq!(client.request_id.as_deref(), Some("req-401"));
        }
        other => panic!("expected api error, got {other:?}"),
    }
}
