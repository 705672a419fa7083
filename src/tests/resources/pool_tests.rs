use crate::{
    PoolState, ProxmoxError, ValidationError,
    tests::{TEST_CSRF, TEST_TICKET, create_authenticated_session},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path},
};

fn pool_body(comment: Option<&str>) -> serde_json::Value {
    match comment {
        Some(comment) => serde_json::json!({"data": {"comment": comment, "members": []}}),
        None => serde_json::json!({"data": {"members": []}}),
    }
}

async fn mount_pool_get(mock_server: &MockServer, poolid: &str, comment: Option<&str>) {
    Mock::given(method("GET"))
        .and(path(format!("/api2/json/pools/{}", poolid)))
        .respond_with(ResponseTemplate::new(200).set_body_json(pool_body(comment)))
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_pool_create_posts_and_reads_back() {
    let mock_server = MockServer::start().await;
    let session = create_authenticated_session(&mock_server, 4);

    Mock::given(method("POST"))
        .and(path("/api2/json/pools"))
        .and(header("Cookie", format!("PVEAuthCookie={}", TEST_TICKET).as_str()))
        .and(header("CSRFPreventionToken", TEST_CSRF))
        .and(body_string_contains("poolid=dev"))
        .and(body_string_contains("comment=development+VMs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": null})))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_pool_get(&mock_server, "dev", Some("development VMs")).await;

    let mut pool = PoolState::planned("dev", "development VMs");
    session.pools().create(&mut pool).await.unwrap();

    assert_eq!(pool.id.as_deref(), Some("dev"));
    assert_eq!(pool.poolid, "dev");
    assert_eq!(pool.comment, "development VMs");
    assert_eq!(session.limiter().in_flight(), 0);
}

#[tokio::test]
async fn test_pool_create_failure_keeps_pool_untracked() {
    let mock_server = MockServer::start().await;
    let session = create_authenticated_session(&mock_server, 4);

    Mock::given(method("POST"))
        .and(path("/api2/json/pools"))
        .respond_with(ResponseTemplate::new(500).set_body_string("pool 'dev' already exists"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api2/json/pools/dev"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pool_body(None)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut pool = PoolState::planned("dev", "");
    let result = session.pools().create(&mut pool).await;

    assert!(matches!(result, Err(ProxmoxError::Api { status: 500, .. })));
    assert!(!pool.is_tracked());
    assert_eq!(session.limiter().in_flight(), 0);
}

#[tokio::test]
async fn test_pool_create_rejects_invalid_pool_id() {
    let mock_server = MockServer::start().await;
    let session = create_authenticated_session(&mock_server, 4);

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut pool = PoolState::planned("../nodes", "");
    let result = session.pools().create(&mut pool).await;
    assert!(matches!(
        result,
        Err(ProxmoxError::Validation {
            source: ValidationError::Format(_),
            ..
        })
    ));
}

#[tokio::test]
async fn test_pool_read_of_deleted_pool_clears_identity() {
    let mock_server = MockServer::start().await;
    let session = create_authenticated_session(&mock_server, 4);

    Mock::given(method("GET"))
        .and(path("/api2/json/pools/dev"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "data": null,
            "message": "pool 'dev' does not exist\n"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut pool = PoolState::from_id("dev");
    session.pools().read(&mut pool).await.unwrap();

    assert!(!pool.is_tracked());
}

#[tokio::test]
async fn test_pool_read_keeps_live_pool_whose_comment_mentions_missing() {
    let mock_server = MockServer::start().await;
    let session = create_authenticated_session(&mock_server, 4);
    mount_pool_get(&mock_server, "dev", Some("fallback if prod does not exist")).await;

    let mut pool = PoolState::from_id("dev");
    session.pools().read(&mut pool).await.unwrap();

    assert_eq!(pool.id.as_deref(), Some("dev"));
    assert_eq!(pool.comment, "fallback if prod does not exist");
}

#[tokio::test]
async fn test_pool_read_maps_missing_comment_to_empty() {
    let mock_server = MockServer::start().await;
    let session = create_authenticated_session(&mock_server, 4);
    mount_pool_get(&mock_server, "dev", None).await;

    let mut pool = PoolState {
        id: Some("dev".to_string()),
        poolid: "dev".to_string(),
        comment: "stale".to_string(),
    };
    session.pools().read(&mut pool).await.unwrap();

    assert_eq!(pool.id.as_deref(), Some("dev"));
    assert_eq!(pool.comment, "");
}

#[tokio::test]
async fn test_pool_read_error_is_returned_and_identity_kept() {
    let mock_server = MockServer::start().await;
    let session = create_authenticated_session(&mock_server, 1);

    Mock::given(method("GET"))
        .and(path("/api2/json/pools/dev"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Permission check failed"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_pool_get(&mock_server, "dev", Some("ok")).await;

    let mut pool = PoolState::from_id("dev");
    let result = session.pools().read(&mut pool).await;
    assert!(matches!(result, Err(ProxmoxError::Api { status: 403, .. })));
    assert!(pool.is_tracked());

    // With a single slot, a leaked permit would block this read forever.
    tokio::time::timeout(Duration::from_secs(2), session.pools().read(&mut pool))
        .await
        .expect("admission slot must be released after an error")
        .unwrap();
    assert_eq!(pool.comment, "ok");
}

#[tokio::test]
async fn test_pool_read_of_untracked_pool_sends_nothing() {
    let mock_server = MockServer::start().await;
    let session = create_authenticated_session(&mock_server, 4);

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut pool = PoolState::planned("dev", "");
    session.pools().read(&mut pool).await.unwrap();
    assert!(!pool.is_tracked());
}

#[tokio::test]
async fn test_pool_update_without_comment_change_skips_put() {
    let mock_server = MockServer::start().await;
    let session = create_authenticated_session(&mock_server, 4);

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api2/json/pools/dev"))
        .respond_with(ResponseTemplate::new(200).set_body_json(pool_body(Some("same"))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut pool = PoolState {
        id: Some("dev".to_string()),
        poolid: "dev".to_string(),
        comment: "same".to_string(),
    };
    session.pools().update(&mut pool, "same").await.unwrap();
    assert_eq!(pool.comment, "same");
}

#[tokio::test]
async fn test_pool_update_with_comment_change_puts_then_reads() {
    let mock_server = MockServer::start().await;
    let session = create_authenticated_session(&mock_server, 4);

    Mock::given(method("PUT"))
        .and(path("/api2/json/pools/dev"))
        .and(header("CSRFPreventionToken", TEST_CSRF))
        .and(body_string_contains("comment=new+comment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": null})))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_pool_get(&mock_server, "dev", Some("new comment")).await;

    let mut pool = PoolState {
        id: Some("dev".to_string()),
        poolid: "dev".to_string(),
        comment: "old comment".to_string(),
    };
    session.pools().update(&mut pool, "new comment").await.unwrap();
    assert_eq!(pool.comment, "new comment");
}

#[tokio::test]
async fn test_pool_update_failure_is_returned() {
    let mock_server = MockServer::start().await;
    let session = create_authenticated_session(&mock_server, 4);

    Mock::given(method("PUT"))
        .and(path("/api2/json/pools/dev"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut pool = PoolState {
        id: Some("dev".to_string()),
        poolid: "dev".to_string(),
        comment: "old".to_string(),
    };
    let result = session.pools().update(&mut pool, "new").await;
    assert!(matches!(result, Err(ProxmoxError::Api { status: 500, .. })));
    assert_eq!(pool.comment, "old");
}

#[tokio::test]
async fn test_pool_update_of_untracked_pool_is_rejected() {
    let mock_server = MockServer::start().await;
    let session = create_authenticated_session(&mock_server, 4);

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut pool = PoolState::planned("dev", "old");
    let result = session.pools().update(&mut pool, "new").await;

    assert!(matches!(
        result,
        Err(ProxmoxError::Validation {
            source: ValidationError::Field { ref field, .. },
        }) if field == "id"
    ));
    assert_eq!(pool.comment, "old");
    assert!(!pool.is_tracked());
}

#[tokio::test]
async fn test_pool_delete_clears_identity() {
    let mock_server = MockServer::start().await;
    let session = create_authenticated_session(&mock_server, 4);

    Mock::given(method("DELETE"))
        .and(path("/api2/json/pools/dev"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": null})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut pool = PoolState::from_id("dev");
    session.pools().delete(&mut pool).await.unwrap();
    assert!(!pool.is_tracked());
}

#[tokio::test]
async fn test_pool_delete_clears_identity_even_when_remote_fails() {
    let mock_server = MockServer::start().await;
    let session = create_authenticated_session(&mock_server, 4);

    Mock::given(method("DELETE"))
        .and(path("/api2/json/pools/dev"))
        .respond_with(ResponseTemplate::new(500).set_body_string("pool is not empty"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut pool = PoolState::from_id("dev");
    session.pools().delete(&mut pool).await.unwrap();
    assert!(!pool.is_tracked());
    assert_eq!(session.limiter().in_flight(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_pool_reads_respect_max_parallel() {
    let mock_server = MockServer::start().await;
    let session = Arc::new(create_authenticated_session(&mock_server, 2));

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(pool_body(Some("slow")))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(6)
        .mount(&mock_server)
        .await;

    let start = Instant::now();
    let handles: Vec<_> = (0..6)
        .map(|i| {
            let session = Arc::clone(&session);
            tokio::spawn(async move {
                let mut state = PoolState::from_id(format!("pool{}", i));
                session.pools().read(&mut state).await.map(|()| state)
            })
        })
        .collect();

    for handle in handles {
        let state = handle.await.unwrap().unwrap();
        assert_eq!(state.comment, "slow");
    }

    // Six 200ms calls, two at a time: at least three rounds.
    assert!(start.elapsed() >= Duration::from_millis(550));
    assert_eq!(session.limiter().in_flight(), 0);
}
