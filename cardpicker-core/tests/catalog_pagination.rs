//! Integration tests for paginated catalog retrieval.
//!
//! These tests verify that the CatalogFetcher correctly:
//! - Stops at the page count reported by the first page
//! - Stops at its page limit for oversized catalogs
//! - Concatenates pages in order
//! - Fails on empty, malformed, and unreachable catalogs
//! - Honors cancellation and deadlines

use std::time::Duration as StdDuration;

use cardpicker_core::{
    ApiEndpoints, CachedToken, CancelSignal, CatalogFetcher, Criteria, NetworkError, PickError,
};
use chrono::Duration;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const CARDS_PATH: &str = "/hearthstone/cards/";

fn card_json(id: i64) -> Value {
    json!({
        "id": id,
        "classId": 9,
        "cardTypeId": 4,
        "cardSetId": 1004,
        "rarityId": 5,
        "manaCost": 7,
        "name": format!("Card {id}"),
        "text": "",
        "image": format!("https://images.test/{id}.png")
    })
}

fn page_json(ids: impl IntoIterator<Item = i64>, page_count: u32) -> Value {
    json!({
        "cards": ids.into_iter().map(card_json).collect::<Vec<_>>(),
        "pageCount": page_count
    })
}

fn token() -> CachedToken {
    CachedToken::expiring_in("catalog-token", Duration::hours(1))
}

fn fetcher(server: &MockServer, page_limit: u32) -> CatalogFetcher {
    let endpoints =
        ApiEndpoints::default().with_catalog_url(format!("{}{}", server.uri(), CARDS_PATH));
    CatalogFetcher::with_options(&endpoints, page_limit, StdDuration::from_secs(5)).unwrap()
}

/// Mount a mock for one page that must be requested exactly `count` times.
async fn mount_page(server: &MockServer, page: u32, body: Value, count: u64) {
    Mock::given(method("GET"))
        .and(path(CARDS_PATH))
        .and(query_param("locale", "en_US"))
        .and(query_param("access_token", "catalog-token"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(count)
        .mount(server)
        .await;
}

/// Fail the test if any page not explicitly mounted is requested.
async fn forbid_other_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(server)
        .await;
}

fn ids(cards: &[cardpicker_core::CardRecord]) -> Vec<i64> {
    cards.iter().map(|c| c.id).collect()
}

#[tokio::test]
async fn test_single_page_issues_one_request() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, page_json(1..=4, 1), 1).await;
    forbid_other_pages(&mock_server).await;

    let cards = fetcher(&mock_server, 10)
        .fetch(&token(), &Criteria::new())
        .await
        .unwrap();

    assert_eq!(ids(&cards), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_reported_page_count_below_limit() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, page_json([10, 11], 3), 1).await;
    mount_page(&mock_server, 2, page_json([20, 21], 3), 1).await;
    mount_page(&mock_server, 3, page_json([30], 3), 1).await;
    forbid_other_pages(&mock_server).await;

    let cards = fetcher(&mock_server, 10)
        .fetch(&token(), &Criteria::new())
        .await
        .unwrap();

    assert_eq!(ids(&cards), vec![10, 11, 20, 21, 30]);
}

#[tokio::test]
async fn test_page_limit_cuts_off_large_catalog() {
    let mock_server = MockServer::start().await;
    for page in 1..=10 {
        let first = i64::from(page) * 100;
        mount_page(&mock_server, page, page_json([first, first + 1], 50), 1).await;
    }
    forbid_other_pages(&mock_server).await;

    let cards = fetcher(&mock_server, 10)
        .fetch(&token(), &Criteria::new())
        .await
        .unwrap();

    assert_eq!(cards.len(), 20);
    assert_eq!(cards.first().map(|c| c.id), Some(100));
    assert_eq!(cards.last().map(|c| c.id), Some(1001));
}

#[tokio::test]
async fn test_only_first_page_count_is_trusted() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, page_json([1], 2), 1).await;
    // A later page claiming more pages must not extend the walk.
    mount_page(&mock_server, 2, page_json([2], 40), 1).await;
    forbid_other_pages(&mock_server).await;

    let cards = fetcher(&mock_server, 10)
        .fetch(&token(), &Criteria::new())
        .await
        .unwrap();

    assert_eq!(ids(&cards), vec![1, 2]);
}

#[tokio::test]
async fn test_criteria_are_sent_on_every_page() {
    let mock_server = MockServer::start().await;

    for page in 1..=2u32 {
        Mock::given(method("GET"))
            .and(path(CARDS_PATH))
            .and(query_param("page", page.to_string()))
            .and(query_param("manaCost", "7"))
            .and(query_param("class", "9,2"))
            .and(query_param("sort", "id:asc"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(page_json([i64::from(page)], 2)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }
    forbid_other_pages(&mock_server).await;

    let criteria = Criteria::new()
        .with("sort", "id:asc")
        .with("manaCost", 7)
        .with_list("class", [9, 2]);

    let cards = fetcher(&mock_server, 10)
        .fetch(&token(), &criteria)
        .await
        .unwrap();

    assert_eq!(ids(&cards), vec![1, 2]);
}

#[tokio::test]
async fn test_zero_cards_is_empty_result() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, page_json([], 2), 1).await;
    mount_page(&mock_server, 2, page_json([], 2), 1).await;

    let result = fetcher(&mock_server, 10)
        .fetch(&token(), &Criteria::new())
        .await;

    assert!(matches!(result, Err(PickError::EmptyResult { pages: 2 })));
}

#[tokio::test]
async fn test_zero_page_count_is_empty_result() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, page_json([], 0), 1).await;
    forbid_other_pages(&mock_server).await;

    let result = fetcher(&mock_server, 10)
        .fetch(&token(), &Criteria::new())
        .await;

    assert!(matches!(result, Err(PickError::EmptyResult { pages: 1 })));
}

#[tokio::test]
async fn test_malformed_page_is_protocol_error() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, page_json([1], 3), 1).await;

    Mock::given(method("GET"))
        .and(path(CARDS_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "cards": "oops" })))
        .expect(1)
        .mount(&mock_server)
        .await;
    forbid_other_pages(&mock_server).await;

    let result = fetcher(&mock_server, 10)
        .fetch(&token(), &Criteria::new())
        .await;

    assert!(matches!(result, Err(PickError::Protocol { .. })));
}

#[tokio::test]
async fn test_rejected_token_is_protocol_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CARDS_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "invalid_token" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = fetcher(&mock_server, 10)
        .fetch(&token(), &Criteria::new())
        .await;

    assert!(matches!(result, Err(PickError::Protocol { .. })));
}

#[tokio::test]
async fn test_server_error_propagates_without_partial_result() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, page_json([1, 2], 2), 1).await;

    Mock::given(method("GET"))
        .and(path(CARDS_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = fetcher(&mock_server, 10)
        .fetch(&token(), &Criteria::new())
        .await;

    assert!(matches!(
        result,
        Err(PickError::Network(NetworkError::Server { status: 502, .. }))
    ));
}

#[tokio::test]
async fn test_unreachable_catalog_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let endpoints = ApiEndpoints::default().with_catalog_url(format!("http://{}{}", addr, CARDS_PATH));
    let fetcher = CatalogFetcher::new(&endpoints).unwrap();

    let result = fetcher.fetch(&token(), &Criteria::new()).await;

    match result {
        Err(PickError::Network(NetworkError::Transport { message, .. })) => {
            assert!(!message.contains("catalog-token"));
        }
        other => panic!("Expected transport NetworkError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_deadline_interrupts_slow_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(CARDS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_json([1], 1))
                .set_delay(StdDuration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let signal = CancelSignal::never().with_timeout(StdDuration::from_millis(100));
    let result = fetcher(&mock_server, 10)
        .fetch_with_cancel(&token(), &Criteria::new(), &signal)
        .await;

    assert!(matches!(
        result,
        Err(PickError::Network(NetworkError::Timeout { .. }))
    ));
}

#[tokio::test]
async fn test_cancel_between_pages() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, 1, page_json([1], 5), 1).await;

    Mock::given(method("GET"))
        .and(path(CARDS_PATH))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_json([2], 5))
                .set_delay(StdDuration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let (handle, signal) = CancelSignal::pair();
    let canceller = tokio::spawn(async move {
        tokio::time::sleep(StdDuration::from_millis(200)).await;
        handle.cancel();
    });

    let result = fetcher(&mock_server, 10)
        .fetch_with_cancel(&token(), &Criteria::new(), &signal)
        .await;
    canceller.await.unwrap();

    assert!(matches!(
        result,
        Err(PickError::Network(NetworkError::Cancelled { completed_pages: 1 }))
    ));
}
