mod common;

use cardsync_core::raw::{CatalogCard, Page, RawCard};
use cardsync_engine::{CardFetcher, HttpResponse, PageScope, SyncEvent};
use common::{cards_page, Harness};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const LISTING: &str = "/api/inventory/2/cards/";

async fn mount_page(harness: &Harness, page: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(LISTING))
        .and(query_param("count", "30"))
        .and(query_param("page", page))
        .respond_with(response)
        .expect(1)
        .mount(&harness.server)
        .await;
}

#[tokio::test]
async fn full_page_then_empty_page_ends_listing() {
    let harness = Harness::start().await;
    mount_page(&harness, "1", ResponseTemplate::new(200).set_body_json(cards_page(1..=30))).await;
    mount_page(&harness, "2", ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .await;

    let fetcher = CardFetcher::new(&harness.services(), harness.config.clone());
    let fetched = fetcher.fetch_all(2).await;

    assert_eq!(fetched.cards.len(), 30);
    assert_eq!(fetched.cards[0].id, 1);
    assert_eq!(fetched.cards[29].id, 30);
    assert_eq!(fetched.requests, 2);
    assert_eq!(fetched.interrupted, None);
    assert_eq!(harness.request_count().await, 2);
    // One pause between the two pages, none after the terminating request.
    assert_eq!(harness.pacer.count(), 1);
    assert!(harness.sink.events().contains(&SyncEvent::PageParsed {
        scope: PageScope::Cards { entity_id: 2 },
        page: 1,
        count: 30,
    }));
}

#[tokio::test]
async fn not_found_on_first_page_is_an_empty_listing() {
    let harness = Harness::start().await;
    mount_page(&harness, "1", ResponseTemplate::new(404)).await;

    let fetcher = CardFetcher::new(&harness.services(), harness.config.clone());
    let fetched = fetcher.fetch_all(2).await;

    assert!(fetched.cards.is_empty());
    assert_eq!(fetched.requests, 1);
    assert_eq!(fetched.interrupted, None);
    assert_eq!(harness.pacer.count(), 0);
}

#[tokio::test]
async fn not_found_after_first_page_keeps_cards() {
    let harness = Harness::start().await;
    mount_page(&harness, "1", ResponseTemplate::new(200).set_body_json(cards_page(1..=3))).await;
    mount_page(&harness, "2", ResponseTemplate::new(404)).await;

    let fetcher = CardFetcher::new(&harness.services(), harness.config.clone());
    let fetched = fetcher.fetch_all(2).await;

    assert_eq!(fetched.cards.len(), 3);
    assert_eq!(fetched.interrupted, None);
}

#[tokio::test]
async fn server_error_keeps_pages_read_so_far() {
    let harness = Harness::start().await;
    mount_page(&harness, "1", ResponseTemplate::new(200).set_body_json(cards_page(1..=30))).await;
    mount_page(&harness, "2", ResponseTemplate::new(503)).await;

    let fetcher = CardFetcher::new(&harness.services(), harness.config.clone());
    let fetched = fetcher.fetch_all(2).await;

    assert_eq!(fetched.cards.len(), 30);
    assert_eq!(fetched.requests, 2);
    let err = fetched.interrupted.expect("interrupted");
    assert_eq!(err.status, Some(503));
    assert!(harness
        .sink
        .events()
        .iter()
        .any(|event| matches!(event, SyncEvent::RequestFailed(e) if e.status == Some(503))));
}

#[tokio::test]
async fn garbage_body_interrupts_listing() {
    let harness = Harness::start().await;
    mount_page(&harness, "1", ResponseTemplate::new(200).set_body_string("<html>")).await;

    let fetcher = CardFetcher::new(&harness.services(), harness.config.clone());
    let fetched = fetcher.fetch_all(2).await;

    assert!(fetched.cards.is_empty());
    assert!(fetched.interrupted.is_some());
}

#[test]
fn body_without_results_decodes_as_empty_page() {
    let response = HttpResponse::new(200, br#"{"count": 0}"#.to_vec());
    let cards: Page<RawCard> = response.json().unwrap();
    assert!(cards.results.is_empty());
    let catalog: Page<CatalogCard> = response.json().unwrap();
    assert!(catalog.results.is_empty());
}

#[tokio::test]
async fn page_without_results_ends_listing() {
    let harness = Harness::start().await;
    mount_page(&harness, "1", ResponseTemplate::new(200).set_body_json(json!({}))).await;

    let fetcher = CardFetcher::new(&harness.services(), harness.config.clone());
    let fetched = fetcher.fetch_all(2).await;

    assert!(fetched.cards.is_empty());
    assert_eq!(fetched.requests, 1);
    assert_eq!(fetched.interrupted, None);
}
