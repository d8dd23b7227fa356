mod common;

use std::fs;

use cardsync_engine::{SyncEvent, WatermarkTracker};
use common::{catalog_card, Harness};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const CATALOG: &str = "/api/v2/inventory/catalog/";

async fn mount_catalog(harness: &Harness, page: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(CATALOG))
        .and(query_param("ordering", "-id"))
        .and(query_param("page", page))
        .respond_with(response)
        .mount(&harness.server)
        .await;
}

fn catalog_page(cards: Vec<Value>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "results": cards }))
}

fn write_previous(harness: &Harness, id: u64) {
    fs::create_dir_all(&harness.config.temp_dir).unwrap();
    fs::write(harness.config.watermark_path(), id.to_string()).unwrap();
}

fn saved(harness: &Harness) -> Option<String> {
    fs::read_to_string(harness.config.watermark_path()).ok()
}

#[tokio::test]
async fn first_scan_takes_only_the_newest_card() {
    let harness = Harness::start().await;
    mount_catalog(
        &harness,
        "1",
        catalog_page(vec![
            catalog_card(50, Some("alpha")),
            catalog_card(49, Some("beta")),
            catalog_card(48, Some("gamma")),
            catalog_card(47, Some("beta")),
            catalog_card(46, Some("delta")),
        ]),
    )
    .await;

    let tracker = WatermarkTracker::new(&harness.services(), harness.config.clone());
    assert_eq!(tracker.read().unwrap(), None);
    let slugs = tracker.scan().await.unwrap();

    assert_eq!(slugs, vec!["alpha".to_string()]);
    assert_eq!(saved(&harness).as_deref(), Some("50"));
    assert_eq!(tracker.read().unwrap(), Some(50));
    let events = harness.sink.events();
    assert_eq!(events.first(), Some(&SyncEvent::FirstWatermarkScan));
    assert!(events.contains(&SyncEvent::WatermarkSaved { card_id: 50 }));
}

#[tokio::test]
async fn scan_stops_at_previous_watermark() {
    let harness = Harness::start().await;
    write_previous(&harness, 100);
    mount_catalog(
        &harness,
        "1",
        catalog_page(vec![
            catalog_card(105, Some("alpha")),
            catalog_card(104, Some("beta")),
            catalog_card(103, Some("alpha")),
            catalog_card(102, None),
            catalog_card(101, Some("gamma")),
            catalog_card(100, Some("delta")),
            catalog_card(99, Some("epsilon")),
        ]),
    )
    .await;

    let tracker = WatermarkTracker::new(&harness.services(), harness.config.clone());
    let slugs = tracker.scan().await.unwrap();

    assert_eq!(slugs, vec!["alpha", "beta", "gamma"]);
    assert_eq!(saved(&harness).as_deref(), Some("105"));
    assert_eq!(harness.request_count().await, 1);
    assert_eq!(harness.pacer.count(), 0);
    assert!(!harness
        .sink
        .events()
        .contains(&SyncEvent::FirstWatermarkScan));
}

#[tokio::test]
async fn scan_walks_pages_until_watermark() {
    let harness = Harness::start().await;
    write_previous(&harness, 10);
    mount_catalog(
        &harness,
        "1",
        catalog_page(vec![catalog_card(13, Some("a")), catalog_card(12, Some("b"))]),
    )
    .await;
    mount_catalog(
        &harness,
        "2",
        catalog_page(vec![catalog_card(11, Some("c")), catalog_card(10, Some("d"))]),
    )
    .await;

    let tracker = WatermarkTracker::new(&harness.services(), harness.config.clone());
    let slugs = tracker.scan().await.unwrap();

    assert_eq!(slugs, vec!["a", "b", "c"]);
    assert_eq!(saved(&harness).as_deref(), Some("13"));
    assert_eq!(harness.request_count().await, 2);
    assert_eq!(harness.pacer.count(), 1);
}

#[tokio::test]
async fn failure_mid_scan_keeps_partial_result() {
    let harness = Harness::start().await;
    write_previous(&harness, 10);
    mount_catalog(
        &harness,
        "1",
        catalog_page(vec![catalog_card(20, Some("a")), catalog_card(19, Some("b"))]),
    )
    .await;
    mount_catalog(&harness, "2", ResponseTemplate::new(500)).await;

    let tracker = WatermarkTracker::new(&harness.services(), harness.config.clone());
    let slugs = tracker.scan().await.unwrap();

    assert_eq!(slugs, vec!["a", "b"]);
    assert_eq!(saved(&harness).as_deref(), Some("20"));
    assert!(harness
        .sink
        .events()
        .iter()
        .any(|event| matches!(event, SyncEvent::RequestFailed(e) if e.status == Some(500))));
}

#[tokio::test]
async fn empty_catalog_leaves_watermark_untouched() {
    let harness = Harness::start().await;
    write_previous(&harness, 42);
    mount_catalog(&harness, "1", catalog_page(Vec::new())).await;

    let tracker = WatermarkTracker::new(&harness.services(), harness.config.clone());
    let slugs = tracker.scan().await.unwrap();

    assert!(slugs.is_empty());
    assert_eq!(saved(&harness).as_deref(), Some("42"));
    assert!(!harness
        .sink
        .events()
        .iter()
        .any(|event| matches!(event, SyncEvent::WatermarkSaved { .. })));
}

#[tokio::test]
async fn unreachable_catalog_on_first_run_writes_nothing() {
    let harness = Harness::start().await;
    mount_catalog(&harness, "1", ResponseTemplate::new(503)).await;

    let tracker = WatermarkTracker::new(&harness.services(), harness.config.clone());
    let slugs = tracker.scan().await.unwrap();

    assert!(slugs.is_empty());
    assert_eq!(saved(&harness), None);
}

#[tokio::test]
async fn unreadable_watermark_counts_as_first_run() {
    let harness = Harness::start().await;
    fs::create_dir_all(&harness.config.temp_dir).unwrap();
    fs::write(harness.config.watermark_path(), "not a number").unwrap();

    let tracker = WatermarkTracker::new(&harness.services(), harness.config.clone());
    assert_eq!(tracker.read().unwrap(), None);
}

#[tokio::test]
async fn zero_is_a_real_watermark() {
    let harness = Harness::start().await;
    write_previous(&harness, 0);
    mount_catalog(
        &harness,
        "1",
        catalog_page(vec![
            catalog_card(3, Some("a")),
            catalog_card(2, Some("b")),
            catalog_card(1, Some("c")),
            catalog_card(0, Some("d")),
        ]),
    )
    .await;

    let tracker = WatermarkTracker::new(&harness.services(), harness.config.clone());
    assert_eq!(tracker.read().unwrap(), Some(0));
    let slugs = tracker.scan().await.unwrap();

    assert_eq!(slugs, vec!["a", "b", "c"]);
    assert_eq!(saved(&harness).as_deref(), Some("3"));
    assert!(!harness
        .sink
        .events()
        .contains(&SyncEvent::FirstWatermarkScan));
}

#[tokio::test]
async fn watermark_never_moves_backwards() {
    let harness = Harness::start().await;
    write_previous(&harness, 100);
    mount_catalog(
        &harness,
        "1",
        catalog_page(vec![catalog_card(90, Some("a")), catalog_card(89, Some("b"))]),
    )
    .await;

    let tracker = WatermarkTracker::new(&harness.services(), harness.config.clone());
    let slugs = tracker.scan().await.unwrap();

    assert!(slugs.is_empty());
    assert_eq!(saved(&harness).as_deref(), Some("100"));
    assert_eq!(tracker.read().unwrap(), Some(100));
}
