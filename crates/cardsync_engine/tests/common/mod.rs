#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cardsync_engine::{
    EventSink, FileNaming, JsonTitleStore, Pacer, ReqwestTransport, Services, SyncConfig,
    SyncEvent, TransportSettings,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::MockServer;

#[derive(Default)]
pub struct TestSink {
    events: Mutex<Vec<SyncEvent>>,
}

impl TestSink {
    pub fn events(&self) -> Vec<SyncEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<SyncEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: SyncEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[derive(Default)]
pub struct CountingPacer {
    pauses: AtomicUsize,
}

impl CountingPacer {
    pub fn count(&self) -> usize {
        self.pauses.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Pacer for CountingPacer {
    async fn pause(&self) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn transport_settings() -> TransportSettings {
    TransportSettings {
        retries: 0,
        retry_backoff: Duration::from_millis(1),
        request_timeout: Duration::from_secs(5),
        ..TransportSettings::default()
    }
}

/// Mock API server, scratch directories and recording collaborators.
pub struct Harness {
    pub server: MockServer,
    pub temp: TempDir,
    pub config: SyncConfig,
    pub sink: Arc<TestSink>,
    pub pacer: Arc<CountingPacer>,
}

impl Harness {
    pub async fn start() -> Self {
        sync_logging::initialize_for_tests();
        let server = MockServer::start().await;
        let temp = TempDir::new().unwrap();
        let mut config = SyncConfig::default_with_root(server.uri(), temp.path());
        config.delay = Duration::ZERO;
        config.synced_utc = Arc::new(|| "2024-01-01T00:00:00Z".to_string());
        Self {
            server,
            temp,
            config,
            sink: Arc::new(TestSink::default()),
            pacer: Arc::new(CountingPacer::default()),
        }
    }

    pub fn services(&self) -> Services {
        let naming = if self.config.use_id_as_filename {
            FileNaming::Id
        } else {
            FileNaming::Slug
        };
        Services {
            transport: Arc::new(ReqwestTransport::new(transport_settings()).unwrap()),
            store: Arc::new(JsonTitleStore::new(self.config.titles_dir.clone(), naming)),
            pacer: self.pacer.clone(),
            sink: self.sink.clone(),
        }
    }

    /// Writes a minimal local title record named by slug.
    pub fn write_title(&self, slug: &str, id: u64) -> PathBuf {
        std::fs::create_dir_all(&self.config.titles_dir).unwrap();
        let path = self.config.titles_dir.join(format!("{slug}.json"));
        let record = json!({ "id": id, "slug": slug, "name": slug.to_uppercase() });
        std::fs::write(&path, serde_json::to_string_pretty(&record).unwrap()).unwrap();
        path
    }

    pub fn read_json(&self, path: PathBuf) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    pub async fn request_count(&self) -> usize {
        self.server.received_requests().await.unwrap_or_default().len()
    }
}

/// Listing record whose cover lives at `/media/cards/{id}.jpg`.
pub fn raw_card(id: u64) -> Value {
    json!({
        "id": id,
        "rank": "rank_a",
        "description": format!("<p>Card {id}</p>"),
        "cover": { "high": format!("cards/{id}.jpg") },
        "author": { "id": 1, "username": "author" },
        "character": null
    })
}

pub fn cards_page(ids: impl IntoIterator<Item = u64>) -> Value {
    json!({ "results": ids.into_iter().map(raw_card).collect::<Vec<_>>() })
}

pub fn catalog_card(id: u64, slug: Option<&str>) -> Value {
    match slug {
        Some(slug) => json!({ "id": id, "title": { "dir": slug } }),
        None => json!({ "id": id, "title": null }),
    }
}
