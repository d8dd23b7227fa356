use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cardsync_core::raw::{CatalogCard, Page};
use cardsync_core::CardId;
use sync_logging::sync_warn;

use crate::{
    AtomicFileWriter, EventSink, Pacer, PageScope, PersistError, RequestError, Services,
    SyncConfig, SyncEvent, Transport,
};

/// Finds titles with cards newer than the last scan's highest card id.
pub struct WatermarkTracker {
    transport: Arc<dyn Transport>,
    pacer: Arc<dyn Pacer>,
    sink: Arc<dyn EventSink>,
    config: SyncConfig,
}

impl WatermarkTracker {
    pub fn new(services: &Services, config: SyncConfig) -> Self {
        Self {
            transport: services.transport.clone(),
            pacer: services.pacer.clone(),
            sink: services.sink.clone(),
            config,
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.config.watermark_path()
    }

    /// `None` when no scan has completed yet.
    pub fn read(&self) -> Result<Option<CardId>, PersistError> {
        read_watermark(&self.state_path())
    }

    /// Walks the newest-first catalog and returns the slugs of titles with new
    /// cards, in discovery order. The newest card id seen becomes the new
    /// watermark, whatever ended the scan, unless it is below the previous one.
    pub async fn scan(&self) -> Result<Vec<String>, PersistError> {
        let previous = self.read()?;
        if previous.is_none() {
            self.sink.emit(SyncEvent::FirstWatermarkScan);
        }

        let mut newest: Option<CardId> = None;
        let mut seen = HashSet::new();
        let mut slugs = Vec::new();
        let mut page = 1;

        loop {
            let url = self.config.catalog_url(page);
            let response = match self.transport.get(&url).await {
                Ok(response) => response,
                Err(err) => {
                    self.request_failed(RequestError::transport(&url, &err));
                    break;
                }
            };
            if !response.is_ok() {
                let err =
                    RequestError::status(&url, response.status, "unable to request catalog");
                self.request_failed(err);
                break;
            }
            let results = match response.json::<Page<CatalogCard>>() {
                Ok(body) => body.results,
                Err(err) => {
                    self.request_failed(RequestError::body(&url, &err));
                    break;
                }
            };
            if results.is_empty() {
                break;
            }

            let collected_before = slugs.len();
            let mut done = false;
            for card in results {
                newest.get_or_insert(card.id);
                let fresh = previous.map_or(true, |prev| card.id > prev);
                if !fresh {
                    done = true;
                    break;
                }
                if let Some(title) = card.title {
                    if seen.insert(title.dir.clone()) {
                        slugs.push(title.dir);
                    }
                }
                if previous.is_none() {
                    done = true;
                    break;
                }
            }

            if slugs.len() > collected_before {
                self.sink.emit(SyncEvent::PageParsed {
                    scope: PageScope::Catalog,
                    page,
                    count: slugs.len() - collected_before,
                });
            }
            if done {
                break;
            }
            page += 1;
            self.pacer.pause().await;
        }

        // Never move backwards, even if the feed lost its newest cards.
        if let Some(card_id) = newest.map(|seen| previous.map_or(seen, |prev| prev.max(seen))) {
            write_watermark(&self.state_path(), card_id)?;
            self.sink.emit(SyncEvent::WatermarkSaved { card_id });
        }
        Ok(slugs)
    }

    fn request_failed(&self, err: RequestError) {
        self.sink.emit(SyncEvent::RequestFailed(err));
    }
}

fn read_watermark(path: &Path) -> Result<Option<CardId>, PersistError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    match text.trim().parse::<CardId>() {
        Ok(id) => Ok(Some(id)),
        Err(err) => {
            sync_warn!("Ignoring unreadable watermark {:?}: {}", path, err);
            Ok(None)
        }
    }
}

fn write_watermark(path: &Path, card_id: CardId) -> Result<(), PersistError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("last_card_id.txt");
    AtomicFileWriter::new(dir).write(filename, &card_id.to_string())?;
    Ok(())
}
