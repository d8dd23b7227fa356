use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use cardsync_core::{normalize_card, CanonicalCard, EntityCardSet, EntityId};
use serde::Serialize;

use crate::{
    AssetSync, AtomicFileWriter, CardFetcher, EventSink, IdResolver, OutputMode, Services,
    StoreError, SyncConfig, SyncError, SyncEvent, TitleKey, TitleRecord, TitleStore,
};

pub const STANDALONE_FILENAME: &str = "cards.json";

#[derive(Serialize)]
struct StandaloneDocument<'a> {
    title_id: EntityId,
    slug: &'a str,
    synced_utc: String,
    cards: &'a [CanonicalCard],
}

/// Resolve, fetch, normalize, sync images and persist one title.
pub struct CardSync {
    resolver: IdResolver,
    fetcher: CardFetcher,
    assets: AssetSync,
    store: Arc<dyn TitleStore>,
    sink: Arc<dyn EventSink>,
    config: SyncConfig,
}

impl CardSync {
    pub fn new(services: &Services, config: SyncConfig) -> Self {
        Self {
            resolver: IdResolver::new(services, config.clone()),
            fetcher: CardFetcher::new(services, config.clone()),
            assets: AssetSync::new(services),
            store: services.store.clone(),
            sink: services.sink.clone(),
            config,
        }
    }

    /// `Ok(None)` means the title was skipped because its local record is
    /// missing or unusable.
    pub async fn parse(&self, slug: &str, force: bool) -> Result<Option<EntityCardSet>, SyncError> {
        let started = Instant::now();
        let entity_id = self.resolver.resolve(slug).await?;

        let set = match self.config.output_mode {
            OutputMode::Merged => {
                let Some(mut record) = self.open_local(slug, entity_id)? else {
                    return Ok(None);
                };
                let set = self.fetch_cards(slug, entity_id).await?;
                if !set.is_empty() {
                    record.set_cards(&set.cards)?;
                    let dir = self
                        .config
                        .images_dir
                        .join(record.used_filename())
                        .join("cards");
                    self.assets.sync_images(&dir, &set.cards, force).await?;
                    self.store.save(&record)?;
                }
                set
            }
            OutputMode::Standalone => {
                let set = self.fetch_cards(slug, entity_id).await?;
                if !set.is_empty() {
                    let dir = self.standalone_dir(slug, entity_id);
                    self.assets
                        .sync_images(&dir.join("images"), &set.cards, force)
                        .await?;
                    self.write_standalone(&dir, &set)?;
                }
                set
            }
        };

        if set.is_empty() {
            self.sink.emit(SyncEvent::NoCards {
                slug: slug.to_string(),
            });
        } else {
            self.sink.emit(SyncEvent::TitleParsed {
                slug: slug.to_string(),
                card_count: set.cards.len(),
            });
        }
        self.sink.emit(SyncEvent::TitleDone {
            slug: slug.to_string(),
            elapsed: started.elapsed(),
        });
        Ok(Some(set))
    }

    fn open_local(&self, slug: &str, entity_id: EntityId) -> Result<Option<TitleRecord>, SyncError> {
        let key = if self.config.use_id_as_filename {
            TitleKey::Id(entity_id)
        } else {
            TitleKey::Slug(slug.to_string())
        };
        match self.store.open(&key) {
            Ok(record) => Ok(Some(record)),
            Err(StoreError::NotFound(_)) => {
                self.sink.emit(SyncEvent::LocalRecordMissing {
                    slug: slug.to_string(),
                });
                Ok(None)
            }
            Err(err @ (StoreError::Malformed { .. } | StoreError::UnsupportedFormat { .. })) => {
                self.sink.emit(SyncEvent::LocalRecordInvalid {
                    slug: slug.to_string(),
                    reason: err.to_string(),
                });
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn fetch_cards(&self, slug: &str, entity_id: EntityId) -> Result<EntityCardSet, SyncError> {
        self.sink.emit(SyncEvent::ParsingTitle {
            slug: slug.to_string(),
            entity_id,
        });
        let fetched = self.fetcher.fetch_all(entity_id).await;
        if let Some(err) = fetched.interrupted {
            if fetched.cards.is_empty() {
                return Err(SyncError::RequestFailed(err));
            }
            self.sink.emit(SyncEvent::PartialListing {
                slug: slug.to_string(),
                kept: fetched.cards.len(),
            });
        }

        let mut set = EntityCardSet::new(entity_id, slug);
        set.cards = fetched
            .cards
            .iter()
            .map(|raw| normalize_card(raw, &self.config.media_base_url))
            .collect();
        Ok(set)
    }

    fn standalone_dir(&self, slug: &str, entity_id: EntityId) -> PathBuf {
        let key = if self.config.use_id_as_filename {
            entity_id.to_string()
        } else {
            slug.to_string()
        };
        self.config.output_dir.join(key)
    }

    fn write_standalone(&self, dir: &Path, set: &EntityCardSet) -> Result<(), SyncError> {
        let document = StandaloneDocument {
            title_id: set.entity_id,
            slug: &set.entity_slug,
            synced_utc: (self.config.synced_utc)(),
            cards: &set.cards,
        };
        let content = serde_json::to_string_pretty(&document)?;
        AtomicFileWriter::new(dir).write(STANDALONE_FILENAME, &content)?;
        Ok(())
    }
}
