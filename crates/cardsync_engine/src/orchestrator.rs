use std::fs;
use std::sync::Arc;
use std::time::Instant;

use cardsync_core::{
    parse_collection, resume_point, EntityCardSet, ItemOutcome, ResumePoint, RunRequest,
    RunSummary, TargetSource,
};
use sync_logging::sync_debug;

use crate::{
    CardSync, EventSink, RunAborted, Services, SyncConfig, SyncError, SyncEvent, TitleStore,
    WatermarkTracker,
};

/// Expands a run request into titles and drives each through [`CardSync`].
pub struct Orchestrator {
    sync: CardSync,
    tracker: WatermarkTracker,
    store: Arc<dyn TitleStore>,
    sink: Arc<dyn EventSink>,
    config: SyncConfig,
}

impl Orchestrator {
    pub fn new(services: Services, config: SyncConfig) -> Self {
        Self {
            sync: CardSync::new(&services, config.clone()),
            tracker: WatermarkTracker::new(&services, config.clone()),
            store: services.store,
            sink: services.sink,
            config,
        }
    }

    pub async fn parse(&self, slug: &str, force: bool) -> Result<Option<EntityCardSet>, SyncError> {
        self.sync.parse(slug, force).await
    }

    /// Slugs of titles with new cards since the previous call; persists the watermark.
    pub async fn updated_titles(&self) -> Result<Vec<String>, SyncError> {
        Ok(self.tracker.scan().await?)
    }

    pub async fn collect_targets(&self, source: &TargetSource) -> Result<Vec<String>, SyncError> {
        let started = Instant::now();
        let slugs = match source {
            TargetSource::Single(slug) => return Ok(vec![slug.clone()]),
            TargetSource::LocalStore => self.store.list_slugs()?,
            TargetSource::CollectionFile => {
                let path = &self.config.collection_file;
                let contents = fs::read_to_string(path).map_err(|source| {
                    SyncError::Collection {
                        path: path.clone(),
                        source,
                    }
                })?;
                parse_collection(&contents)
            }
            TargetSource::Updates => self.updated_titles().await?,
        };
        self.sink.emit(SyncEvent::TargetsCollected {
            count: slugs.len(),
            elapsed: started.elapsed(),
        });
        Ok(slugs)
    }

    /// Runs every title of the request. Not-found and request failures are
    /// counted per title; any other failure stops the run. The summary is
    /// reported either way.
    pub async fn run(&self, request: &RunRequest) -> Result<RunSummary, RunAborted> {
        let mut summary = RunSummary::default();
        let titles = match self.collect_targets(&request.source).await {
            Ok(titles) => titles,
            Err(err) => return Err(self.abort(summary, err)),
        };

        let point = resume_point(&titles, request.resume_from.as_deref());
        match (point, request.resume_from.as_deref()) {
            (ResumePoint::Resumed { .. }, Some(slug)) => self.sink.emit(SyncEvent::ResumeApplied {
                slug: slug.to_string(),
            }),
            (ResumePoint::Ignored, Some(slug)) => self.sink.emit(SyncEvent::ResumeIgnored {
                slug: slug.to_string(),
            }),
            _ => {}
        }
        if request.force {
            self.sink.emit(SyncEvent::ForceRedownload);
        }

        let total = titles.len();
        for (index, slug) in titles.iter().enumerate().skip(point.start_index()) {
            if total > 1 {
                self.sink.emit(SyncEvent::ItemStarted {
                    index,
                    total,
                    slug: slug.clone(),
                });
            }
            match self.sync.parse(slug, request.force).await {
                Ok(Some(_)) => summary.record(ItemOutcome::Processed),
                Ok(None) => summary.record(ItemOutcome::Skipped),
                Err(err) => match err.outcome() {
                    Some(outcome) => {
                        sync_debug!("Title \"{}\" counted as {:?}: {}", slug, outcome, err);
                        summary.record(outcome);
                    }
                    None => return Err(self.abort(summary, err)),
                },
            }
        }

        self.sink.emit(SyncEvent::Summary(summary));
        Ok(summary)
    }

    fn abort(&self, summary: RunSummary, source: SyncError) -> RunAborted {
        self.sink.emit(SyncEvent::Summary(summary));
        RunAborted { summary, source }
    }
}
