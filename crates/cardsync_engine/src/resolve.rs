use std::sync::Arc;

use cardsync_core::raw::TitleLookup;
use cardsync_core::EntityId;

use crate::{
    EventSink, RequestError, Services, SyncConfig, SyncError, SyncEvent, TitleKey, TitleStore,
    Transport,
};

/// Maps slugs to numeric title ids through the single-title lookup.
pub struct IdResolver {
    transport: Arc<dyn Transport>,
    store: Arc<dyn TitleStore>,
    sink: Arc<dyn EventSink>,
    config: SyncConfig,
}

impl IdResolver {
    pub fn new(services: &Services, config: SyncConfig) -> Self {
        Self {
            transport: services.transport.clone(),
            store: services.store.clone(),
            sink: services.sink.clone(),
            config,
        }
    }

    pub async fn resolve(&self, slug: &str) -> Result<EntityId, SyncError> {
        let url = self.config.title_url(slug);
        let response = self
            .transport
            .get(&url)
            .await
            .map_err(|err| self.failed(RequestError::transport(&url, &err)))?;

        match response.status {
            200 => response
                .json::<TitleLookup>()
                .map(|lookup| lookup.id())
                .map_err(|err| self.failed(RequestError::body(&url, &err))),
            404 => {
                // Only for display: the title is gone remotely either way.
                let known_id = self
                    .store
                    .open(&TitleKey::Slug(slug.to_string()))
                    .ok()
                    .and_then(|record| record.id());
                self.sink.emit(SyncEvent::TitleNotFound {
                    slug: slug.to_string(),
                    known_id,
                });
                Err(SyncError::TitleNotFound {
                    slug: slug.to_string(),
                    known_id,
                })
            }
            status => {
                let note = if self.config.authorized {
                    ""
                } else {
                    " Authorization may be required."
                };
                Err(self.failed(RequestError::status(
                    &url,
                    status,
                    format!("unable to convert slug \"{slug}\" to id.{note}"),
                )))
            }
        }
    }

    fn failed(&self, err: RequestError) -> SyncError {
        self.sink.emit(SyncEvent::RequestFailed(err.clone()));
        SyncError::RequestFailed(err)
    }
}
