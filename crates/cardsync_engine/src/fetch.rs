use std::sync::Arc;

use cardsync_core::raw::{Page, RawCard};
use cardsync_core::EntityId;
use sync_logging::sync_debug;

use crate::{
    EventSink, Pacer, PageScope, RequestError, Services, SyncConfig, SyncEvent, Transport,
};

/// Raw cards of one title. A listing cut short by a failed request keeps the
/// pages read before it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchedCards {
    pub cards: Vec<RawCard>,
    pub requests: u32,
    pub interrupted: Option<RequestError>,
}

pub struct CardFetcher {
    transport: Arc<dyn Transport>,
    pacer: Arc<dyn Pacer>,
    sink: Arc<dyn EventSink>,
    config: SyncConfig,
}

impl CardFetcher {
    pub fn new(services: &Services, config: SyncConfig) -> Self {
        Self {
            transport: services.transport.clone(),
            pacer: services.pacer.clone(),
            sink: services.sink.clone(),
            config,
        }
    }

    /// Reads pages from 1 until an empty page or a 404.
    pub async fn fetch_all(&self, entity_id: EntityId) -> FetchedCards {
        let mut fetched = FetchedCards::default();
        let mut page = 1;

        loop {
            let url = self.config.cards_url(entity_id, page);
            fetched.requests += 1;
            let response = match self.transport.get(&url).await {
                Ok(response) => response,
                Err(err) => {
                    self.interrupt(&mut fetched, RequestError::transport(&url, &err));
                    break;
                }
            };

            match response.status {
                200 => {}
                404 => {
                    sync_debug!("Cards listing of {} ended with 404 on page {}", entity_id, page);
                    break;
                }
                status => {
                    let err = RequestError::status(&url, status, "unable to request cards info");
                    self.interrupt(&mut fetched, err);
                    break;
                }
            }

            let results = match response.json::<Page<RawCard>>() {
                Ok(body) => body.results,
                Err(err) => {
                    self.interrupt(&mut fetched, RequestError::body(&url, &err));
                    break;
                }
            };
            if results.is_empty() {
                break;
            }

            self.sink.emit(SyncEvent::PageParsed {
                scope: PageScope::Cards { entity_id },
                page,
                count: results.len(),
            });
            fetched.cards.extend(results);
            page += 1;
            self.pacer.pause().await;
        }

        fetched
    }

    fn interrupt(&self, fetched: &mut FetchedCards, err: RequestError) {
        self.sink.emit(SyncEvent::RequestFailed(err.clone()));
        fetched.interrupted = Some(err);
    }
}
