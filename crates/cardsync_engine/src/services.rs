use std::sync::Arc;

use crate::{
    EventSink, FileNaming, FixedDelay, JsonTitleStore, LogSink, Pacer, ReqwestTransport,
    SyncConfig, TitleStore, Transport, TransportError, TransportSettings,
};

/// Collaborators shared by every component of a run.
#[derive(Clone)]
pub struct Services {
    pub transport: Arc<dyn Transport>,
    pub store: Arc<dyn TitleStore>,
    pub pacer: Arc<dyn Pacer>,
    pub sink: Arc<dyn EventSink>,
}

impl Services {
    /// Reqwest transport, JSON title store, fixed delay and log reporting.
    pub fn standard(
        config: &SyncConfig,
        transport: TransportSettings,
    ) -> Result<Self, TransportError> {
        let naming = if config.use_id_as_filename {
            FileNaming::Id
        } else {
            FileNaming::Slug
        };
        Ok(Self {
            transport: Arc::new(ReqwestTransport::new(transport)?),
            store: Arc::new(JsonTitleStore::new(config.titles_dir.clone(), naming)),
            pacer: Arc::new(FixedDelay::new(config.delay)),
            sink: Arc::new(LogSink),
        })
    }
}
