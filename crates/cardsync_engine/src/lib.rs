//! Cardsync engine: incremental card catalog sync over HTTP into local storage.
mod assets;
mod config;
mod error;
mod events;
mod fetch;
mod orchestrator;
mod pacer;
mod persist;
mod pipeline;
mod resolve;
mod services;
mod store;
mod transport;
mod types;
mod watermark;

pub use assets::{AssetSync, DownloadError, DownloadStatus, ImageDownloader};
pub use config::{Clock, OutputMode, SyncConfig, DEFAULT_PAGE_SIZE};
pub use error::{RunAborted, SyncError};
pub use events::{format_elapsed, EventSink, LogSink};
pub use fetch::{CardFetcher, FetchedCards};
pub use orchestrator::Orchestrator;
pub use pacer::{FixedDelay, Pacer};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{CardSync, STANDALONE_FILENAME};
pub use resolve::IdResolver;
pub use services::Services;
pub use store::{
    FileNaming, JsonTitleStore, StoreError, TitleKey, TitleRecord, TitleStore, SUPPORTED_FORMAT,
};
pub use transport::{ReqwestTransport, Transport, TransportSettings};
pub use types::{
    FailureKind, HttpResponse, ImageOutcome, ImageStatus, PageScope, RequestError, SyncEvent,
    TransportError,
};
pub use watermark::WatermarkTracker;
