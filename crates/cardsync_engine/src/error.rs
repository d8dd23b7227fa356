use std::io;
use std::path::PathBuf;

use cardsync_core::{EntityId, ItemOutcome, RunSummary};
use thiserror::Error;

use crate::{PersistError, RequestError, StoreError};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("title \"{slug}\" not found")]
    TitleNotFound {
        slug: String,
        known_id: Option<EntityId>,
    },
    #[error("request failed: {0}")]
    RequestFailed(#[from] RequestError),
    #[error("local store error: {0}")]
    Store(#[from] StoreError),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("failed to encode cards: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("unable to read collection file {path:?}: {source}")]
    Collection { path: PathBuf, source: io::Error },
}

impl SyncError {
    /// Counter for failures that end one title but not the run; `None` aborts.
    pub fn outcome(&self) -> Option<ItemOutcome> {
        match self {
            SyncError::TitleNotFound { .. } => Some(ItemOutcome::NotFound),
            SyncError::RequestFailed(_) => Some(ItemOutcome::Errored),
            _ => None,
        }
    }
}

/// A run stopped by a failure outside the recoverable kinds.
#[derive(Debug, Error)]
#[error("run aborted ({summary}): {source}")]
pub struct RunAborted {
    pub summary: RunSummary,
    #[source]
    pub source: SyncError,
}
