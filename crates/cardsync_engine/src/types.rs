use std::fmt;
use std::time::Duration;

use cardsync_core::{CardId, EntityId, RunSummary};
use serde::de::DeserializeOwned;

/// Status and body of a completed HTTP exchange. Non-2xx is not an error here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// The request never produced a status code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransportError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransportError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn is_retryable(&self) -> bool {
        matches!(self.kind, FailureKind::Timeout | FailureKind::Network)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Configuration,
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Configuration => write!(f, "invalid client configuration"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// A listing or lookup request that did not yield usable data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} ({url}{})", status_note(.status))]
pub struct RequestError {
    pub url: String,
    pub status: Option<u16>,
    pub message: String,
}

fn status_note(status: &Option<u16>) -> String {
    status.map(|code| format!(", status {code}")).unwrap_or_default()
}

impl RequestError {
    pub fn status(url: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn transport(url: impl Into<String>, err: &TransportError) -> Self {
        Self {
            url: url.into(),
            status: None,
            message: err.to_string(),
        }
    }

    pub fn body(url: impl Into<String>, err: &serde_json::Error) -> Self {
        Self {
            url: url.into(),
            status: Some(200),
            message: format!("unexpected response body: {err}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageStatus {
    Downloaded { bytes: u64 },
    AlreadyExists,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOutcome {
    pub card_id: CardId,
    pub filename: String,
    pub status: ImageStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageScope {
    Cards { entity_id: EntityId },
    Catalog,
}

/// Progress and diagnostics reported while syncing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    PageParsed {
        scope: PageScope,
        page: u32,
        count: usize,
    },
    RequestFailed(RequestError),
    TitleNotFound {
        slug: String,
        known_id: Option<EntityId>,
    },
    LocalRecordMissing {
        slug: String,
    },
    LocalRecordInvalid {
        slug: String,
        reason: String,
    },
    ParsingTitle {
        slug: String,
        entity_id: EntityId,
    },
    PartialListing {
        slug: String,
        kept: usize,
    },
    NoCards {
        slug: String,
    },
    TitleParsed {
        slug: String,
        card_count: usize,
    },
    TitleDone {
        slug: String,
        elapsed: Duration,
    },
    Image {
        index: usize,
        count: usize,
        filename: String,
        status: ImageStatus,
    },
    ImagesWiped {
        dir: String,
    },
    ItemStarted {
        index: usize,
        total: usize,
        slug: String,
    },
    TargetsCollected {
        count: usize,
        elapsed: Duration,
    },
    ResumeApplied {
        slug: String,
    },
    ResumeIgnored {
        slug: String,
    },
    ForceRedownload,
    FirstWatermarkScan,
    WatermarkSaved {
        card_id: CardId,
    },
    Summary(RunSummary),
}
