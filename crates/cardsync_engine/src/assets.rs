use std::path::Path;
use std::sync::Arc;

use cardsync_core::CanonicalCard;
use thiserror::Error;

use crate::persist::{ensure_output_dir, file_names, has_entries, reset_dir};
use crate::{
    AtomicFileWriter, EventSink, ImageOutcome, ImageStatus, Pacer, PersistError, Services,
    SyncEvent, Transport, TransportError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    Saved { bytes: u64 },
    AlreadyExists,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("refusing to write image as \"{0}\"")]
    InvalidFilename(String),
    #[error("{0}")]
    Transport(#[from] TransportError),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("{0}")]
    Persist(#[from] PersistError),
}

/// Fetches one image into a directory unless a file of that name is already there.
pub struct ImageDownloader {
    transport: Arc<dyn Transport>,
}

impl ImageDownloader {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn download(
        &self,
        url: &str,
        dir: &Path,
        filename: &str,
    ) -> Result<DownloadStatus, DownloadError> {
        if !is_safe_filename(filename) {
            return Err(DownloadError::InvalidFilename(filename.to_string()));
        }
        if dir.join(filename).exists() {
            return Ok(DownloadStatus::AlreadyExists);
        }

        let response = self.transport.get(url).await?;
        if !response.is_ok() {
            return Err(DownloadError::HttpStatus(response.status));
        }
        AtomicFileWriter::new(dir).write_bytes(filename, &response.body)?;
        Ok(DownloadStatus::Saved {
            bytes: response.body.len() as u64,
        })
    }
}

fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains(['/', '\\', '\0'])
}

pub struct AssetSync {
    downloader: ImageDownloader,
    pacer: Arc<dyn Pacer>,
    sink: Arc<dyn EventSink>,
}

impl AssetSync {
    pub fn new(services: &Services) -> Self {
        Self {
            downloader: ImageDownloader::new(services.transport.clone()),
            pacer: services.pacer.clone(),
            sink: services.sink.clone(),
        }
    }

    /// Downloads every card image into `dir`, in listing order.
    ///
    /// Files already present are skipped without a request. With `force` a
    /// non-empty `dir` is wiped first. A failed download only affects its card.
    pub async fn sync_images(
        &self,
        dir: &Path,
        cards: &[CanonicalCard],
        force: bool,
    ) -> Result<Vec<ImageOutcome>, PersistError> {
        ensure_output_dir(dir)?;
        if force && has_entries(dir)? {
            reset_dir(dir)?;
            self.sink.emit(SyncEvent::ImagesWiped {
                dir: dir.display().to_string(),
            });
        }
        let existing = file_names(dir)?;

        let count = cards.len();
        let mut outcomes = Vec::with_capacity(count);
        for (index, card) in cards.iter().enumerate() {
            let filename = &card.image.filename;
            let status = if existing.contains(filename) {
                ImageStatus::AlreadyExists
            } else {
                match self.downloader.download(&card.image.link, dir, filename).await {
                    Ok(DownloadStatus::Saved { bytes }) => ImageStatus::Downloaded { bytes },
                    Ok(DownloadStatus::AlreadyExists) => ImageStatus::AlreadyExists,
                    Err(err) => ImageStatus::Failed(err.to_string()),
                }
            };

            self.sink.emit(SyncEvent::Image {
                index: index + 1,
                count,
                filename: filename.clone(),
                status: status.clone(),
            });
            let downloaded = matches!(status, ImageStatus::Downloaded { .. });
            outcomes.push(ImageOutcome {
                card_id: card.id,
                filename: filename.clone(),
                status,
            });
            if downloaded && index + 1 < count {
                self.pacer.pause().await;
            }
        }

        Ok(outcomes)
    }
}
