use std::time::Duration;

use sync_logging::{sync_error, sync_info, sync_warn};

use crate::{ImageStatus, PageScope, SyncEvent};

pub trait EventSink: Send + Sync {
    fn emit(&self, event: SyncEvent);
}

/// Renders events as log lines; the terminal reporter of the binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: SyncEvent) {
        match event {
            SyncEvent::PageParsed { scope, page, count } => match scope {
                PageScope::Cards { entity_id } => {
                    sync_info!("Cards page {} of title {} parsed ({} cards).", page, entity_id, count)
                }
                PageScope::Catalog => sync_info!("Catalog page {} parsed.", page),
            },
            SyncEvent::RequestFailed(err) => sync_error!("Request failed: {}", err),
            SyncEvent::TitleNotFound { slug, known_id } => match known_id {
                Some(id) => sync_warn!("Title \"{}\" (ID: {}) not found.", slug, id),
                None => sync_warn!("Title \"{}\" not found.", slug),
            },
            SyncEvent::LocalRecordMissing { slug } => {
                sync_warn!("JSON for \"{}\" not found. Parse it first.", slug)
            }
            SyncEvent::LocalRecordInvalid { slug, reason } => {
                sync_error!("Local record of \"{}\" skipped: {}", slug, reason)
            }
            SyncEvent::ParsingTitle { slug, entity_id } => {
                sync_info!("Parsing cards from \"{}\" (ID: {})...", slug, entity_id)
            }
            SyncEvent::PartialListing { slug, kept } => sync_warn!(
                "Card listing of \"{}\" interrupted, keeping {} cards.",
                slug,
                kept
            ),
            SyncEvent::NoCards { slug } => sync_info!("Title \"{}\" doesn't have any cards.", slug),
            SyncEvent::TitleParsed { slug, card_count } => {
                sync_info!("Cards in \"{}\" parsed: {}.", slug, card_count)
            }
            SyncEvent::TitleDone { slug, elapsed } => {
                sync_info!("\"{}\" done in {}.", slug, format_elapsed(elapsed))
            }
            SyncEvent::Image {
                index,
                count,
                filename,
                status,
            } => match status {
                ImageStatus::Downloaded { .. } => {
                    sync_info!("[{} / {}] Downloading \"{}\"... Done.", index, count, filename)
                }
                ImageStatus::AlreadyExists => sync_info!(
                    "[{} / {}] Downloading \"{}\"... Already exists.",
                    index,
                    count,
                    filename
                ),
                ImageStatus::Failed(reason) => sync_error!(
                    "[{} / {}] Downloading \"{}\"... Failed: {}",
                    index,
                    count,
                    filename,
                    reason
                ),
            },
            SyncEvent::ImagesWiped { dir } => sync_warn!("Existing images in {} deleted.", dir),
            SyncEvent::ItemStarted { index, total, slug } => {
                sync_info!("[{} / {}] {}", index + 1, total, slug)
            }
            SyncEvent::TargetsCollected { count, elapsed } => {
                sync_info!("{} titles collected in {}.", count, format_elapsed(elapsed))
            }
            SyncEvent::ResumeApplied { slug } => {
                sync_info!("Parsing will be started from \"{}\".", slug)
            }
            SyncEvent::ResumeIgnored { slug } => {
                sync_warn!("No starting slug \"{}\" in collection. Ignored.", slug)
            }
            SyncEvent::ForceRedownload => sync_warn!("Existing images will be deleted."),
            SyncEvent::FirstWatermarkScan => {
                sync_warn!("First updates scan. Collecting only one slug.")
            }
            SyncEvent::WatermarkSaved { card_id } => {
                sync_info!("Last seen card ID saved: {}.", card_id)
            }
            SyncEvent::Summary(summary) => sync_info!("Summary: {}.", summary),
        }
    }
}

pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 60.0 {
        format!("{secs:.2}s")
    } else {
        let whole = elapsed.as_secs();
        format!("{}m {}s", whole / 60, whole % 60)
    }
}
