use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use cardsync_core::EntityId;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 30;
const WATERMARK_FILENAME: &str = "last_card_id.txt";

/// Where normalized cards end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputMode {
    /// Written into the `cards` field of the local title record.
    #[default]
    Merged,
    /// Written to `{output_dir}/{key}/cards.json` beside an `images/` directory.
    Standalone,
}

pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct SyncConfig {
    /// Scheme and host of the catalog API, e.g. `https://example.org`.
    pub site_url: String,
    pub media_base_url: String,
    pub page_size: u32,
    /// Pause between successive requests.
    pub delay: Duration,
    pub output_mode: OutputMode,
    /// Key titles on disk by numeric id instead of slug.
    pub use_id_as_filename: bool,
    pub titles_dir: PathBuf,
    pub images_dir: PathBuf,
    pub output_dir: PathBuf,
    pub temp_dir: PathBuf,
    pub collection_file: PathBuf,
    /// An auth token is configured on the transport.
    pub authorized: bool,
    /// Timestamp written into standalone documents.
    pub synced_utc: Clock,
}

impl SyncConfig {
    /// All directories laid out under `root`.
    pub fn default_with_root(site_url: impl Into<String>, root: &Path) -> Self {
        let site_url = site_url.into().trim_end_matches('/').to_string();
        Self {
            media_base_url: format!("{site_url}/media/"),
            site_url,
            page_size: DEFAULT_PAGE_SIZE,
            delay: Duration::from_secs(1),
            output_mode: OutputMode::Merged,
            use_id_as_filename: false,
            titles_dir: root.join("titles"),
            images_dir: root.join("images"),
            output_dir: root.join("cards"),
            temp_dir: root.join("temp"),
            collection_file: root.join("Collection.txt"),
            authorized: false,
            synced_utc: Arc::new(|| chrono::Utc::now().to_rfc3339()),
        }
    }

    pub fn title_url(&self, slug: &str) -> String {
        format!("{}/api/v2/titles/{}/", self.site_url, slug)
    }

    pub fn cards_url(&self, entity_id: EntityId, page: u32) -> String {
        format!(
            "{}/api/inventory/{}/cards/?count={}&page={}",
            self.site_url, entity_id, self.page_size, page
        )
    }

    pub fn catalog_url(&self, page: u32) -> String {
        format!(
            "{}/api/v2/inventory/catalog/?count={}&ordering=-id&page={}",
            self.site_url, self.page_size, page
        )
    }

    pub fn watermark_path(&self) -> PathBuf {
        self.temp_dir.join(WATERMARK_FILENAME)
    }
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("site_url", &self.site_url)
            .field("media_base_url", &self.media_base_url)
            .field("page_size", &self.page_size)
            .field("delay", &self.delay)
            .field("output_mode", &self.output_mode)
            .field("use_id_as_filename", &self.use_id_as_filename)
            .field("titles_dir", &self.titles_dir)
            .field("images_dir", &self.images_dir)
            .field("output_dir", &self.output_dir)
            .field("temp_dir", &self.temp_dir)
            .field("collection_file", &self.collection_file)
            .field("authorized", &self.authorized)
            .finish_non_exhaustive()
    }
}
