use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use cardsync_engine::{OutputMode, SyncConfig, TransportSettings, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};

use crate::cli::LogDestination;

/// Contents of the RON settings file. Every field is optional on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub site_url: String,
    /// Defaults to `{site_url}/media/`.
    pub media_base_url: Option<String>,
    pub page_size: u32,
    pub delay_ms: u64,
    pub output_mode: OutputMode,
    pub use_id_as_filename: bool,
    /// Root of the titles, images, cards and temp directories.
    pub data_dir: PathBuf,
    pub titles_dir: Option<PathBuf>,
    pub images_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub temp_dir: Option<PathBuf>,
    pub collection_file: Option<PathBuf>,
    pub token: Option<String>,
    pub referer: Option<String>,
    pub proxy: Option<String>,
    pub retries: u32,
    pub retry_backoff_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_body_bytes: u64,
    pub log: LogDestination,
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let transport = TransportSettings::default();
        Self {
            site_url: "https://remanga.org".to_string(),
            media_base_url: None,
            page_size: DEFAULT_PAGE_SIZE,
            delay_ms: 1000,
            output_mode: OutputMode::default(),
            use_id_as_filename: false,
            data_dir: PathBuf::from("."),
            titles_dir: None,
            images_dir: None,
            output_dir: None,
            temp_dir: None,
            collection_file: None,
            token: None,
            referer: Some("https://remanga.org/".to_string()),
            proxy: None,
            retries: transport.retries,
            retry_backoff_ms: transport.retry_backoff.as_millis() as u64,
            connect_timeout_secs: transport.connect_timeout.as_secs(),
            request_timeout_secs: transport.request_timeout.as_secs(),
            max_body_bytes: transport.max_bytes,
            log: LogDestination::Terminal,
            log_file: PathBuf::from("./cardsync.log"),
        }
    }
}

impl Settings {
    /// A missing file yields the defaults; an unreadable or malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read settings {path:?}"))
            }
        };
        ron::from_str(&content).with_context(|| format!("failed to parse settings {path:?}"))
    }

    pub fn sync_config(&self) -> SyncConfig {
        let mut config = SyncConfig::default_with_root(self.site_url.clone(), &self.data_dir);
        if let Some(media) = &self.media_base_url {
            config.media_base_url = media.clone();
        }
        config.page_size = self.page_size;
        config.delay = Duration::from_millis(self.delay_ms);
        config.output_mode = self.output_mode;
        config.use_id_as_filename = self.use_id_as_filename;
        override_path(&mut config.titles_dir, &self.titles_dir);
        override_path(&mut config.images_dir, &self.images_dir);
        override_path(&mut config.output_dir, &self.output_dir);
        override_path(&mut config.temp_dir, &self.temp_dir);
        override_path(&mut config.collection_file, &self.collection_file);
        config.authorized = self.token.as_deref().is_some_and(|t| !t.is_empty());
        config
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            token: self.token.clone().filter(|t| !t.is_empty()),
            referer: self.referer.clone(),
            retries: self.retries,
            retry_backoff: Duration::from_millis(self.retry_backoff_ms),
            proxy: self.proxy.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_body_bytes,
        }
    }
}

fn override_path(target: &mut PathBuf, value: &Option<PathBuf>) {
    if let Some(path) = value {
        *target = path.clone();
    }
}
