use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use cardsync_core::{CanonicalCard, EntityId};
use serde_json::{Map, Value};
use sync_logging::{sync_debug, sync_warn};
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};

/// Schema tag understood by this tool; records without a tag are accepted.
pub const SUPPORTED_FORMAT: &str = "title-v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleKey {
    Slug(String),
    Id(EntityId),
}

impl fmt::Display for TitleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TitleKey::Slug(slug) => write!(f, "{slug}"),
            TitleKey::Id(id) => write!(f, "{id}"),
        }
    }
}

/// How record files are named on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileNaming {
    Slug,
    Id,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no local record for {0}")]
    NotFound(TitleKey),
    #[error("malformed local record {path:?}: {message}")]
    Malformed { path: PathBuf, message: String },
    #[error("unsupported record format \"{found}\" in {path:?}")]
    UnsupportedFormat { path: PathBuf, found: String },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A title document. Fields this tool does not own are carried through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleRecord {
    used_filename: String,
    data: Map<String, Value>,
}

impl TitleRecord {
    pub fn new(used_filename: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            used_filename: used_filename.into(),
            data,
        }
    }

    pub fn id(&self) -> Option<EntityId> {
        self.data.get("id").and_then(Value::as_u64)
    }

    pub fn slug(&self) -> Option<&str> {
        self.data.get("slug").and_then(Value::as_str)
    }

    /// File stem of the record; also the key of its image directory.
    pub fn used_filename(&self) -> &str {
        &self.used_filename
    }

    pub fn set_cards(&mut self, cards: &[CanonicalCard]) -> Result<(), serde_json::Error> {
        self.data.insert("cards".to_string(), serde_json::to_value(cards)?);
        Ok(())
    }
}

pub trait TitleStore: Send + Sync {
    fn open(&self, key: &TitleKey) -> Result<TitleRecord, StoreError>;
    fn save(&self, record: &TitleRecord) -> Result<(), StoreError>;
    /// Slugs of every stored title, sorted by file name.
    fn list_slugs(&self) -> Result<Vec<String>, StoreError>;
}

/// One pretty-printed JSON document per title in a flat directory.
#[derive(Debug, Clone)]
pub struct JsonTitleStore {
    dir: PathBuf,
    naming: FileNaming,
}

impl JsonTitleStore {
    pub fn new(dir: PathBuf, naming: FileNaming) -> Self {
        Self { dir, naming }
    }

    fn record_paths(&self) -> Result<Vec<PathBuf>, StoreError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut paths: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        paths.sort();
        Ok(paths)
    }

    fn scan(&self, key: &TitleKey) -> Result<TitleRecord, StoreError> {
        for path in self.record_paths()? {
            let record = match read_record(&path) {
                Ok(record) => record,
                Err(err) => {
                    sync_debug!("Skipping {:?} while looking up {}: {}", path, key, err);
                    continue;
                }
            };
            let matches = match key {
                TitleKey::Slug(slug) => record.slug() == Some(slug.as_str()),
                TitleKey::Id(id) => record.id() == Some(*id),
            };
            if matches {
                return Ok(record);
            }
        }
        Err(StoreError::NotFound(key.clone()))
    }
}

impl TitleStore for JsonTitleStore {
    fn open(&self, key: &TitleKey) -> Result<TitleRecord, StoreError> {
        let direct = matches!(
            (key, self.naming),
            (TitleKey::Slug(_), FileNaming::Slug) | (TitleKey::Id(_), FileNaming::Id)
        );
        if !direct {
            return self.scan(key);
        }
        match read_record(&self.dir.join(format!("{key}.json"))) {
            Err(StoreError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.clone()))
            }
            other => other,
        }
    }

    fn save(&self, record: &TitleRecord) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(&record.data)?;
        AtomicFileWriter::new(self.dir.clone())
            .write(&format!("{}.json", record.used_filename), &content)?;
        Ok(())
    }

    fn list_slugs(&self) -> Result<Vec<String>, StoreError> {
        let mut slugs = Vec::new();
        for path in self.record_paths()? {
            match self.naming {
                FileNaming::Slug => {
                    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                        slugs.push(stem.to_string());
                    }
                }
                FileNaming::Id => match read_record(&path) {
                    Ok(record) => match record.slug() {
                        Some(slug) => slugs.push(slug.to_string()),
                        None => sync_warn!("Local record {:?} has no slug.", path),
                    },
                    Err(err) => sync_warn!("Unable to read local record {:?}: {}", path, err),
                },
            }
        }
        Ok(slugs)
    }
}

fn read_record(path: &Path) -> Result<TitleRecord, StoreError> {
    let text = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&text).map_err(|err| StoreError::Malformed {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    let Value::Object(data) = value else {
        return Err(StoreError::Malformed {
            path: path.to_path_buf(),
            message: "record is not a JSON object".to_string(),
        });
    };
    if let Some(found) = data.get("format").and_then(Value::as_str) {
        if found != SUPPORTED_FORMAT {
            return Err(StoreError::UnsupportedFormat {
                path: path.to_path_buf(),
                found: found.to_string(),
            });
        }
    }
    let used_filename = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    Ok(TitleRecord::new(used_filename, data))
}
