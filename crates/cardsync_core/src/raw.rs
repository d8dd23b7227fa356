//! Wire records as returned by the catalog API. Unknown fields are ignored.
use serde::Deserialize;

use crate::{CardId, EntityId};

/// One page of any paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default)]
    pub results: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawCard {
    pub id: CardId,
    pub rank: String,
    #[serde(default)]
    pub description: Option<String>,
    pub cover: RawCover,
    pub author: RawAuthor,
    #[serde(default)]
    pub character: Option<RawCharacter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawCover {
    pub high: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawAuthor {
    pub id: u64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawCharacter {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "another_names")]
    pub alternate_names: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Entry of the global catalog feed, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogCard {
    pub id: CardId,
    #[serde(default)]
    pub title: Option<CatalogTitle>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogTitle {
    pub dir: String,
}

/// Body of the single-title lookup. Some deployments wrap the record in `content`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TitleLookup {
    Flat { id: EntityId },
    Nested { content: TitleLookupContent },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TitleLookupContent {
    pub id: EntityId,
}

impl TitleLookup {
    pub fn id(&self) -> EntityId {
        match self {
            TitleLookup::Flat { id } => *id,
            TitleLookup::Nested { content } => content.id,
        }
    }
}
