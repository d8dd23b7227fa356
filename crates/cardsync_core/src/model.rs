use serde::{Deserialize, Serialize};

pub type CardId = u64;
pub type EntityId = u64;

/// A card in its canonical shape, as persisted next to its title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalCard {
    pub id: CardId,
    pub rank: String,
    pub description: Option<String>,
    pub image: CardImage,
    pub author: CardAuthor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character: Option<Character>,
}

/// `filename` is derived from the cover path, so it doubles as the on-disk dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardImage {
    pub link: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardAuthor {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub alternate_names: Vec<String>,
    pub description: Option<String>,
}

/// All cards of one entity in server listing order, pages concatenated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCardSet {
    pub entity_id: EntityId,
    pub entity_slug: String,
    pub cards: Vec<CanonicalCard>,
}

impl EntityCardSet {
    pub fn new(entity_id: EntityId, entity_slug: impl Into<String>) -> Self {
        Self {
            entity_id,
            entity_slug: entity_slug.into(),
            cards: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
