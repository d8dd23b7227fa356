//! Cardsync core: card records, normalization and run planning. No IO.
mod collection;
mod model;
mod normalize;
mod plan;
pub mod raw;
mod summary;
mod text;

pub use collection::parse_collection;
pub use model::{
    CanonicalCard, CardAuthor, CardId, CardImage, Character, EntityCardSet, EntityId,
};
pub use normalize::{card_image, normalize_card, normalize_rank};
pub use plan::{resume_point, ResumePoint, RunRequest, TargetSource};
pub use summary::{ItemOutcome, RunSummary};
pub use text::{clean_description, html_to_plain_text, zerotify};
