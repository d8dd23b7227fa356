use crate::raw::{RawCard, RawCharacter};
use crate::text::clean_description;
use crate::{CanonicalCard, CardAuthor, CardImage, Character};

const RANK_PREFIX: &str = "rank_";

/// Turns a raw listing record into its canonical shape. Pure and total on
/// well-formed input.
pub fn normalize_card(raw: &RawCard, media_base_url: &str) -> CanonicalCard {
    CanonicalCard {
        id: raw.id,
        rank: normalize_rank(&raw.rank),
        description: clean_description(raw.description.as_deref()),
        image: card_image(&raw.cover.high, media_base_url),
        author: CardAuthor {
            id: raw.author.id,
            name: raw.author.username.clone(),
        },
        character: raw.character.as_ref().map(normalize_character),
    }
}

pub fn normalize_rank(rank: &str) -> String {
    rank.strip_prefix(RANK_PREFIX).unwrap_or(rank).to_uppercase()
}

/// Link is `media_base_url` joined with the cover path; filename is the last
/// segment of the cover path itself.
pub fn card_image(cover_path: &str, media_base_url: &str) -> CardImage {
    let link = format!(
        "{}/{}",
        media_base_url.trim_end_matches('/'),
        cover_path.trim_start_matches('/')
    );
    let filename = cover_path
        .rsplit('/')
        .next()
        .unwrap_or(cover_path)
        .to_string();
    CardImage { link, filename }
}

fn normalize_character(raw: &RawCharacter) -> Character {
    Character {
        id: raw.id,
        name: raw.name.clone(),
        alternate_names: raw.alternate_names.clone().unwrap_or_default(),
        description: clean_description(raw.description.as_deref()),
    }
}
