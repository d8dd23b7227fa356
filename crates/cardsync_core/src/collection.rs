use std::collections::HashSet;

use url::Url;

/// Parses collection file contents into slugs, first occurrence wins.
///
/// Lines may hold a bare slug or a title URL; blank lines and `#` comments
/// are skipped.
pub fn parse_collection(contents: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(slug_from_entry)
        .filter(|slug| seen.insert(slug.clone()))
        .collect()
}

fn slug_from_entry(entry: &str) -> Option<String> {
    match Url::parse(entry) {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.rev().find(|s| !s.is_empty()))
            .map(ToOwned::to_owned),
        Err(_) => Some(entry.to_string()),
    }
}
