//! Song catalog model
//!
//! Songs are created and updated only by the batch importer; the live API
//! reads them. The unique key is `(artist_norm, title_norm)`.

use serde::{Deserialize, Serialize};

use crate::normalize::normalize;

/// A catalog entry ready to upsert.
///
/// Carries the display fields plus their canonical projections. `styles` is
/// the surface list (first-seen casing), `styles_norm` the deduplicated
/// canonical list; both are stored as JSON arrays in TEXT columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SongEntry {
    pub artist: String,
    pub title: String,
    pub styles: Vec<String>,
    pub artist_norm: String,
    pub title_norm: String,
    pub styles_norm: Vec<String>,
}

impl SongEntry {
    /// Build an entry from display text, computing the canonical columns.
    pub fn new(artist: &str, title: &str, raw_styles: Vec<String>) -> Self {
        let (styles, styles_norm) = dedupe_styles(raw_styles);
        SongEntry {
            artist: artist.to_string(),
            title: title.to_string(),
            styles,
            artist_norm: normalize(artist),
            title_norm: normalize(title),
            styles_norm,
        }
    }
}

/// Deduplicate a style list by normalized form.
///
/// Two raw styles that normalize identically collapse to one entry; the
/// surface list keeps the first-seen casing. Styles that normalize to the
/// empty string are dropped entirely.
pub fn dedupe_styles(raw: Vec<String>) -> (Vec<String>, Vec<String>) {
    let mut styles = Vec::new();
    let mut styles_norm: Vec<String> = Vec::new();
    for s in raw {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            continue;
        }
        let norm = normalize(trimmed);
        if norm.is_empty() || styles_norm.contains(&norm) {
            continue;
        }
        styles.push(trimmed.to_string());
        styles_norm.push(norm);
    }
    (styles, styles_norm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computes_canonical_columns() {
        let entry = SongEntry::new(
            "Fitø Páez",
            "Mariposa Tecknicolor",
            vec!["Rock".to_string(), "Pop Latino".to_string()],
        );
        assert_eq!(entry.artist, "Fitø Páez");
        assert_eq!(entry.artist_norm, "fito paez");
        assert_eq!(entry.title_norm, "mariposa tecknicolor");
        assert_eq!(entry.styles, vec!["Rock", "Pop Latino"]);
        assert_eq!(entry.styles_norm, vec!["rock", "pop latino"]);
    }

    #[test]
    fn styles_dedupe_by_normalized_form() {
        let (styles, norm) = dedupe_styles(vec![
            "Rock".to_string(),
            "  rock ".to_string(),
            "ROCK".to_string(),
            "Cumbia".to_string(),
        ]);
        assert_eq!(styles, vec!["Rock", "Cumbia"]);
        assert_eq!(norm, vec!["rock", "cumbia"]);
    }

    #[test]
    fn empty_and_symbol_only_styles_are_dropped() {
        let (styles, norm) = dedupe_styles(vec![
            "".to_string(),
            "   ".to_string(),
            "!!!".to_string(),
            "Salsa".to_string(),
        ]);
        assert_eq!(styles, vec!["Salsa"]);
        assert_eq!(norm, vec!["salsa"]);
    }
}
