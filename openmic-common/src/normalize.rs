//! Text normalization
//!
//! Converts free-text (artist/title/style) into a canonical lowercase,
//! diacritic-free, whitespace-collapsed form used for deduplication and
//! case/accent-insensitive search. Display text keeps its original casing;
//! only the *_norm columns store canonical forms.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonicalize a string for matching and deduplication.
///
/// Algorithm: flatten ligatures (ß→ss, æ→ae, œ→oe, uppercase forms included),
/// lowercase, decompose (NFD), strip combining marks, replace anything that is
/// not a letter, number or whitespace with a space, collapse whitespace, trim.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let mut flat = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'ß' | 'ẞ' => flat.push_str("ss"),
            'æ' | 'Æ' => flat.push_str("ae"),
            'œ' | 'Œ' => flat.push_str("oe"),
            _ => flat.extend(c.to_lowercase()),
        }
    }

    let mut out = String::with_capacity(flat.len());
    for c in flat.nfd() {
        if is_combining_mark(c) {
            continue;
        }
        if c.is_alphanumeric() {
            out.push(c);
        } else if !out.is_empty() && !out.ends_with(' ') {
            // Punctuation and whitespace both collapse to one separator
            out.push(' ');
        }
    }
    out.truncate(out.trim_end().len());
    out
}

/// Normalize an optional value; absent input is the empty string.
pub fn normalize_opt(text: Option<&str>) -> String {
    match text {
        Some(t) => normalize(t),
        None => String::new(),
    }
}

/// Escape `LIKE` metacharacters so normalized query text matches literally.
///
/// Paired with `LIKE ... ESCAPE '\'` in the catalog queries. Normalized text
/// contains no `%`/`_`, so this mostly guards raw caller input.
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Clean display text without canonicalizing it.
///
/// Collapses whitespace runs (including non-breaking spaces) to one space and
/// trims. Case, accents and punctuation are preserved; used on request fields
/// before validation.
pub fn clean_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_whitespace() {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
        } else {
            out.push(c);
        }
    }
    out.truncate(out.trim_end().len());
    out
}
