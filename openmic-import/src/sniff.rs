//! Delimiter and schema sniffing
//!
//! Turns decoded CSV text into a table with a canonical header: delimiter
//! detection (comma vs semicolon), Excel `sep=` directive handling, header
//! lowercasing, and the alias table that maps header spellings onto the
//! three logical columns. Parsing retries once with the alternate delimiter
//! before giving up.

use tracing::warn;

use crate::error::{ImportError, Result};

/// Accepted header spellings per logical column, in resolution order.
pub const ARTIST_ALIASES: &[&str] = &[
    "artist",
    "artista",
    "artist name",
    "autor",
    "author",
    "intérprete",
    "interprete",
];
pub const TITLE_ALIASES: &[&str] = &[
    "title",
    "cancion",
    "canción",
    "song title",
    "tema",
    "name",
    "song name",
];
pub const STYLE_ALIASES: &[&str] = &["styles", "style", "genre", "genres", "genero", "género"];

/// Parsed CSV: lowercased/trimmed header names plus index-aligned row cells.
#[derive(Debug)]
pub struct CsvTable {
    pub fields: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Count semicolons vs commas in the header line; semicolon wins only when
/// strictly more frequent, comma is the default.
pub fn detect_delimiter(header_line: &str) -> u8 {
    let semis = header_line.matches(';').count();
    let commas = header_line.matches(',').count();
    if semis > commas {
        b';'
    } else {
        b','
    }
}

/// Drop a leading Excel `sep=X` directive line if present.
///
/// Returns the remaining text and, when the directive names one of the two
/// supported delimiters, that delimiter.
pub fn strip_sep_directive(text: &str) -> (&str, Option<u8>) {
    let line_end = text.find('\n').map(|i| i + 1).unwrap_or(text.len());
    // trim_start only: the declared char itself may be a tab
    let line = text[..line_end].trim_end_matches(['\r', '\n']).trim_start();

    let is_directive = line
        .get(..4)
        .map(|prefix| prefix.eq_ignore_ascii_case("sep="))
        .unwrap_or(false)
        && line[4..].chars().count() == 1;
    if !is_directive {
        return (text, None);
    }

    let declared = match line[4..].chars().next() {
        Some(';') => Some(b';'),
        Some(',') => Some(b','),
        _ => None,
    };
    (&text[line_end..], declared)
}

/// Tokenize the text into header + rows with the given delimiter.
///
/// `"` is quote with doubled-quote escape; fully blank rows are skipped;
/// ragged rows are tolerated, with cells beyond the header folded back into
/// the last column (an unquoted delimiter inside a trailing style list is
/// the common case).
pub fn parse_rows(text: &str, delimiter: u8) -> Result<CsvTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let fields: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
        if !fields.is_empty() && cells.len() > fields.len() {
            let extras = cells.split_off(fields.len() - 1);
            cells.push(extras.join(&(delimiter as char).to_string()));
        }
        rows.push(cells);
    }

    Ok(CsvTable { fields, rows })
}

/// Parse with the detected (or declared) delimiter; if the header lacks a
/// title-like or artist-like column, or no rows survive, retry once with the
/// alternate delimiter. Still unusable is fatal: nothing gets imported.
pub fn sniff_table(text: &str, declared: Option<u8>) -> Result<(CsvTable, u8)> {
    let header_line = text.lines().next().unwrap_or("");
    let primary = declared.unwrap_or_else(|| detect_delimiter(header_line));

    let table = parse_rows(text, primary)?;
    if table_is_usable(&table) {
        return Ok((table, primary));
    }

    let alternate = if primary == b',' { b';' } else { b',' };
    warn!(
        "No usable schema with delimiter {:?}, retrying with {:?}",
        primary as char, alternate as char
    );
    let table = parse_rows(text, alternate)?;
    if table_is_usable(&table) {
        return Ok((table, alternate));
    }

    Err(ImportError::Schema(
        "no title/artist columns detected with ',' or ';' delimiters".to_string(),
    ))
}

fn table_is_usable(table: &CsvTable) -> bool {
    !table.rows.is_empty()
        && has_column(&table.fields, ARTIST_ALIASES)
        && has_column(&table.fields, TITLE_ALIASES)
}

fn has_column(fields: &[String], aliases: &[&str]) -> bool {
    aliases.iter().any(|a| fields.iter().any(|f| f == a))
}

/// Resolve a logical column for one row: the first alias that exists in the
/// header and holds a non-empty value wins.
pub fn resolve_field<'a>(fields: &[String], row: &'a [String], aliases: &[&str]) -> Option<&'a str> {
    for alias in aliases {
        if let Some(idx) = fields.iter().position(|f| f == alias) {
            if let Some(value) = row.get(idx) {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
    }
    None
}
