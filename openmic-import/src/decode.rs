//! CSV byte decoding
//!
//! Catalog CSVs arrive from Excel and assorted editors as UTF-8 (with or
//! without BOM), UTF-16 in either endianness, or Windows-1252. Detection
//! order: BOM, NUL-density heuristic, UTF-8 probe with Windows-1252
//! fallback. A forced encoding bypasses every heuristic.

use openmic_common::{Error, Result};

/// Sample window for the NUL-density heuristic.
const SNIFF_LEN: usize = 512;
/// Share of NUL bytes in the sample that implies BOM-less UTF-16LE.
const NUL_RATIO: f64 = 0.10;

/// Encoding selection for the CSV reader (`CSV_ENCODING` / `--encoding`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForcedEncoding {
    #[default]
    Auto,
    Utf8,
    Windows1252,
    Utf16Le,
    Utf16Be,
}

impl ForcedEncoding {
    /// Parse a configuration value; accepts the usual label spellings.
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "auto" => Ok(ForcedEncoding::Auto),
            "utf8" | "utf-8" => Ok(ForcedEncoding::Utf8),
            "latin1" | "win1252" | "windows-1252" => Ok(ForcedEncoding::Windows1252),
            "utf16le" | "utf-16le" => Ok(ForcedEncoding::Utf16Le),
            "utf16be" | "utf-16be" => Ok(ForcedEncoding::Utf16Be),
            other => Err(Error::Config(format!("unknown CSV encoding '{}'", other))),
        }
    }
}

/// Decode raw CSV bytes to a String.
///
/// With `ForcedEncoding::Auto`:
/// 1. BOM: UTF-8 (EF BB BF), UTF-16LE (FF FE), UTF-16BE (FE FF)
/// 2. No BOM, >10% NULs in the first 512 bytes: UTF-16LE
/// 3. Else UTF-8; a replacement character in the result means the bytes were
///    not valid UTF-8, so decode as Windows-1252 instead
pub fn decode(bytes: &[u8], forced: ForcedEncoding) -> String {
    match forced {
        ForcedEncoding::Utf8 => {
            return String::from_utf8_lossy(strip_utf8_bom(bytes)).into_owned();
        }
        ForcedEncoding::Windows1252 => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            return decoded.into_owned();
        }
        ForcedEncoding::Utf16Le => {
            let (decoded, _) = encoding_rs::UTF_16LE.decode_with_bom_removal(bytes);
            return decoded.into_owned();
        }
        ForcedEncoding::Utf16Be => {
            let (decoded, _) = encoding_rs::UTF_16BE.decode_with_bom_removal(bytes);
            return decoded.into_owned();
        }
        ForcedEncoding::Auto => {}
    }

    // UTF-8 BOM
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8_lossy(&bytes[3..]).into_owned();
    }

    // UTF-16 LE BOM
    if bytes.starts_with(&[0xFF, 0xFE]) {
        let (decoded, _, _) = encoding_rs::UTF_16LE.decode(&bytes[2..]);
        return decoded.into_owned();
    }

    // UTF-16 BE BOM
    if bytes.starts_with(&[0xFE, 0xFF]) {
        let (decoded, _, _) = encoding_rs::UTF_16BE.decode(&bytes[2..]);
        return decoded.into_owned();
    }

    // BOM-less UTF-16LE of mostly-ASCII text shows up as NUL-heavy bytes
    let sample = &bytes[..bytes.len().min(SNIFF_LEN)];
    if !sample.is_empty() {
        let nuls = sample.iter().filter(|b| **b == 0).count();
        if nuls as f64 / sample.len() as f64 > NUL_RATIO {
            let (decoded, _, _) = encoding_rs::UTF_16LE.decode(bytes);
            return decoded.into_owned();
        }
    }

    let utf8 = String::from_utf8_lossy(bytes);
    if utf8.contains('\u{FFFD}') {
        let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
        return decoded.into_owned();
    }
    utf8.into_owned()
}

fn strip_utf8_bom(bytes: &[u8]) -> &[u8] {
    bytes
        .strip_prefix([0xEF, 0xBB, 0xBF].as_slice())
        .unwrap_or(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le_bytes(text: &str, bom: bool) -> Vec<u8> {
        let mut out = if bom { vec![0xFF, 0xFE] } else { Vec::new() };
        for unit in text.encode_utf16() {
            out.extend_from_slice(&unit.to_le_bytes());
        }
        out
    }

    #[test]
    fn plain_utf8() {
        assert_eq!(decode("Café Tacvba".as_bytes(), ForcedEncoding::Auto), "Café Tacvba");
    }

    #[test]
    fn utf8_with_bom() {
        let mut input = vec![0xEF, 0xBB, 0xBF];
        input.extend_from_slice("Fito Páez".as_bytes());
        assert_eq!(decode(&input, ForcedEncoding::Auto), "Fito Páez");
    }

    #[test]
    fn utf16_le_with_bom() {
        let input = utf16le_bytes("Canción;Título", true);
        assert_eq!(decode(&input, ForcedEncoding::Auto), "Canción;Título");
    }

    #[test]
    fn utf16_be_with_bom() {
        let mut input = vec![0xFE, 0xFF];
        for unit in "Canción".encode_utf16() {
            input.extend_from_slice(&unit.to_be_bytes());
        }
        assert_eq!(decode(&input, ForcedEncoding::Auto), "Canción");
    }

    #[test]
    fn bomless_utf16_le_detected_by_nul_density() {
        let input = utf16le_bytes("artist,title\nFito Paez,Mariposas", false);
        assert_eq!(
            decode(&input, ForcedEncoding::Auto),
            "artist,title\nFito Paez,Mariposas"
        );
    }

    #[test]
    fn windows_1252_fallback() {
        // "café" with e-acute as a single 0xE9 byte, invalid as UTF-8
        let input = b"caf\xe9";
        assert_eq!(decode(input, ForcedEncoding::Auto), "café");
    }

    #[test]
    fn forced_encoding_bypasses_heuristics() {
        let input = b"caf\xe9";
        assert_eq!(decode(input, ForcedEncoding::Windows1252), "café");
        assert!(decode(input, ForcedEncoding::Utf8).contains('\u{FFFD}'));

        let le = utf16le_bytes("hola", false);
        assert_eq!(decode(&le, ForcedEncoding::Utf16Le), "hola");
    }

    #[test]
    fn parses_encoding_labels() {
        assert_eq!(ForcedEncoding::parse("auto").unwrap(), ForcedEncoding::Auto);
        assert_eq!(ForcedEncoding::parse("UTF-8").unwrap(), ForcedEncoding::Utf8);
        assert_eq!(
            ForcedEncoding::parse("latin1").unwrap(),
            ForcedEncoding::Windows1252
        );
        assert_eq!(
            ForcedEncoding::parse(" utf16le ").unwrap(),
            ForcedEncoding::Utf16Le
        );
        assert!(ForcedEncoding::parse("ebcdic").is_err());
    }
}
