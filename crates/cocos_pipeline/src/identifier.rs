//! Conversion between the editor's compact asset identifiers and canonical UUIDs.
//!
//! Three textual forms denote the same 128-bit value:
//!
//! * canonical: `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` (32 hex digits)
//! * compact22: the first 2 hex digits kept, the remaining 30 nibbles packed
//!   into 20 base64 characters (3 nibbles per character pair)
//! * compact23: the first 5 hex digits kept, the remaining 27 nibbles packed
//!   into 18 base64 characters
//!
//! A trailing `@<suffix>` names a sub-asset and is carried through every
//! conversion untouched.
//!
//! ```
//! use cocos_pipeline::identifier;
//!
//! let compact = identifier::to_compact22("fc991dd7-0033-4b80-9d41-c8a86a702e59").unwrap();
//! assert_eq!(compact, "fcmR3XADNLgJ1ByKhqcC5Z");
//! assert_eq!(
//!     identifier::decode("fcmR3XADNLgJ1ByKhqcC5Z@f9941").unwrap(),
//!     "fc991dd7-0033-4b80-9d41-c8a86a702e59@f9941"
//! );
//! ```

use crate::error::IdentifierError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;

const NIBBLES: usize = 32;
const COMPACT22_HEAD: usize = 2;
const COMPACT23_HEAD: usize = 5;
const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

static CANONICAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("canonical identifier pattern")
});

static COMPACT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9+/]{20,22}$").expect("compact identifier pattern")
});

/// Converts any supported form to canonical.
pub fn decode(input: &str) -> Result<String, IdentifierError> {
    let (body, suffix) = split_suffix(input);
    let nibbles = parse_any(body)?;
    Ok(attach(format_canonical(&nibbles), suffix))
}

/// Converts any supported form to compact23.
pub fn compress(input: &str) -> Result<String, IdentifierError> {
    let (body, suffix) = split_suffix(input);
    let nibbles = parse_any(body)?;
    Ok(attach(encode_compact(&nibbles, COMPACT23_HEAD), suffix))
}

/// Converts a compact23 (or any other supported) form back to canonical.
pub fn decompress(input: &str) -> Result<String, IdentifierError> {
    decode(input)
}

/// Converts any supported form to the editor's 22-character form.
pub fn to_compact22(input: &str) -> Result<String, IdentifierError> {
    let (body, suffix) = split_suffix(input);
    let nibbles = parse_any(body)?;
    Ok(attach(encode_compact(&nibbles, COMPACT22_HEAD), suffix))
}

/// True for a canonical identifier or a 20-22 character compact identifier.
///
/// An `@suffix` is ignored.
pub fn is_valid(input: &str) -> bool {
    let (body, _) = split_suffix(input);
    CANONICAL_RE.is_match(body) || COMPACT_RE.is_match(body)
}

/// A fresh random canonical identifier.
pub fn generate() -> String {
    uuid::Uuid::new_v4().hyphenated().to_string()
}

fn split_suffix(input: &str) -> (&str, Option<&str>) {
    match input.find('@') {
        Some(at) => (&input[..at], Some(&input[at..])),
        None => (input, None),
    }
}

fn attach(mut body: String, suffix: Option<&str>) -> String {
    if let Some(suffix) = suffix {
        body.push_str(suffix);
    }
    body
}

fn parse_any(body: &str) -> Result<Vec<u8>, IdentifierError> {
    match body.len() {
        36 => {
            if !CANONICAL_RE.is_match(body) {
                return Err(IdentifierError::InvalidCanonical(body.to_string()));
            }
            hex_nibbles(&body.replace('-', ""))
        }
        32 => hex_nibbles(body),
        22 => decode_compact(body, COMPACT22_HEAD),
        23 => decode_compact(body, COMPACT23_HEAD),
        length => Err(IdentifierError::InvalidLength {
            input: body.to_string(),
            length,
        }),
    }
}

fn decode_compact(body: &str, head: usize) -> Result<Vec<u8>, IdentifierError> {
    if !body.is_ascii() {
        return Err(IdentifierError::InvalidCharacter(body.to_string()));
    }
    let mut nibbles = hex_nibbles(&body[..head])?;
    let tail_nibbles = NIBBLES - head;

    // Pad the tail to a whole number of 4-character groups with zero bits.
    let mut tail = body[head..].to_string();
    while tail.len() % 4 != 0 {
        tail.push('A');
    }
    let bytes = STANDARD
        .decode(tail.as_bytes())
        .map_err(|_| IdentifierError::InvalidCharacter(body.to_string()))?;

    nibbles.extend(bytes.iter().flat_map(|b| [b >> 4, b & 0x0f]).take(tail_nibbles));
    Ok(nibbles)
}

fn encode_compact(nibbles: &[u8], head: usize) -> String {
    let mut out: String = nibbles[..head]
        .iter()
        .map(|&n| HEX_DIGITS[n as usize] as char)
        .collect();

    let tail = &nibbles[head..];
    let chars = tail.len() * 2 / 3;
    let mut bytes = Vec::with_capacity(tail.len() / 2 + 1);
    for pair in tail.chunks(2) {
        let low = pair.get(1).copied().unwrap_or(0);
        bytes.push((pair[0] << 4) | low);
    }
    let encoded = STANDARD.encode(bytes);
    out.push_str(&encoded[..chars]);
    out
}

fn hex_nibbles(hex: &str) -> Result<Vec<u8>, IdentifierError> {
    hex.chars()
        .map(|c| {
            c.to_digit(16)
                .map(|d| d as u8)
                .ok_or_else(|| IdentifierError::InvalidCharacter(hex.to_string()))
        })
        .collect()
}

fn format_canonical(nibbles: &[u8]) -> String {
    let mut out = String::with_capacity(36);
    for (i, &n) in nibbles.iter().enumerate() {
        if matches!(i, 8 | 12 | 16 | 20) {
            out.push('-');
        }
        out.push(HEX_DIGITS[n as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANONICAL: &str = "fc991dd7-0033-4b80-9d41-c8a86a702e59";
    const COMPACT22: &str = "fcmR3XADNLgJ1ByKhqcC5Z";
    const COMPACT23: &str = "fc9913XADNLgJ1ByKhqcC5Z";

    #[test]
    fn known_editor_encoding() {
        assert_eq!(to_compact22(CANONICAL).unwrap(), COMPACT22);
        assert_eq!(compress(CANONICAL).unwrap(), COMPACT23);
        assert_eq!(decode(COMPACT22).unwrap(), CANONICAL);
        assert_eq!(decompress(COMPACT23).unwrap(), CANONICAL);
        assert_eq!(to_compact22(COMPACT23).unwrap(), COMPACT22);
    }

    #[test]
    fn round_trips_random_identifiers() {
        for _ in 0..1000 {
            let id = generate();
            let compact = compress(&id).unwrap();
            assert_eq!(compact.len(), 23);
            assert_eq!(decode(&compact).unwrap(), id);

            let short = to_compact22(&compact).unwrap();
            assert_eq!(short.len(), 22);
            assert!(is_valid(&short));
            assert_eq!(decompress(&short).unwrap(), id);
            assert_eq!(decode(&compress(&decompress(&short).unwrap()).unwrap()).unwrap(), id);
        }
    }

    #[test]
    fn suffix_is_preserved() {
        let with_suffix = format!("{COMPACT22}@f9941");
        assert_eq!(decode(&with_suffix).unwrap(), format!("{CANONICAL}@f9941"));
        assert_eq!(compress(&format!("{CANONICAL}@6c48a")).unwrap(), format!("{COMPACT23}@6c48a"));
        assert_eq!(decode(&format!("{CANONICAL}@a@b")).unwrap(), format!("{CANONICAL}@a@b"));
    }

    #[test]
    fn canonical_input_is_normalized() {
        assert_eq!(decode(&CANONICAL.to_uppercase()).unwrap(), CANONICAL);
        assert_eq!(decode("fc991dd700334b809d41c8a86a702e59").unwrap(), CANONICAL);
    }

    #[test]
    fn validity() {
        assert!(is_valid(CANONICAL));
        assert!(is_valid(&CANONICAL.to_uppercase()));
        assert!(is_valid(COMPACT22));
        assert!(is_valid("abcdefghijABCDEFGH+/"));
        assert!(!is_valid(COMPACT23));
        assert!(!is_valid("fc991dd7_0033_4b80_9d41_c8a86a702e59"));
        assert!(!is_valid("db://assets/scene.scene"));
        assert!(!is_valid(""));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(matches!(
            decode("short"),
            Err(IdentifierError::InvalidLength { length: 5, .. })
        ));
        assert!(matches!(
            decode("zz991dd7-0033-4b80-9d41-c8a86a702e59"),
            Err(IdentifierError::InvalidCanonical(_))
        ));
        assert!(matches!(
            decode("fcmR3XADNLgJ1ByKhqc-5Z"),
            Err(IdentifierError::InvalidCharacter(_))
        ));
        assert!(matches!(
            decode("zzmR3XADNLgJ1ByKhqcC5Z"),
            Err(IdentifierError::InvalidCharacter(_))
        ));
    }

    #[test]
    fn generated_identifiers_are_canonical() {
        let id = generate();
        assert_eq!(id.len(), 36);
        assert!(CANONICAL_RE.is_match(&id));
        assert_ne!(id, generate());
    }
}
