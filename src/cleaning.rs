//! Boilerplate cleaning rules shared by every description extractor.
//!
//! All description text goes through [`clean_description`], which applies one
//! ordered rule table:
//!
//! 1. whitespace runs collapsed to one space
//! 2. a leading `COLOMBO (News1st) –` byline and `D(D)-M(M)-YYYY` date stamps
//! 3. the generic Sinhala meta-description tail
//! 4. a trailing "read more" call to action
//! 5. whitespace collapsed again, then trimmed
//!
//! Only prefixes and suffixes are removed, so a place name or a phrase in the
//! middle of a sentence is kept. Applying the table to its own output changes
//! nothing.

use crate::models::{NO_DESCRIPTION, SEE_IMAGES_NOTE};
use crate::utils::{char_len, truncate_chars};
use once_cell::sync::Lazy;
use regex::Regex;

/// Opening words of the site's generic meta description ("Sri Lanka news").
pub const META_MARKER: &str = "\u{0DC1}\u{0DCA}\u{200D}\u{0DBB}\u{0DD3} \u{0DBD}\u{0D82}\u{0D9A}\u{0DCF} \
    \u{0DB4}\u{0DCA}\u{200D}\u{0DBB}\u{0DC0}\u{0DD8}\u{0DAD}\u{0DCA}\u{0DAD}\u{0DD2}";

const BYLINE: &str = r"(?i:COLOMBO)\s*\([^)]*\)\s*[-–—]";
const DATE_STAMP: &str = r"\d{1,2}-\d{1,2}-\d{4}";
const READ_MORE: &str = r"(?i:read\s+more|continue\s+reading)\b\s*(?:»|›|>>|\.{3}|…)?";

static RE_BYLINE: Lazy<Regex> = Lazy::new(|| Regex::new(&format!(r"^\s*{BYLINE}")).unwrap());
static RE_LEADING_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^\s*{DATE_STAMP}")).unwrap());
static RE_LEADING_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(?:\s*(?:{BYLINE}|{DATE_STAMP}))+\s*")).unwrap()
});
static RE_META_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("{}.*$", regex::escape(META_MARKER))).unwrap());
static RE_READ_MORE_TAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?:\s*\b{READ_MORE})+\s*$")).unwrap());
static RE_READ_MORE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^\s*{READ_MORE}\s*$")).unwrap());
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static RE_UNICODE_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\\u([dD][89abAB][0-9a-fA-F]{2})\\u([dD][c-fC-F][0-9a-fA-F]{2})|\\u([0-9a-fA-F]{4})",
    )
    .unwrap()
});

/// The ordered cleaning table.
static RULES: Lazy<Vec<(&'static Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (&*RE_WHITESPACE, " "),
        (&*RE_LEADING_PREFIX, ""),
        (&*RE_META_TAIL, ""),
        (&*RE_READ_MORE_TAIL, ""),
        (&*RE_WHITESPACE, " "),
    ]
});

/// Apply every cleaning rule in order and trim the result.
pub fn clean_description(text: &str) -> String {
    let mut out = text.to_string();
    for (pattern, replacement) in RULES.iter() {
        out = pattern.replace_all(&out, *replacement).into_owned();
    }
    out.trim().to_string()
}

/// Collapse whitespace runs without touching anything else.
pub fn collapse_whitespace(text: &str) -> String {
    RE_WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Whether raw candidate text is boilerplate that should not be used as a description.
///
/// Only a leading byline or date stamp counts; the same words later in the
/// text do not.
pub fn is_boilerplate(text: &str) -> bool {
    let text = collapse_whitespace(text);
    RE_BYLINE.is_match(&text)
        || text.contains(META_MARKER)
        || RE_READ_MORE_LABEL.is_match(&text)
        || RE_LEADING_DATE.is_match(&text)
}

/// Clean `text` and keep it only if it is longer than `min_len` characters.
///
/// The kept text is capped at `cap` characters.
pub fn finalize_description(text: &str, min_len: usize, cap: usize) -> Option<String> {
    let cleaned = clean_description(text);
    if char_len(&cleaned) <= min_len {
        return None;
    }
    Some(truncate_chars(&cleaned, cap).trim_end().to_string())
}

/// The description to emit: the extracted text or the placeholder.
pub fn description_or_placeholder(description: Option<String>, has_images: bool) -> String {
    match description {
        Some(d) if !d.is_empty() => d,
        _ if has_images => format!("{NO_DESCRIPTION}{SEE_IMAGES_NOTE}"),
        _ => NO_DESCRIPTION.to_string(),
    }
}

/// Decode literal `\uXXXX` sequences (including surrogate pairs) left in API text.
pub fn decode_unicode_escapes(text: &str) -> String {
    RE_UNICODE_ESCAPE
        .replace_all(text, |caps: &regex::Captures| {
            let decoded = if let (Some(hi), Some(lo)) = (caps.get(1), caps.get(2)) {
                let hi = u32::from_str_radix(hi.as_str(), 16).unwrap_or(0);
                let lo = u32::from_str_radix(lo.as_str(), 16).unwrap_or(0);
                char::from_u32(0x10000 + ((hi - 0xD800) << 10) + (lo - 0xDC00))
            } else {
                caps.get(3)
                    .and_then(|m| u32::from_str_radix(m.as_str(), 16).ok())
                    .and_then(char::from_u32)
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
