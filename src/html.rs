//! Best-effort HTML handling.
//!
//! Tags are stripped with a regular expression, not an HTML parser. Markup that the expression
//! does not recognize is left in the text as is.

use crate::fixer::encoding::decode_c1;
use lazy_static::*;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::char;

lazy_static! {
    static ref HTML_TAG_RE: Regex = Regex::new(r"(?s)<!--.*?-->|<[^>]*>").unwrap();
    static ref ENTITY_RE: Regex =
        Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|([A-Za-z][A-Za-z0-9]{1,7}));")
            .unwrap();
}

/// Named entities for U+00A0 to U+00FF, in codepoint order.
const LATIN1_ENTITIES: [&str; 96] = [
    "nbsp", "iexcl", "cent", "pound", "curren", "yen", "brvbar", "sect",
    "uml", "copy", "ordf", "laquo", "not", "shy", "reg", "macr",
    "deg", "plusmn", "sup2", "sup3", "acute", "micro", "para", "middot",
    "cedil", "sup1", "ordm", "raquo", "frac14", "frac12", "frac34", "iquest",
    "Agrave", "Aacute", "Acirc", "Atilde", "Auml", "Aring", "AElig", "Ccedil",
    "Egrave", "Eacute", "Ecirc", "Euml", "Igrave", "Iacute", "Icirc", "Iuml",
    "ETH", "Ntilde", "Ograve", "Oacute", "Ocirc", "Otilde", "Ouml", "times",
    "Oslash", "Ugrave", "Uacute", "Ucirc", "Uuml", "Yacute", "THORN", "szlig",
    "agrave", "aacute", "acirc", "atilde", "auml", "aring", "aelig", "ccedil",
    "egrave", "eacute", "ecirc", "euml", "igrave", "iacute", "icirc", "iuml",
    "eth", "ntilde", "ograve", "oacute", "ocirc", "otilde", "ouml", "divide",
    "oslash", "ugrave", "uacute", "ucirc", "uuml", "yacute", "thorn", "yuml",
];

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "ensp" => '\u{2002}',
        "emsp" => '\u{2003}',
        "thinsp" => '\u{2009}',
        "zwnj" => '\u{200C}',
        "zwj" => '\u{200D}',
        "lrm" => '\u{200E}',
        "rlm" => '\u{200F}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "sbquo" => '\u{201A}',
        "ldquo" => '\u{201C}',
        "rdquo" => '\u{201D}',
        "bdquo" => '\u{201E}',
        "dagger" => '\u{2020}',
        "Dagger" => '\u{2021}',
        "bull" => '\u{2022}',
        "hellip" => '\u{2026}',
        "permil" => '\u{2030}',
        "prime" => '\u{2032}',
        "lsaquo" => '\u{2039}',
        "rsaquo" => '\u{203A}',
        "euro" => '\u{20AC}',
        "trade" => '\u{2122}',
        _ => {
            let idx = LATIN1_ENTITIES.iter().position(|&n| n == name)?;
            return char::from_u32(0xA0 + idx as u32);
        }
    };
    Some(c)
}

fn numeric_entity(digits: &str, radix: u32) -> Option<char> {
    let cp = u32::from_str_radix(digits, radix).ok()?;
    match cp {
        0 => None,
        // Browsers read these as Windows-1252 bytes.
        0x80..=0x9F => Some(decode_c1(char::from_u32(cp)?)),
        _ => char::from_u32(cp),
    }
}

/// Removes HTML comments and tags from a string.
///
/// This matches `<!--...-->` (non-greedy, across lines) and `<` followed by anything up to the
/// next `>`. It is regex-based and does not parse HTML.
pub fn strip_html_tags(text: &str) -> Cow<'_, str> {
    HTML_TAG_RE.replace_all(text, "")
}

/// Decodes HTML character references such as `&amp;`, `&#233;` and `&#xE9;`.
///
/// Unknown names and invalid codepoints are left untouched.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    ENTITY_RE.replace_all(text, |caps: &Captures<'_>| {
        let decoded = if let Some(dec) = caps.get(1) {
            numeric_entity(dec.as_str(), 10)
        } else if let Some(hex) = caps.get(2) {
            numeric_entity(hex.as_str(), 16)
        } else {
            caps.get(3).and_then(|name| named_entity(name.as_str()))
        };
        match decoded {
            Some(c) => c.to_string(),
            None => caps[0].to_string(),
        }
    })
}
