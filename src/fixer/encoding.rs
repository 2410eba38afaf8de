//! Repairs UTF-8 text that was decoded as Windows-1252 or Latin-1.
//!
//! Decoding uses "sloppy" Windows-1252: the five bytes Windows-1252 leaves undefined map to the
//! C1 control characters with the same value, as Latin-1 would decode them. This lets every
//! byte round trip.

use std::borrow::Cow;
use std::str;

/// Windows-1252 characters for bytes `0x80..=0x9F`.
const WINDOWS_1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{81}', '\u{201A}', '\u{192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2C6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8D}', '\u{17D}', '\u{8F}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2DC}', '\u{2122}', '\u{161}', '\u{203A}', '\u{153}', '\u{9D}', '\u{17E}', '\u{178}',
];

/// The most passes [`fix_encoding`] makes over text encoded more than once.
const MAX_PASSES: usize = 4;

/// Returns the byte a character would have been decoded from.
fn sloppy_byte(c: char) -> Option<u8> {
    match c as u32 {
        cp @ 0x00..=0xFF => Some(cp as u8),
        _ => WINDOWS_1252_HIGH.iter().position(|&w| w == c).map(|idx| 0x80 + idx as u8),
    }
}

/// Maps a C1 control character to the Windows-1252 character for the same byte.
///
/// Other characters, and the bytes Windows-1252 leaves undefined, are returned unchanged.
pub(crate) fn decode_c1(c: char) -> char {
    match c as u32 {
        cp @ 0x80..=0x9F => WINDOWS_1252_HIGH[(cp - 0x80) as usize],
        _ => c,
    }
}

fn is_c1(c: char) -> bool {
    ('\u{80}'..='\u{9F}').contains(&c)
}

/// Scripts whose letters are repaired when they appear as two byte mojibake.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Script {
    Latin,
    Greek,
    Cyrillic,
    Hebrew,
    Arabic,
}

/// Returns the script of a letter that a two byte sequence may be repaired into.
///
/// Two byte sequences decoding to anything else are left alone. In correct text, those are
/// nearly always an accented capital or `ß` followed by punctuation, such as `ß“` or `É…`.
fn script_of(c: char) -> Option<Script> {
    match c {
        '\u{A0}'..='\u{17F}' => Some(Script::Latin),
        '\u{386}'..='\u{3CE}' => Some(Script::Greek),
        '\u{400}'..='\u{45F}' => Some(Script::Cyrillic),
        '\u{5D0}'..='\u{5EA}' => Some(Script::Hebrew),
        '\u{621}'..='\u{64A}' => Some(Script::Arabic),
        _ => None,
    }
}

/// Returns whether a three or four byte sequence decodes to something worth keeping.
fn is_plausible_wide(c: char) -> bool {
    !matches!(c,
        '\u{E000}'..='\u{F8FF}' | '\u{FDD0}'..='\u{FDEF}' | '\u{FFFE}' | '\u{FFFF}' |
        '\u{F0000}'..='\u{10FFFF}'
    )
}

fn continuation_count(lead: u8) -> Option<usize> {
    match lead {
        0xC2..=0xDF => Some(1),
        0xE0..=0xEF => Some(2),
        0xF0..=0xF4 => Some(3),
        _ => None,
    }
}

/// A run of characters that spells out the UTF-8 encoding of `decoded`.
struct Sequence {
    start: usize,
    len: usize,
    decoded: char,
    script: Option<Script>,
}

/// Tries to decode a mojibake sequence starting at `chars[start]`.
fn decode_sequence(chars: &[char], start: usize) -> Option<Sequence> {
    let chars = &chars[start..];
    let lead = sloppy_byte(chars[0])?;
    let count = continuation_count(lead)?;
    if chars.len() <= count {
        return None;
    }

    let mut bytes = [lead, 0, 0, 0];
    for (i, &c) in chars[1..=count].iter().enumerate() {
        match sloppy_byte(c) {
            Some(b @ 0x80..=0xBF) => bytes[i + 1] = b,
            _ => return None,
        }
    }

    let decoded = str::from_utf8(&bytes[..=count]).ok()?.chars().next()?;
    let script = if count == 1 {
        Some(script_of(decoded)?)
    } else if is_plausible_wide(decoded) {
        None
    } else {
        return None;
    };
    Some(Sequence { start, len: count + 1, decoded, script })
}

fn fix_pass(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();

    let mut found = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        match decode_sequence(&chars, i) {
            Some(seq) => {
                i += seq.len;
                found.push(seq);
            }
            None => i += 1,
        }
    }

    // A non-Latin letter needs a second letter of its script, in the text or in another
    // sequence.
    let supported = |script: Script| {
        script == Script::Latin
            || found.iter().filter(|seq| seq.script == Some(script)).count() > 1
            || chars.iter().any(|&c| script_of(c) == Some(script))
    };
    let accepted: Vec<&Sequence> = found.iter()
        .filter(|seq| seq.script.map_or(true, &supported))
        .collect();
    if accepted.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    for seq in accepted {
        out.extend(&chars[pos..seq.start]);
        out.push(seq.decoded);
        pos = seq.start + seq.len;
    }
    out.extend(&chars[pos..]);
    Some(out)
}

/// Replaces runs of characters that spell out UTF-8 bytes in Windows-1252 with the characters
/// those bytes encode.
///
/// Text that was encoded several times is fixed by repeated passes.
pub fn fix_encoding(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        return Cow::Borrowed(text);
    }

    let mut current = Cow::Borrowed(text);
    for _ in 0..MAX_PASSES {
        match fix_pass(&current) {
            Some(fixed) => current = Cow::Owned(fixed),
            None => break,
        }
    }
    current
}

/// Replaces C1 control characters with the Windows-1252 characters for the same bytes.
pub fn fix_c1_controls(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_c1) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.chars().map(decode_c1).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixes_latin1_mojibake() {
        assert_eq!(fix_encoding("cafÃ©"), "café");
        assert_eq!(fix_encoding("Ã¼ber naÃ¯ve"), "über naïve");
        assert_eq!(fix_encoding("Â£5"), "£5");
    }

    #[test]
    fn fixes_windows_1252_mojibake() {
        assert_eq!(fix_encoding("â€œquotedâ€\u{9D}"), "\u{201C}quoted\u{201D}");
        assert_eq!(fix_encoding("itâ€™s"), "it\u{2019}s");
        assert_eq!(fix_encoding("ðŸ˜€"), "\u{1F600}");
    }

    #[test]
    fn fixes_double_encoding() {
        assert_eq!(fix_encoding("cafÃƒÂ©"), "café");
    }

    #[test]
    fn leaves_correct_text_alone() {
        assert!(matches!(fix_encoding("plain ascii"), Cow::Borrowed(_)));
        assert!(matches!(fix_encoding("café über naïve"), Cow::Borrowed(_)));
        assert!(matches!(fix_encoding("日本語 and עברית"), Cow::Borrowed(_)));
        assert!(matches!(fix_encoding("Ã alone"), Cow::Borrowed(_)));
    }

    #[test]
    fn fixes_other_scripts() {
        assert_eq!(fix_encoding("zaÅ¼Ã³Å‚Ä‡"), "zażółć");
        assert_eq!(fix_encoding("ÐŸÑ€Ð¸Ð²ÐµÑ‚"), "Привет");
        assert_eq!(fix_encoding("мир Ð¸ Ñ‚"), "мир и т");
    }

    #[test]
    fn leaves_capitals_before_punctuation_alone() {
        for &text in &["„Gruß“", "L'ÉTÉ…", "ÜBER”", "„BÜ”", "»SCHÖ»", "AÑ…", "Ð“", "Ö‘x’"] {
            assert!(matches!(fix_encoding(text), Cow::Borrowed(_)), "{:?} was changed", text);
        }
    }

    #[test]
    fn rejects_invalid_sequences() {
        // Truncated sequences and sequences decoding to C1 controls stay as they are.
        assert_eq!(fix_encoding("Ã"), "Ã");
        assert_eq!(fix_encoding("â€"), "â€");
        assert_eq!(fix_encoding("Â\u{80}"), "Â\u{80}");
    }

    #[test]
    fn maps_c1_controls() {
        assert_eq!(fix_c1_controls("\u{93}hi\u{94}"), "\u{201C}hi\u{201D}");
        assert_eq!(fix_c1_controls("\u{81}"), "\u{81}");
        assert!(matches!(fix_c1_controls("none"), Cow::Borrowed("none")));
    }
}
