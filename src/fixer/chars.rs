//! Character-level cleanup steps.

use lazy_static::*;
use regex::Regex;
use std::borrow::Cow;
use unicode_normalization::{is_nfc, UnicodeNormalization};

lazy_static! {
    static ref ANSI_RE: Regex = Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").unwrap();
}

/// Rewrites every character matched by `needs`, borrowing the text when nothing matches.
fn rewrite<'a>(
    text: &'a str, needs: impl Fn(char) -> bool, mut push: impl FnMut(char, &mut String),
) -> Cow<'a, str> {
    if !text.chars().any(&needs) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if needs(c) {
            push(c, &mut out);
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Removes ANSI terminal escape sequences such as `\x1b[31m`.
pub fn remove_terminal_escapes(text: &str) -> Cow<'_, str> {
    ANSI_RE.replace_all(text, "")
}

fn ligature(c: char) -> Option<&'static str> {
    Some(match c {
        '\u{FB00}' => "ff",
        '\u{FB01}' => "fi",
        '\u{FB02}' => "fl",
        '\u{FB03}' => "ffi",
        '\u{FB04}' => "ffl",
        '\u{FB05}' => "ſt",
        '\u{FB06}' => "st",
        _ => return None,
    })
}

/// Expands Latin ligatures into their separate letters.
pub fn fix_latin_ligatures(text: &str) -> Cow<'_, str> {
    rewrite(text, |c| ligature(c).is_some(), |c, out| {
        if let Some(s) = ligature(c) {
            out.push_str(s);
        }
    })
}

fn is_wide(c: char) -> bool {
    c == '\u{3000}' || ('\u{FF01}'..='\u{FF5E}').contains(&c)
}

/// Replaces fullwidth ASCII characters and the ideographic space with normal width forms.
pub fn fix_character_width(text: &str) -> Cow<'_, str> {
    rewrite(text, is_wide, |c, out| {
        if c == '\u{3000}' {
            out.push(' ');
        } else if let Some(narrow) = std::char::from_u32(c as u32 - 0xFEE0) {
            out.push(narrow);
        }
    })
}

fn is_single_quote(c: char) -> bool {
    c == '\u{2BC}' || ('\u{2018}'..='\u{201B}').contains(&c)
}

fn is_double_quote(c: char) -> bool {
    ('\u{201C}'..='\u{201F}').contains(&c)
}

/// Replaces curly quotes with straight quotes.
pub fn uncurl_quotes(text: &str) -> Cow<'_, str> {
    rewrite(text, |c| is_single_quote(c) || is_double_quote(c), |c, out| {
        out.push(if is_double_quote(c) { '"' } else { '\'' });
    })
}

/// Converts CRLF, CR, NEL and the Unicode line and paragraph separators to `\n`.
pub fn fix_line_breaks(text: &str) -> Cow<'_, str> {
    let is_break = |c: char| matches!(c, '\r' | '\u{85}' | '\u{2028}' | '\u{2029}');
    if !text.chars().any(is_break) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' && chars.peek() == Some(&'\n') {
            continue;
        }
        out.push(if is_break(c) { '\n' } else { c });
    }
    Cow::Owned(out)
}

fn is_removed_control(c: char) -> bool {
    matches!(c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{E}'..='\u{1F}' | '\u{7F}' |
        '\u{206A}'..='\u{206F}' | '\u{FEFF}' | '\u{FFF9}'..='\u{FFFC}' |
        '\u{E0000}'..='\u{E007F}'
    )
}

/// Removes control characters that have no visible effect.
///
/// Tab, line feed, form feed and carriage return are kept, as are bidirectional controls.
pub fn remove_control_chars(text: &str) -> Cow<'_, str> {
    rewrite(text, is_removed_control, |_, _| ())
}

/// Applies NFC normalization.
pub fn normalize(text: &str) -> Cow<'_, str> {
    if is_nfc(text) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.nfc().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_ansi_escapes() {
        assert_eq!(remove_terminal_escapes("\x1b[31mred\x1b[0m"), "red");
        assert_eq!(remove_terminal_escapes("\x1b[1;4mbold\x1b[m"), "bold");
    }

    #[test]
    fn expands_ligatures() {
        assert_eq!(fix_latin_ligatures("\u{FB01}nd the \u{FB02}ow"), "find the flow");
        assert!(matches!(fix_latin_ligatures("find"), Cow::Borrowed(_)));
    }

    #[test]
    fn narrows_fullwidth() {
        assert_eq!(fix_character_width("\u{FF28}\u{FF49}\u{FF01}\u{3000}\u{FF20}"), "Hi! @");
        assert_eq!(fix_character_width("日本"), "日本");
    }

    #[test]
    fn uncurls_quotes() {
        assert_eq!(uncurl_quotes("\u{201C}it\u{2019}s\u{201D}"), "\"it's\"");
        assert!(matches!(uncurl_quotes("\"it's\""), Cow::Borrowed(_)));
    }

    #[test]
    fn fixes_line_breaks() {
        assert_eq!(fix_line_breaks("a\r\nb\rc\u{2028}d\u{2029}e\u{85}f"), "a\nb\nc\nd\ne\nf");
        assert_eq!(fix_line_breaks("a\r\r\nb"), "a\n\nb");
        assert!(matches!(fix_line_breaks("a\nb"), Cow::Borrowed(_)));
    }

    #[test]
    fn removes_invisible_controls() {
        assert_eq!(remove_control_chars("a\u{0}b\u{7}c\u{FEFF}d\u{E0041}e"), "abcde");
        assert_eq!(remove_control_chars("tab\there\nline\u{C}"), "tab\there\nline\u{C}");
        assert_eq!(remove_control_chars("\u{202E}rlo"), "\u{202E}rlo");
    }

    #[test]
    fn normalizes_to_nfc() {
        assert_eq!(normalize("cafe\u{301}"), "caf\u{E9}");
        assert!(matches!(normalize("caf\u{E9}"), Cow::Borrowed(_)));
    }
}
