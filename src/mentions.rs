//! Neutralizes mention triggers.
//!
//! Discord drops valid Unicode combining characters without telling anyone and then acts on
//! the transformed message, so there is no reliable way to detect a specific mention such as
//! `@everyone` or `@here`. Every `@` is treated the same way instead, which also breaks user and
//! role mentions.
//!
//! See discord-api-docs issues #1189, #1193, #1241 and #1276.

use std::borrow::Cow;

/// The zero width space inserted after every `@`.
pub const MENTION_BREAK: char = '\u{200B}';

/// Inserts a zero width space after every `@`, so Discord no longer treats it as a mention.
///
/// The rendered text is visually unchanged.
///
/// # Examples
///
/// ```rust
/// # use safetext::mentions::neutralize_mentions;
/// assert_eq!(neutralize_mentions("@everyone"), "@\u{200B}everyone");
/// assert_eq!(neutralize_mentions("no mentions"), "no mentions");
/// ```
pub fn neutralize_mentions(text: &str) -> Cow<'_, str> {
    if !text.contains('@') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.replace('@', "@\u{200B}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_at_is_broken() {
        assert_eq!(neutralize_mentions("a@b@c"), "a@\u{200B}b@\u{200B}c");
        assert_eq!(neutralize_mentions("@here @<123456>"), "@\u{200B}here @\u{200B}<123456>");
        assert_eq!(neutralize_mentions("@@"), "@\u{200B}@\u{200B}");
    }

    #[test]
    fn text_without_at_is_borrowed() {
        assert!(matches!(neutralize_mentions(""), Cow::Borrowed("")));
        assert!(matches!(neutralize_mentions("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn second_pass_adds_another_break() {
        let once = neutralize_mentions("@everyone").into_owned();
        let twice = neutralize_mentions(&once).into_owned();
        assert_eq!(twice, "@\u{200B}\u{200B}everyone");
        assert_eq!(twice.matches('@').count(), once.matches('@').count());
        assert!(twice.contains(MENTION_BREAK));
    }
}
