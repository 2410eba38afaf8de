//! Mojibake repair.
//!
//! The default [`Fixer`] fixes text that went through mismatched encode and decode steps, and
//! cleans up the character-level noise that tends to come with it. Each step can be toggled
//! through a [`FixerConfig`].

use crate::html;
use safetext_model::options::{FixerConfig, FixStep};
use std::borrow::Cow;

mod chars;
pub(crate) mod encoding;

pub use self::chars::{
    fix_character_width, fix_latin_ligatures, fix_line_breaks, normalize,
    remove_control_chars, remove_terminal_escapes, uncurl_quotes,
};
pub use self::encoding::{fix_c1_controls, fix_encoding};

/// Repairs text that was corrupted by mismatched character encodings.
pub trait TextFixer: Send + Sync {
    /// Returns the most likely originally intended text.
    ///
    /// If `decode_entities` is set, HTML character references are decoded too.
    fn fix_text(&self, text: &str, decode_entities: bool) -> String;
}

/// The default [`TextFixer`].
#[derive(Clone, Debug, Default)]
pub struct Fixer {
    config: FixerConfig,
}
impl Fixer {
    /// Creates a fixer that runs the given steps.
    pub fn new(config: FixerConfig) -> Self {
        Fixer { config }
    }

    /// Returns the configuration of this fixer.
    pub fn config(&self) -> &FixerConfig {
        &self.config
    }

    fn run_step<'a>(step: FixStep, text: &'a str) -> Cow<'a, str> {
        match step {
            FixStep::RemoveTerminalEscapes => remove_terminal_escapes(text),
            FixStep::FixEncoding => fix_encoding(text),
            FixStep::FixC1Controls => fix_c1_controls(text),
            FixStep::FixLatinLigatures => fix_latin_ligatures(text),
            FixStep::FixCharacterWidth => fix_character_width(text),
            FixStep::UncurlQuotes => uncurl_quotes(text),
            FixStep::FixLineBreaks => fix_line_breaks(text),
            FixStep::RemoveControlChars => remove_control_chars(text),
            FixStep::Normalize => normalize(text),
            _ => Cow::Borrowed(text),
        }
    }
}
impl TextFixer for Fixer {
    fn fix_text(&self, text: &str, decode_entities: bool) -> String {
        let mut text = if decode_entities {
            html::decode_entities(text)
        } else {
            Cow::Borrowed(text)
        };

        for step in self.config.steps.iter() {
            let fixed = match Self::run_step(step, &text) {
                Cow::Owned(fixed) => Some(fixed),
                Cow::Borrowed(_) => None,
            };
            if let Some(fixed) = fixed {
                trace!("Fixer step `{}` changed the text.", step.as_ref());
                text = Cow::Owned(fixed);
            }
        }

        text.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(text: &str) -> String {
        Fixer::default().fix_text(text, false)
    }

    #[test]
    fn well_formed_text_is_unchanged() {
        for &text in &["", "hello world", "café über naïve", "日本語のテキスト", "emoji \u{1F600}",
                       "tab\tand\nnewline", "שלום עולם"] {
            assert_eq!(fix(text), text);
        }
    }

    #[test]
    fn fixes_mojibake_quotes() {
        assert_eq!(fix("â€œquotedâ€\u{9D}"), "\"quoted\"");
        assert_eq!(fix("Ã¼ber"), "über");
    }

    #[test]
    fn entities_only_decoded_on_request() {
        let fixer = Fixer::default();
        assert_eq!(fixer.fix_text("fish &amp; chips", false), "fish &amp; chips");
        assert_eq!(fixer.fix_text("fish &amp; chips", true), "fish & chips");
    }

    #[test]
    fn entity_mojibake_is_fixed_after_decoding() {
        assert_eq!(Fixer::default().fix_text("caf&Atilde;&copy;", true), "café");
    }

    #[test]
    fn disabled_steps_do_not_run() {
        let fixer = Fixer::new(FixerConfig::new().disable(FixStep::UncurlQuotes));
        assert_eq!(fixer.fix_text("\u{201C}hi\u{201D}", false), "\u{201C}hi\u{201D}");

        let nothing = Fixer::new(FixerConfig::none());
        assert_eq!(nothing.fix_text("cafÃ©\r\n", false), "cafÃ©\r\n");
    }
}
