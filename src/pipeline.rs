use crate::bidi::{BidiDisplay, DisplayOrder};
use crate::fixer::{Fixer, TextFixer};
use crate::html;
use crate::mentions::neutralize_mentions;
use derive_setters::*;
use lazy_static::*;
use safetext_errors::*;
use safetext_model::drop_table::DropTable;
use safetext_model::options::{FixerConfig, PreprocessOptions, SanitizeOptions};
use std::borrow::Cow;
use std::char;
use std::sync::Arc;

/// Normalizes and sanitizes text before it is sent to Discord.
///
/// The [`Clone`] implementation creates a new handle to the same collaborators. Most users can
/// use the free functions [`preprocess`] and [`sanitize_mentions`] instead, which use the
/// default collaborators and the built-in drop table.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct Sanitizer {
    #[derivative(Debug="ignore")]
    fixer: Arc<dyn TextFixer>,
    #[derivative(Debug="ignore")]
    display_order: Arc<dyn DisplayOrder>,
    drop_table: Arc<DropTable>,
}
impl Sanitizer {
    /// Creates a sanitizer with the default collaborators.
    pub fn new() -> Self {
        SanitizerBuilder::new().build()
    }

    /// Returns a builder that allows replacing the collaborators or the drop table.
    pub fn builder() -> SanitizerBuilder {
        SanitizerBuilder::new()
    }

    /// Returns the drop table used by this sanitizer.
    pub fn drop_table(&self) -> &DropTable {
        &self.drop_table
    }

    /// Normalizes text and removes characters known to be dropped by Discord.
    ///
    /// This runs, in order: HTML stripping (if enabled), mojibake repair, bidirectional
    /// reordering (if enabled), and finally removal of every character in the drop table.
    pub fn preprocess(&self, text: &str, options: PreprocessOptions) -> String {
        let text = if options.strip_html {
            html::strip_html_tags(text)
        } else {
            Cow::Borrowed(text)
        };

        let fixed = self.fixer.fix_text(&text, options.strip_html);
        let ordered = if options.fix_directional_overrides {
            self.display_order.display_order(&fixed)
        } else {
            fixed
        };

        // The display order may not resolve everything in the drop table, for example when
        // directional overrides were left alone.
        let stripped = match self.drop_table.strip(&ordered) {
            Cow::Owned(stripped) => Some(stripped),
            Cow::Borrowed(_) => None,
        };
        stripped.unwrap_or(ordered)
    }

    /// Neutralizes every `@` in the text, optionally preprocessing it first.
    pub fn sanitize_mentions(&self, text: &str, options: SanitizeOptions) -> String {
        if options.run_preprocess {
            let text = self.preprocess(text, options.preprocess);
            let neutralized = match neutralize_mentions(&text) {
                Cow::Owned(neutralized) => Some(neutralized),
                Cow::Borrowed(_) => None,
            };
            neutralized.unwrap_or(text)
        } else {
            neutralize_mentions(text).into_owned()
        }
    }

    /// Like [`Sanitizer::preprocess`], but returns an error instead of unwinding if a
    /// collaborator panics.
    pub fn try_preprocess(&self, text: &str, options: PreprocessOptions) -> Result<String> {
        catch_panic(|| Ok(self.preprocess(text, options)))
    }

    /// Like [`Sanitizer::sanitize_mentions`], but returns an error instead of unwinding if a
    /// collaborator panics.
    pub fn try_sanitize_mentions(&self, text: &str, options: SanitizeOptions) -> Result<String> {
        catch_panic(|| Ok(self.sanitize_mentions(text, options)))
    }

    /// Decodes UTF-16 text, which may contain unpaired surrogates.
    ///
    /// Unpaired surrogates in the drop table are removed. Any other unpaired surrogate is
    /// replaced with U+FFFD.
    pub fn decode_utf16(&self, units: &[u16]) -> String {
        let mut out = String::with_capacity(units.len());
        let mut dropped = 0;
        for decoded in char::decode_utf16(units.iter().cloned()) {
            match decoded {
                Ok(c) => out.push(c),
                Err(e) if self.drop_table.contains_unit(e.unpaired_surrogate()) => dropped += 1,
                Err(_) => out.push(char::REPLACEMENT_CHARACTER),
            }
        }
        if dropped != 0 {
            debug!("Removed {} unpaired surrogates known to be dropped by Discord.", dropped);
        }
        out
    }

    /// Decodes UTF-16 text with [`Sanitizer::decode_utf16`], then preprocesses it.
    pub fn preprocess_utf16(&self, units: &[u16], options: PreprocessOptions) -> String {
        self.preprocess(&self.decode_utf16(units), options)
    }

    /// Decodes UTF-16 text with [`Sanitizer::decode_utf16`], then sanitizes its mentions.
    pub fn sanitize_mentions_utf16(&self, units: &[u16], options: SanitizeOptions) -> String {
        self.sanitize_mentions(&self.decode_utf16(units), options)
    }
}
impl Default for Sanitizer {
    fn default() -> Self {
        Sanitizer::new()
    }
}

/// A builder for a [`Sanitizer`].
#[derive(Derivative, Setters)]
#[derivative(Debug)]
#[setters(strip_option)]
pub struct SanitizerBuilder {
    #[derivative(Debug="ignore")]
    #[setters(skip)]
    fixer: Option<Arc<dyn TextFixer>>,
    #[derivative(Debug="ignore")]
    #[setters(skip)]
    display_order: Option<Arc<dyn DisplayOrder>>,
    /// Sets the steps run by the default mojibake fixer.
    ///
    /// This has no effect if a custom fixer is set with [`SanitizerBuilder::fixer`].
    fixer_config: FixerConfig,
    /// Sets the table of characters removed at the end of preprocessing.
    drop_table: Option<DropTable>,
}
impl SanitizerBuilder {
    fn new() -> Self {
        SanitizerBuilder {
            fixer: None,
            display_order: None,
            fixer_config: FixerConfig::default(),
            drop_table: None,
        }
    }

    /// Replaces the mojibake fixer.
    pub fn fixer(mut self, fixer: impl TextFixer + 'static) -> Self {
        self.fixer = Some(Arc::new(fixer));
        self
    }

    /// Replaces the bidirectional display order implementation.
    pub fn display_order(mut self, display_order: impl DisplayOrder + 'static) -> Self {
        self.display_order = Some(Arc::new(display_order));
        self
    }

    /// Creates the sanitizer.
    pub fn build(self) -> Sanitizer {
        let fixer: Arc<dyn TextFixer> = match self.fixer {
            Some(fixer) => fixer,
            None => Arc::new(Fixer::new(self.fixer_config)),
        };
        let display_order: Arc<dyn DisplayOrder> = match self.display_order {
            Some(display_order) => display_order,
            None => Arc::new(BidiDisplay),
        };
        let drop_table = match self.drop_table {
            Some(table) => table,
            None => DropTable::builtin().clone(),
        };
        Sanitizer { fixer, display_order, drop_table: Arc::new(drop_table) }
    }
}

lazy_static! {
    static ref DEFAULT_SANITIZER: Sanitizer = Sanitizer::new();
}

/// Normalizes text and removes characters known to be dropped by Discord.
///
/// See [`Sanitizer::preprocess`].
///
/// # Examples
///
/// ```rust
/// # use safetext::*;
/// # use safetext::model::options::PreprocessOptions;
/// let opts = PreprocessOptions::new().strip_html(true);
/// assert_eq!(preprocess("<b>hi</b>", opts), "hi");
/// assert_eq!(preprocess("\u{202E}olleh", PreprocessOptions::new()), "hello");
/// ```
pub fn preprocess(text: &str, options: PreprocessOptions) -> String {
    DEFAULT_SANITIZER.preprocess(text, options)
}

/// Neutralizes every `@` in the text, optionally preprocessing it first.
///
/// See [`Sanitizer::sanitize_mentions`].
///
/// # Examples
///
/// ```rust
/// # use safetext::*;
/// # use safetext::model::options::SanitizeOptions;
/// assert_eq!(sanitize_mentions("@everyone", SanitizeOptions::new()), "@\u{200B}everyone");
/// ```
pub fn sanitize_mentions(text: &str, options: SanitizeOptions) -> String {
    DEFAULT_SANITIZER.sanitize_mentions(text, options)
}

/// Preprocesses UTF-16 text that may contain unpaired surrogates.
///
/// See [`Sanitizer::preprocess_utf16`].
pub fn preprocess_utf16(units: &[u16], options: PreprocessOptions) -> String {
    DEFAULT_SANITIZER.preprocess_utf16(units, options)
}

/// Sanitizes mentions in UTF-16 text that may contain unpaired surrogates.
///
/// See [`Sanitizer::sanitize_mentions_utf16`].
pub fn sanitize_mentions_utf16(units: &[u16], options: SanitizeOptions) -> String {
    DEFAULT_SANITIZER.sanitize_mentions_utf16(units, options)
}
