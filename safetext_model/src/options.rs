//! Options controlling the text pipeline.

use crate::serde::*;
use derive_setters::*;
use safetext_errors::*;

/// Options controlling how text is normalized before it is sent to Discord.
#[derive(Serialize, Deserialize, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Hash)]
#[derive(Setters)]
#[serde(default)]
#[non_exhaustive]
pub struct PreprocessOptions {
    /// Strips HTML comments and tags, and decodes HTML entities.
    ///
    /// Tags are removed with a regular expression, not an HTML parser. Malformed markup is
    /// handled exactly as that expression handles it.
    pub strip_html: bool,
    /// Replaces the text with its visual display order, as computed by the Unicode
    /// Bidirectional Algorithm.
    ///
    /// This flattens directional override characters into the order they would render in,
    /// rather than leaving the raw override codepoints in the string.
    pub fix_directional_overrides: bool,
}
impl PreprocessOptions {
    /// Creates the default preprocess options.
    pub fn new() -> Self {
        Default::default()
    }

    /// Parses preprocess options from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).invalid_config("Could not parse preprocess options.")
    }
}
impl Default for PreprocessOptions {
    fn default() -> Self {
        PreprocessOptions {
            strip_html: false,
            fix_directional_overrides: true,
        }
    }
}

/// Options controlling how mentions are neutralized.
///
/// When serialized, the fields of [`PreprocessOptions`] are flattened into this structure.
#[derive(Serialize, Deserialize, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Hash)]
#[derive(Setters)]
#[serde(default)]
#[non_exhaustive]
pub struct SanitizeOptions {
    /// Normalizes the text with the preprocessor before neutralizing mentions.
    pub run_preprocess: bool,
    /// The options forwarded to the preprocessor.
    #[serde(flatten)]
    pub preprocess: PreprocessOptions,
}
impl SanitizeOptions {
    /// Creates the default sanitize options.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets [`PreprocessOptions::strip_html`] on the forwarded options.
    pub fn strip_html(mut self, strip_html: bool) -> Self {
        self.preprocess.strip_html = strip_html;
        self
    }

    /// Sets [`PreprocessOptions::fix_directional_overrides`] on the forwarded options.
    pub fn fix_directional_overrides(mut self, fix: bool) -> Self {
        self.preprocess.fix_directional_overrides = fix;
        self
    }

    /// Parses sanitize options from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).invalid_config("Could not parse sanitize options.")
    }
}
impl Default for SanitizeOptions {
    fn default() -> Self {
        SanitizeOptions {
            run_preprocess: true,
            preprocess: PreprocessOptions::default(),
        }
    }
}
impl From<PreprocessOptions> for SanitizeOptions {
    fn from(preprocess: PreprocessOptions) -> Self {
        SanitizeOptions { run_preprocess: true, preprocess }
    }
}

/// A step of mojibake repair.
///
/// Steps run in the order they are declared here.
#[derive(Serialize, Deserialize, EnumSetType, Ord, PartialOrd, Debug, Hash, AsRefStr)]
#[enumset(serialize_repr = "list")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[non_exhaustive]
pub enum FixStep {
    /// Removes ANSI terminal escape sequences.
    RemoveTerminalEscapes,
    /// Decodes UTF-8 that was misread as Windows-1252 or Latin-1.
    FixEncoding,
    /// Replaces leftover C1 control characters with their Windows-1252 equivalents.
    FixC1Controls,
    /// Expands Latin ligatures such as `ﬁ` into separate letters.
    FixLatinLigatures,
    /// Replaces fullwidth ASCII characters with their normal width forms.
    FixCharacterWidth,
    /// Replaces curly quotes with straight quotes.
    UncurlQuotes,
    /// Converts all line breaks to `\n`.
    FixLineBreaks,
    /// Removes control and formatting characters with no visible purpose.
    RemoveControlChars,
    /// Applies Unicode NFC normalization.
    Normalize,
}

/// Configures which steps of mojibake repair run.
#[derive(Serialize, Deserialize, Copy, Clone, Eq, PartialEq, Debug, Hash, Setters)]
#[serde(default)]
#[non_exhaustive]
pub struct FixerConfig {
    /// The set of repair steps to run.
    pub steps: EnumSet<FixStep>,
}
impl FixerConfig {
    /// Creates a configuration with every step enabled.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a configuration with no steps enabled.
    pub fn none() -> Self {
        FixerConfig { steps: EnumSet::empty() }
    }

    /// Enables a step.
    pub fn enable(mut self, step: FixStep) -> Self {
        self.steps.insert(step);
        self
    }

    /// Disables a step.
    pub fn disable(mut self, step: FixStep) -> Self {
        self.steps.remove(step);
        self
    }

    /// Returns whether a step is enabled.
    pub fn is_enabled(&self, step: FixStep) -> bool {
        self.steps.contains(step)
    }

    /// Parses a fixer configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).invalid_config("Could not parse fixer configuration.")
    }
}
impl Default for FixerConfig {
    fn default() -> Self {
        FixerConfig { steps: EnumSet::all() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let opts = SanitizeOptions::default();
        assert!(opts.run_preprocess);
        assert!(!opts.preprocess.strip_html);
        assert!(opts.preprocess.fix_directional_overrides);
    }

    #[test]
    fn sanitize_options_flatten_preprocess_fields() {
        let opts = SanitizeOptions::from_json(r#"{"run_preprocess": false, "strip_html": true}"#)
            .unwrap();
        assert!(!opts.run_preprocess);
        assert!(opts.preprocess.strip_html);
        assert!(opts.preprocess.fix_directional_overrides);

        let value: serde_json::Value = serde_json::to_value(opts).unwrap();
        assert_eq!(value["strip_html"], serde_json::Value::Bool(true));
        assert!(value.get("preprocess").is_none());
    }

    #[test]
    fn setters_chain() {
        let opts = SanitizeOptions::new().strip_html(true).fix_directional_overrides(false);
        assert_eq!(opts.preprocess, PreprocessOptions::new()
            .strip_html(true)
            .fix_directional_overrides(false));
    }

    #[test]
    fn malformed_options_are_config_errors() {
        let err = PreprocessOptions::from_json(r#"{"strip_html": "yes"}"#).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn fixer_config_serializes_as_list() {
        let config = FixerConfig::none().enable(FixStep::FixEncoding).enable(FixStep::Normalize);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"steps":["fix_encoding","normalize"]}"#);
        assert_eq!(FixerConfig::from_json(&json).unwrap(), config);
        assert!(FixerConfig::from_json("{}").unwrap().is_enabled(FixStep::UncurlQuotes));
        assert_eq!(FixStep::UncurlQuotes.as_ref(), "uncurl_quotes");
    }
}
