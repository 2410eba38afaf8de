use safetext::prelude::*;
use safetext::model::drop_table::DropEntry;
use safetext::model::options::{FixerConfig, FixStep};
use safetext::ErrorKind;

mod common;

const SHIPPED_TABLE: &str = include_str!("../data/drop_table.json");

#[test]
fn shipped_table_matches_builtin() {
    common::init_tracing();
    let table = DropTable::from_json(SHIPPED_TABLE).unwrap();
    assert_eq!(&table, DropTable::builtin());
}

#[test]
fn sanitizer_uses_loaded_table() {
    common::init_tracing();
    let table = DropTable::from_json(r#"{
        "version": 2,
        "entries": [{"start": "U+2066", "end": "U+2069", "note": "isolates"}]
    }"#).unwrap();
    let sanitizer = Sanitizer::builder().drop_table(table).build();

    let opts = PreprocessOptions::new().fix_directional_overrides(false);
    assert_eq!(sanitizer.preprocess("a\u{2066}b\u{2069}c", opts), "abc");
    // The replacement table no longer lists U+202E.
    assert_eq!(sanitizer.preprocess("a\u{202E}b", opts), "a\u{202E}b");
}

#[test]
fn options_load_from_json() {
    common::init_tracing();
    let opts = SanitizeOptions::from_json(r#"{"strip_html": true}"#).unwrap();
    assert_eq!(sanitize_mentions("<b>@here</b>", opts), "@\u{200B}here");

    let opts = SanitizeOptions::from_json(r#"{"run_preprocess": false}"#).unwrap();
    assert_eq!(sanitize_mentions("<b>@here</b>", opts), "<b>@\u{200B}here</b>");
}

#[test]
fn fixer_config_loads_from_json() {
    common::init_tracing();
    let config = FixerConfig::from_json(r#"{"steps": ["fix_encoding"]}"#).unwrap();
    assert!(config.is_enabled(FixStep::FixEncoding));
    assert!(!config.is_enabled(FixStep::UncurlQuotes));

    let sanitizer = Sanitizer::builder().fixer_config(config).build();
    assert_eq!(sanitizer.preprocess("â€œokâ€\u{9D}", PreprocessOptions::new()),
               "\u{201C}ok\u{201D}");
}

#[test]
fn bad_configuration_is_reported() {
    common::init_tracing();
    let err = SanitizeOptions::from_json("not json").unwrap_err();
    assert_eq!(err.error_kind(), &ErrorKind::InvalidConfig("Could not parse sanitize options."));

    let err = FixerConfig::from_json(r#"{"steps": ["unknown_step"]}"#).unwrap_err();
    assert!(err.is_config());

    let err = DropTable::from_json(r#"{"version": 1, "entries": [{"start": 10, "end": 5}]}"#)
        .unwrap_err();
    assert!(matches!(err.error_kind(), ErrorKind::InvalidDropTable(_)));

    assert!(DropTable::new(1, vec![DropEntry::range(0x10FFFF, 0x110000)]).is_err());
}
