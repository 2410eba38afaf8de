//! Reads text from stdin and prints it sanitized for Discord.
//!
//! Flags: `--strip-html`, `--keep-overrides`, `--no-preprocess`.

use safetext::prelude::*;
use std::env;
use std::io::{self, Read};

fn init_tracing() {
    tracing_log::LogTracer::init().unwrap();
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).unwrap();
}

pub fn main() {
    init_tracing();

    let mut opts = SanitizeOptions::new();
    for arg in env::args().skip(1) {
        opts = match arg.as_str() {
            "--strip-html" => opts.strip_html(true),
            "--keep-overrides" => opts.fix_directional_overrides(false),
            "--no-preprocess" => opts.run_preprocess(false),
            other => {
                eprintln!("Unknown flag '{}'.", other);
                std::process::exit(2);
            }
        };
    }

    let mut input = String::new();
    io::stdin().read_to_string(&mut input).expect("could not read stdin");
    log::info!("Sanitizing {} bytes with {:?}.", input.len(), opts);
    print!("{}", sanitize_mentions(&input, opts));
}
