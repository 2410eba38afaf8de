#![deny(unused_must_use)]

//! Normalizes and sanitizes user-supplied text before it is sent to Discord.
//!
//! Discord silently drops certain Unicode sequences (directional overrides, unpaired
//! surrogates, some variation selectors), and treats `@` as a mass-mention trigger. This crate
//! provides a two-stage pipeline to deal with both:
//!
//! * [`preprocess`] repairs mojibake, resolves directional overrides into display order, and
//!   removes every character Discord is known to drop.
//! * [`sanitize_mentions`] optionally preprocesses the text, then inserts a zero width space
//!   after every `@`.
//!
//! Both are pure functions. For custom collaborators or drop tables, see [`Sanitizer`].

#[macro_use] extern crate derivative;
#[macro_use] extern crate tracing;

pub mod bidi;
pub mod fixer;
pub mod html;
pub mod mentions;
mod pipeline;

#[doc(inline)] pub use pipeline::*;
#[doc(inline)] pub use safetext_errors::{Error, ErrorKind, Result};

/// Options and drop tables used to configure the pipeline.
#[doc(inline)] pub extern crate safetext_model as model;

/// A set of reexports for more conveniently using the library.
pub mod prelude {
    #[doc(no_inline)] pub use crate::{
        Sanitizer, preprocess, sanitize_mentions, preprocess_utf16, sanitize_mentions_utf16,
    };
    pub use safetext_model::drop_table::DropTable;
    pub use safetext_model::options::{PreprocessOptions, SanitizeOptions};
}
