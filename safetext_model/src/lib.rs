//! Types used to configure the safetext pipeline.
//!
//! This is reexposed in `safetext`, and that should be preferred over this crate.

#[macro_use] extern crate tracing;

mod serde;

pub mod drop_table;
pub mod options;
