
//! Read the meta data header of OpenEXR files, without decoding any pixels.
//!
//! The header is a list of named, typed attributes,
//! such as the channel list, the compression method, or the data window.
//! Use `HeaderMetadata::read_from_file` to read all attributes of a file into an ordered map.
//!
//! ```no_run
//! use exr_header::prelude::*;
//!
//! let mut warnings: Vec<Warning> = Vec::new();
//! let header = HeaderMetadata::read_from_file("image.exr", ReadOptions::lenient(), &mut warnings)?;
//!
//! if let Some(compression) = header.compression() {
//!     println!("compression: {}", compression.name());
//! }
//!
//! for (name, value) in header.iter() {
//!     println!("{}: {}", name, value);
//! }
//! # Ok::<(), exr_header::error::Error>(())
//! ```

#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused_extern_crates,
    unused,

    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    trivial_numeric_casts,

    clippy::all,
    clippy::pedantic,
    clippy::nursery,
)]

#![forbid(unsafe_code)]


pub mod io;
pub mod math;
pub mod meta;
pub mod error;


/// Export the most important items from `exr_header`.
pub mod prelude {

    // main exports
    pub use crate::meta::HeaderMetadata;
    pub use crate::meta::options::{ReadOptions, DuplicateAttributes};
    pub use crate::meta::diagnostics::{Diagnostics, Warning, WarningKind, IgnoreDiagnostics, TracingDiagnostics};

    // secondary data types
    pub use crate::meta;
    pub use crate::meta::attribute;
    pub use crate::meta::attribute::{AttributeValue, AttributeKind, Text};
    pub use crate::error::{self, Error, Result};
    pub use crate::math::Vec2;
}
