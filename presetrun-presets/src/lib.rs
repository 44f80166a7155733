//! Presets document ingestion and build-directory resolution.
//!
//! Loading is strict about one thing only: the schema `version`. Everything
//! else is read tolerantly so documents written for newer CMake releases
//! still resolve.
//!
//! Resolution walks workflow preset -> first configure step -> configure
//! preset -> `binaryDir`, and reports a missing link as a
//! [`ResolveError::PresetNotFound`] naming the link and the name sought.

mod error;
mod load;
mod resolve;

pub use error::{PresetLink, PresetLoadError, ResolveError};
pub use load::{load_presets, parse_presets};
pub use resolve::{expand_binary_dir, normalize_lexically, resolve_build_dir};
