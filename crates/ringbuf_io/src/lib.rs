//! File and text helpers around the ring buffer's typed arrays.
//!
//! Sample files are raw native-endian element dumps with no header; the
//! element format and shape travel out of band, usually as command-line
//! descriptors parsed here.

use std::path::PathBuf;

use ringbuf_core::Format;

/// Raw sample file loading and saving.
///
/// Reads a file of native-endian elements into an owned [`ringbuf_core::Array`]
/// after checking that its length is a whole number of elements, and writes
/// any typed buffer back out byte for byte.
pub mod loader;

/// Parsers for shape and format descriptors.
///
/// Accepts `4096`, `2048x2` and `(2048, 2)` for shapes and a single format
/// tag such as `f` (optionally prefixed with the native byte-order marker
/// `@` or `=`) for formats.
pub mod parser;

pub use loader::{load_samples, save_samples};
pub use parser::{parse_format, parse_shape};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {len} bytes is not a whole number of {format} elements", path.display())]
    PartialElement {
        path: PathBuf,
        format: Format,
        len: usize,
    },

    #[error("invalid {what} descriptor {input:?}")]
    Parse { what: &'static str, input: String },

    #[error(transparent)]
    Buffer(#[from] ringbuf_core::Error),
}

pub type Result<T> = std::result::Result<T, IoError>;
