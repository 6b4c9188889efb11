use std::fs;
use std::path::Path;

use ringbuf_core::{Array, Format, Shape, TypedBuffer};
use tracing::debug;

use crate::{IoError, Result};

/// Loads a raw sample file as an array of `format` elements.
///
/// Without a `shape` the array is flat and holds the whole file. With one,
/// the file must contain exactly `shape.len()` elements.
pub fn load_samples<P: AsRef<Path>>(path: P, format: Format, shape: Option<Shape>) -> Result<Array> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| IoError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if bytes.len() % format.itemsize() != 0 {
        return Err(IoError::PartialElement {
            path: path.to_path_buf(),
            format,
            len: bytes.len(),
        });
    }

    let shape = shape.unwrap_or(Shape::Flat(bytes.len() / format.itemsize()));
    let samples = Array::from_bytes(format, shape, &bytes)?;
    debug!(path = %path.display(), %format, ?shape, "loaded samples");
    Ok(samples)
}

/// Writes the elements of `samples` to `path` in native byte order.
pub fn save_samples<P, B>(path: P, samples: &B) -> Result<()>
where
    P: AsRef<Path>,
    B: TypedBuffer + ?Sized,
{
    let path = path.as_ref();
    fs::write(path, samples.as_bytes()).map_err(|source| IoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        format = %samples.format(),
        shape = ?samples.shape(),
        "saved samples"
    );
    Ok(())
}
