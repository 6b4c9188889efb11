use alloc::vec::Vec;

use ringbuf_common::Format;
use tracing::debug;

use crate::array::{Array, ArrayView, Shape, TypedBuffer, TypedBufferExt, TypedBufferMut};
use crate::error::{Error, Result};

/// One argument to [`concatenate`].
#[derive(Clone, Copy)]
pub enum Operand<'a> {
    /// A buffer that carries its own format and shape.
    Typed(ArrayView<'a>),
    /// Bytes of unknown format, e.g. straight off a socket. Always rejected.
    Raw(&'a [u8]),
}

/// Covers arrays, views, element slices and `dyn TypedBuffer` alike.
impl<'a, B: TypedBuffer + ?Sized> From<&'a B> for Operand<'a> {
    fn from(buffer: &'a B) -> Self {
        Operand::Typed(buffer.view())
    }
}

/// Joins typed buffers end to end into one newly allocated [`Array`].
///
/// All inputs must share the first input's format and dimensionality; 2-D
/// inputs must also share its row width. The first dimension of the result is
/// the sum of the inputs' first dimensions. Typed inputs without elements
/// contribute nothing, but the result itself must not be empty.
///
/// ```
/// use ringbuf_core::{concatenate, TypedBufferExt};
///
/// let joined = concatenate([&[1i32, 2][..], &[3][..]]).unwrap();
/// assert_eq!(joined.to_elements::<i32>().unwrap(), [1, 2, 3]);
/// ```
pub fn concatenate<'a, I>(inputs: I) -> Result<Array>
where
    I: IntoIterator,
    I::Item: Into<Operand<'a>>,
{
    let mut typed: Vec<ArrayView<'a>> = Vec::new();
    for (index, operand) in inputs.into_iter().map(Into::into).enumerate() {
        match operand {
            Operand::Raw([]) => return Err(Error::EmptyInput(index)),
            Operand::Raw(_) => return Err(Error::RawInput(index)),
            Operand::Typed(buffer) => typed.push(buffer),
        }
    }
    let Some(first) = typed.first() else {
        return Err(Error::NoInputs);
    };

    let format = first.format();
    let template = first.shape();
    let mut extent = 0usize;
    for (index, buffer) in typed.iter().enumerate() {
        check_format(format, buffer.format())?;
        let extent_of = match (template, buffer.shape()) {
            (Shape::Flat(_), Shape::Flat(len)) => len,
            (Shape::Rows { cols, .. }, Shape::Rows { rows, cols: width }) if width == cols => rows,
            (expected, found) => {
                return Err(Error::DimensionMismatch {
                    index,
                    expected,
                    found,
                });
            }
        };
        extent = extent
            .checked_add(extent_of)
            .ok_or(Error::SizeOverflow(buffer.shape()))?;
    }

    let shape = match template {
        Shape::Flat(_) => Shape::Flat(extent),
        Shape::Rows { cols, .. } => Shape::Rows { rows: extent, cols },
    };
    if shape.is_empty() {
        return Err(Error::EmptyConcatenation);
    }

    let mut out = Array::new(format, shape)?;
    let mut offset = 0;
    let dst = out.as_bytes_mut();
    for buffer in &typed {
        let bytes = buffer.as_bytes();
        dst[offset..offset + bytes.len()].copy_from_slice(bytes);
        offset += bytes.len();
    }
    debug_assert_eq!(offset, dst.len());

    debug!(inputs = typed.len(), format = %format, ?shape, "concatenated");
    Ok(out)
}

fn check_format(expected: Format, found: Format) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::FormatMismatch { expected, found })
    }
}

/// Concatenates views, e.g. the remainders handed back by `push`.
pub fn concatenate_views(views: &[ArrayView<'_>]) -> Result<Array> {
    concatenate(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use alloc::vec;

    #[test]
    fn joins_in_argument_order() {
        let a = Array::from_slice(&[1i32, 2, 3]);
        let b = Array::from_slice(&[4i32]);
        let c = Array::from_slice(&[5i32, 6]);
        let joined = concatenate([&a, &b, &c]).unwrap();
        assert_eq!(joined.shape(), Shape::Flat(6));
        assert_eq!(joined.to_elements::<i32>().unwrap(), [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn joins_rows_of_equal_width() {
        let a = Array::from_slice(&[1u8, 2, 3, 4]).reshape((2, 2)).unwrap();
        let b = Array::from_slice(&[5u8, 6]).reshape((1, 2)).unwrap();
        let joined = concatenate([&a, &b]).unwrap();
        assert_eq!(joined.shape(), Shape::rows(3, 2));
        assert_eq!(joined.row::<u8>(2).unwrap(), &[5, 6]);
    }

    #[test]
    fn no_inputs_is_a_usage_error() {
        let err = concatenate(Vec::<Operand<'_>>::new()).unwrap_err();
        assert_eq!(err, Error::NoInputs);
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn empty_raw_input_is_a_usage_error() {
        let err = concatenate([Operand::Raw(b"")]).unwrap_err();
        assert_eq!(err, Error::EmptyInput(0));
        assert_eq!(err.kind(), ErrorKind::Value);
    }

    #[test]
    fn raw_bytes_are_a_type_error() {
        let ints = [1i32, 2];
        let err = concatenate([Operand::Raw(b"hello"), Operand::from(&ints[..])]).unwrap_err();
        assert_eq!(err, Error::RawInput(0));
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn mixed_formats_are_a_type_error() {
        let floats = [1.1f32, 2.2];
        let ints = [1i32, 2];
        let err = concatenate([Operand::from(&floats[..]), Operand::from(&ints[..])]).unwrap_err();
        assert_eq!(
            err,
            Error::FormatMismatch {
                expected: Format::Float,
                found: Format::Int
            }
        );
    }

    #[test]
    fn mixed_dimensions_are_a_usage_error() {
        let flat = Array::from_slice(&[1i64, 2, 3, 4]);
        let square = flat.clone().reshape((2, 2)).unwrap();
        let err = concatenate([&flat, &square]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Value);
        assert!(matches!(err, Error::DimensionMismatch { index: 1, .. }));

        let wide = Array::from_slice(&[1i64, 2, 3, 4]).reshape((1, 4)).unwrap();
        let err = concatenate([&square, &wide]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { index: 1, .. }));
    }

    #[test]
    fn empty_typed_inputs_contribute_nothing() {
        let empty: [u16; 0] = [];
        let some = [7u16, 8];
        let joined = concatenate([&empty[..], &some[..], &empty[..]]).unwrap();
        assert_eq!(joined.to_elements::<u16>().unwrap(), [7, 8]);

        let err = concatenate([&empty[..]]).unwrap_err();
        assert_eq!(err, Error::EmptyConcatenation);
    }

    #[test]
    fn accepts_trait_objects_next_to_slices() {
        let array = Array::from_slice(&[1u32, 2]);
        let erased: &dyn TypedBuffer = &array;
        let tail = [3u32];
        let joined = concatenate([Operand::from(erased), Operand::from(&tail[..])]).unwrap();
        assert_eq!(joined.to_elements::<u32>().unwrap(), [1, 2, 3]);
    }

    #[test]
    fn joins_views() {
        let data = vec![1.0f64, 2.0, 3.0];
        let views = [data.view(), data[..1].view()];
        let joined = concatenate_views(&views).unwrap();
        assert_eq!(joined.to_elements::<f64>().unwrap(), [1.0, 2.0, 3.0, 1.0]);
    }
}
