use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::mem::{align_of, size_of, size_of_val};
use core::slice;

use ringbuf_common::{Element, Format};

use crate::error::{Error, Result};

/// Extent of a typed array: a flat length or `rows × cols`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Flat(usize),
    Rows { rows: usize, cols: usize },
}

impl Shape {
    #[inline(always)]
    pub const fn flat(len: usize) -> Self {
        Shape::Flat(len)
    }

    #[inline(always)]
    pub const fn rows(rows: usize, cols: usize) -> Self {
        Shape::Rows { rows, cols }
    }

    /// Builds a shape from a dimension list, accepting one or two dimensions.
    pub fn from_dims(dims: &[usize]) -> Result<Self> {
        match *dims {
            [len] => Ok(Shape::Flat(len)),
            [rows, cols] => Ok(Shape::Rows { rows, cols }),
            _ => Err(Error::InvalidDimensions(dims.len())),
        }
    }

    /// Total number of elements, saturating at `usize::MAX`.
    ///
    /// A saturated count is never a valid allocation or window; every
    /// constructor goes through [`Shape::checked_len`] and rejects it.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        match self.checked_len() {
            Some(len) => len,
            None => usize::MAX,
        }
    }

    /// Total number of elements, or `None` if `rows * cols` overflows.
    #[inline(always)]
    pub const fn checked_len(&self) -> Option<usize> {
        match *self {
            Shape::Flat(len) => Some(len),
            Shape::Rows { rows, cols } => rows.checked_mul(cols),
        }
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline(always)]
    pub const fn ndim(&self) -> usize {
        match self {
            Shape::Flat(_) => 1,
            Shape::Rows { .. } => 2,
        }
    }

    /// Extent of the first dimension.
    #[inline(always)]
    pub const fn first(&self) -> usize {
        match *self {
            Shape::Flat(len) => len,
            Shape::Rows { rows, .. } => rows,
        }
    }
}

impl From<usize> for Shape {
    fn from(len: usize) -> Self {
        Shape::Flat(len)
    }
}

impl From<(usize,)> for Shape {
    fn from((len,): (usize,)) -> Self {
        Shape::Flat(len)
    }
}

impl From<(usize, usize)> for Shape {
    fn from((rows, cols): (usize, usize)) -> Self {
        Shape::Rows { rows, cols }
    }
}

impl From<[usize; 1]> for Shape {
    fn from([len]: [usize; 1]) -> Self {
        Shape::Flat(len)
    }
}

impl From<[usize; 2]> for Shape {
    fn from([rows, cols]: [usize; 2]) -> Self {
        Shape::Rows { rows, cols }
    }
}

/// The typed array view contract: a flat run of fixed-width elements with a
/// format and a shape.
///
/// Implementors guarantee `as_bytes().len() == format().itemsize() * shape().len()`.
pub trait TypedBuffer {
    fn format(&self) -> Format;
    fn shape(&self) -> Shape;
    fn as_bytes(&self) -> &[u8];
}

/// A [`TypedBuffer`] whose elements can be written in place.
pub trait TypedBufferMut: TypedBuffer {
    fn as_bytes_mut(&mut self) -> &mut [u8];
}

fn check_element<T: Element>(format: Format) -> Result<()> {
    if T::FORMAT.is_layout_compatible(format) {
        Ok(())
    } else {
        Err(Error::IncompatibleElement {
            element: T::FORMAT,
            format,
        })
    }
}

fn check_aligned<T: Element>(format: Format, ptr: *const u8) -> Result<()> {
    let addr = ptr as usize;
    if addr % align_of::<T>() == 0 {
        Ok(())
    } else {
        Err(Error::Misaligned { format, addr })
    }
}

/// Bytes needed for `shape` elements of `format`, bounded like any allocation
/// by `isize::MAX`.
pub(crate) fn byte_len(format: Format, shape: Shape) -> Result<usize> {
    shape
        .checked_len()
        .and_then(|len| len.checked_mul(format.itemsize()))
        .filter(|&bytes| bytes <= isize::MAX as usize)
        .ok_or(Error::SizeOverflow(shape))
}

fn validate(format: Format, shape: Shape, actual: usize) -> Result<()> {
    let expected = byte_len(format, shape)?;
    if actual == expected {
        Ok(())
    } else {
        Err(Error::ByteLengthMismatch {
            format,
            shape,
            expected,
            actual: actual,
        })
    }
}

fn check_itemsize(format: Format, itemsize: usize) -> Result<()> {
    if itemsize == format.itemsize() {
        Ok(())
    } else {
        Err(Error::ItemsizeMismatch {
            format,
            itemsize,
            expected: format.itemsize(),
        })
    }
}

/// Read access shared by every [`TypedBuffer`].
pub trait TypedBufferExt: TypedBuffer {
    /// Number of elements.
    #[inline]
    fn len(&self) -> usize {
        self.shape().len()
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.shape().is_empty()
    }

    #[inline]
    fn ndim(&self) -> usize {
        self.shape().ndim()
    }

    #[inline]
    fn itemsize(&self) -> usize {
        self.format().itemsize()
    }

    #[inline]
    fn nbytes(&self) -> usize {
        self.as_bytes().len()
    }

    /// Reinterprets the elements as `T` without copying.
    fn elements<T: Element>(&self) -> Result<&[T]> {
        let format = self.format();
        check_element::<T>(format)?;
        let bytes = self.as_bytes();
        check_aligned::<T>(format, bytes.as_ptr())?;
        // Safety: `T` is plain-old-data of the format's width and the pointer
        // is aligned for it. The length divides exactly by construction.
        Ok(unsafe { slice::from_raw_parts(bytes.as_ptr().cast::<T>(), bytes.len() / size_of::<T>()) })
    }

    fn to_elements<T: Element>(&self) -> Result<Vec<T>> {
        self.elements::<T>().map(<[T]>::to_vec)
    }

    /// Element at a flat index.
    fn element<T: Element>(&self, index: usize) -> Result<T> {
        let elements = self.elements::<T>()?;
        elements
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                index,
                len: elements.len(),
            })
    }

    /// One row of a 2-D buffer. A 1-D buffer is a single row.
    fn row<T: Element>(&self, row: usize) -> Result<&[T]> {
        let elements = self.elements::<T>()?;
        let (rows, cols) = match self.shape() {
            Shape::Flat(len) => (1, len),
            Shape::Rows { rows, cols } => (rows, cols),
        };
        if row >= rows {
            return Err(Error::IndexOutOfBounds { index: row, len: rows });
        }
        Ok(&elements[row * cols..(row + 1) * cols])
    }

    fn view(&self) -> ArrayView<'_> {
        ArrayView {
            format: self.format(),
            shape: self.shape(),
            bytes: self.as_bytes(),
        }
    }

    /// Copies the elements into a newly allocated [`Array`].
    fn to_array(&self) -> Array {
        let bytes = self.as_bytes();
        let mut array = Array::zeroed(self.format(), self.shape(), bytes.len());
        array.as_bytes_mut().copy_from_slice(bytes);
        array
    }
}

impl<B: TypedBuffer + ?Sized> TypedBufferExt for B {}

/// Write access shared by every [`TypedBufferMut`].
pub trait TypedBufferMutExt: TypedBufferMut {
    fn elements_mut<T: Element>(&mut self) -> Result<&mut [T]> {
        let format = self.format();
        check_element::<T>(format)?;
        let bytes = self.as_bytes_mut();
        check_aligned::<T>(format, bytes.as_ptr())?;
        let len = bytes.len() / size_of::<T>();
        // Safety: see `TypedBufferExt::elements`.
        Ok(unsafe { slice::from_raw_parts_mut(bytes.as_mut_ptr().cast::<T>(), len) })
    }

    /// Slice assignment: overwrites every element with the elements of `source`.
    ///
    /// Shapes may differ as long as the element counts agree, so a flat source
    /// fills a 2-D destination row by row.
    fn assign<S: TypedBuffer + ?Sized>(&mut self, source: &S) -> Result<()> {
        let format = self.format();
        if !format.is_layout_compatible(source.format()) {
            return Err(Error::FormatMismatch {
                expected: format,
                found: source.format(),
            });
        }
        let (expected, actual) = (self.shape().len(), source.shape().len());
        if expected != actual {
            return Err(Error::LengthMismatch { expected, actual });
        }
        self.as_bytes_mut().copy_from_slice(source.as_bytes());
        Ok(())
    }

    fn fill<T: Element>(&mut self, value: T) -> Result<()> {
        self.elements_mut::<T>()?.fill(value);
        Ok(())
    }

    fn view_mut(&mut self) -> ArrayViewMut<'_> {
        let (format, shape) = (self.format(), self.shape());
        ArrayViewMut {
            format,
            shape,
            bytes: self.as_bytes_mut(),
        }
    }
}

impl<B: TypedBufferMut + ?Sized> TypedBufferMutExt for B {}

impl<T: Element> TypedBuffer for [T] {
    fn format(&self) -> Format {
        T::FORMAT
    }

    fn shape(&self) -> Shape {
        Shape::Flat(self.len())
    }

    fn as_bytes(&self) -> &[u8] {
        // Safety: `T` has no padding and every byte of it is initialized.
        unsafe { slice::from_raw_parts(self.as_ptr().cast::<u8>(), size_of_val(self)) }
    }
}

impl<T: Element> TypedBufferMut for [T] {
    fn as_bytes_mut(&mut self) -> &mut [u8] {
        let len = size_of_val(self);
        // Safety: any byte pattern is a valid `T`.
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr().cast::<u8>(), len) }
    }
}

impl<T: Element> TypedBuffer for Vec<T> {
    fn format(&self) -> Format {
        T::FORMAT
    }

    fn shape(&self) -> Shape {
        Shape::Flat(self.len())
    }

    fn as_bytes(&self) -> &[u8] {
        self.as_slice().as_bytes()
    }
}

impl<T: Element> TypedBufferMut for Vec<T> {
    fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice().as_bytes_mut()
    }
}

/// Owned typed array with 8-byte aligned storage.
#[derive(Clone)]
pub struct Array {
    format: Format,
    shape: Shape,
    words: Vec<u64>,
    len: usize,
}

impl Array {
    /// Allocates a zero-filled array.
    ///
    /// Fails with [`Error::SizeOverflow`] when the shape's byte size does not
    /// fit in memory.
    pub fn new(format: Format, shape: impl Into<Shape>) -> Result<Self> {
        let shape = shape.into();
        let len = byte_len(format, shape)?;
        Ok(Self::zeroed(format, shape, len))
    }

    /// `len` must equal the byte size of `shape`, already known to be valid.
    pub(crate) fn zeroed(format: Format, shape: Shape, len: usize) -> Self {
        Self {
            format,
            shape,
            words: vec![0; len.div_ceil(size_of::<u64>())],
            len,
        }
    }

    /// Allocates a zero-filled array, checking `itemsize` against the format.
    pub fn with_itemsize(format: Format, shape: impl Into<Shape>, itemsize: usize) -> Result<Self> {
        check_itemsize(format, itemsize)?;
        Self::new(format, shape)
    }

    pub fn from_slice<T: Element>(elements: &[T]) -> Self {
        elements.to_array()
    }

    /// Copies `bytes` into a new array of the given format and shape.
    pub fn from_bytes(format: Format, shape: impl Into<Shape>, bytes: &[u8]) -> Result<Self> {
        let shape = shape.into();
        validate(format, shape, bytes.len())?;
        let mut array = Self::zeroed(format, shape, bytes.len());
        array.as_bytes_mut().copy_from_slice(bytes);
        Ok(array)
    }

    /// Reinterprets the same elements under another shape of equal size.
    pub fn reshape(mut self, shape: impl Into<Shape>) -> Result<Self> {
        let shape = shape.into();
        if shape.checked_len() != Some(self.shape.len()) {
            return Err(Error::ReshapeMismatch {
                from: self.shape,
                to: shape,
            });
        }
        self.shape = shape;
        Ok(self)
    }
}

impl TypedBuffer for Array {
    fn format(&self) -> Format {
        self.format
    }

    fn shape(&self) -> Shape {
        self.shape
    }

    fn as_bytes(&self) -> &[u8] {
        // Safety: `words` holds at least `len` initialized bytes.
        unsafe { slice::from_raw_parts(self.words.as_ptr().cast::<u8>(), self.len) }
    }
}

impl TypedBufferMut for Array {
    fn as_bytes_mut(&mut self) -> &mut [u8] {
        // Safety: as above, and `&mut self` is exclusive.
        unsafe { slice::from_raw_parts_mut(self.words.as_mut_ptr().cast::<u8>(), self.len) }
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.format == other.format
            && self.shape == other.shape
            && self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Array")
            .field("format", &self.format)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

/// Non-owning typed view over a caller's memory.
#[derive(Clone, Copy)]
pub struct ArrayView<'a> {
    format: Format,
    shape: Shape,
    bytes: &'a [u8],
}

impl<'a> ArrayView<'a> {
    /// Wraps `bytes`, checking that they hold exactly `shape` elements of `format`.
    pub fn from_bytes(format: Format, shape: impl Into<Shape>, bytes: &'a [u8]) -> Result<Self> {
        let shape = shape.into();
        validate(format, shape, bytes.len())?;
        Ok(Self {
            format,
            shape,
            bytes,
        })
    }

    /// Like [`ArrayView::from_bytes`], additionally checking a caller-declared itemsize.
    pub fn with_itemsize(
        format: Format,
        shape: impl Into<Shape>,
        itemsize: usize,
        bytes: &'a [u8],
    ) -> Result<Self> {
        check_itemsize(format, itemsize)?;
        Self::from_bytes(format, shape, bytes)
    }

    pub(crate) fn new_unchecked(format: Format, shape: Shape, bytes: &'a [u8]) -> Self {
        debug_assert_eq!(bytes.len(), format.itemsize() * shape.len());
        Self {
            format,
            shape,
            bytes,
        }
    }

    /// The viewed bytes, borrowed for the view's full lifetime.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn reshape(self, shape: impl Into<Shape>) -> Result<Self> {
        let shape = shape.into();
        if shape.checked_len() != Some(self.shape.len()) {
            return Err(Error::ReshapeMismatch {
                from: self.shape,
                to: shape,
            });
        }
        Ok(Self { shape, ..self })
    }
}

impl TypedBuffer for ArrayView<'_> {
    fn format(&self) -> Format {
        self.format
    }

    fn shape(&self) -> Shape {
        self.shape
    }

    fn as_bytes(&self) -> &[u8] {
        self.bytes
    }
}

impl PartialEq for ArrayView<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.format == other.format && self.shape == other.shape && self.bytes == other.bytes
    }
}

impl fmt::Debug for ArrayView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayView")
            .field("format", &self.format)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

/// Non-owning mutable typed view.
pub struct ArrayViewMut<'a> {
    format: Format,
    shape: Shape,
    bytes: &'a mut [u8],
}

impl<'a> ArrayViewMut<'a> {
    pub fn from_bytes(format: Format, shape: impl Into<Shape>, bytes: &'a mut [u8]) -> Result<Self> {
        let shape = shape.into();
        validate(format, shape, bytes.len())?;
        Ok(Self {
            format,
            shape,
            bytes,
        })
    }

    pub fn with_itemsize(
        format: Format,
        shape: impl Into<Shape>,
        itemsize: usize,
        bytes: &'a mut [u8],
    ) -> Result<Self> {
        check_itemsize(format, itemsize)?;
        Self::from_bytes(format, shape, bytes)
    }

    pub(crate) fn new_unchecked(format: Format, shape: Shape, bytes: &'a mut [u8]) -> Self {
        debug_assert_eq!(bytes.len(), format.itemsize() * shape.len());
        Self {
            format,
            shape,
            bytes,
        }
    }
}

impl TypedBuffer for ArrayViewMut<'_> {
    fn format(&self) -> Format {
        self.format
    }

    fn shape(&self) -> Shape {
        self.shape
    }

    fn as_bytes(&self) -> &[u8] {
        self.bytes
    }
}

impl TypedBufferMut for ArrayViewMut<'_> {
    fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.bytes
    }
}

impl fmt::Debug for ArrayViewMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayViewMut")
            .field("format", &self.format)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}
