use ringbuf_common::Format;

use crate::array::Shape;

/// Coarse classification of an [`Error`].
///
/// Callers branch on this to tell a bad value apart from the wrong kind of
/// input, and both apart from the capacity-boundary signals of the windowed
/// ring operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An argument has an invalid value (zero capacity, empty shape, length mismatch...).
    Value,
    /// An argument is the wrong kind of thing (mismatched format, untyped bytes).
    Type,
    /// Not enough unread elements for a `pop` or `peek`.
    Underflow,
    /// Not enough free slots for a `poke`.
    Overflow,
}

/// Errors returned by the ring buffer, the typed array adapter and `concatenate`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("capacity must be positive")]
    ZeroCapacity,

    #[error("unknown format tag {0:?}")]
    UnknownFormat(char),

    #[error("element count must be positive")]
    ZeroCount,

    #[error("shape {0:?} has no elements")]
    EmptyShape(Shape),

    #[error("shape {0:?} is too large to address")]
    SizeOverflow(Shape),

    #[error("expected 1 or 2 dimensions, got {0}")]
    InvalidDimensions(usize),

    #[error("itemsize {itemsize} does not match format {format} (expected {expected})")]
    ItemsizeMismatch {
        format: Format,
        itemsize: usize,
        expected: usize,
    },

    #[error("{actual} bytes do not hold shape {shape:?} of format {format} ({expected} bytes)")]
    ByteLengthMismatch {
        format: Format,
        shape: Shape,
        expected: usize,
        actual: usize,
    },

    #[error("cannot assign {actual} elements to a view of {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("cannot reshape {from:?} into {to:?}")]
    ReshapeMismatch { from: Shape, to: Shape },

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("address {addr:#x} is not aligned for format {format}")]
    Misaligned { format: Format, addr: usize },

    #[error("need at least one array to concatenate")]
    NoInputs,

    #[error("input {0} is empty")]
    EmptyInput(usize),

    #[error("all inputs are empty")]
    EmptyConcatenation,

    #[error("input {index} has shape {found:?}, incompatible with {expected:?}")]
    DimensionMismatch {
        index: usize,
        expected: Shape,
        found: Shape,
    },

    #[error("expected format {expected}, found {found}")]
    FormatMismatch { expected: Format, found: Format },

    #[error("element type of format {element} cannot view format {format}")]
    IncompatibleElement { element: Format, format: Format },

    #[error("input {0} is raw bytes without a format")]
    RawInput(usize),

    #[error("underflow: requested {requested} elements, {available} available")]
    Underflow { requested: usize, available: usize },

    #[error("overflow: requested {requested} slots, {available} available")]
    Overflow { requested: usize, available: usize },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::FormatMismatch { .. } | Error::IncompatibleElement { .. } | Error::RawInput(_) => {
                ErrorKind::Type
            }
            Error::Underflow { .. } => ErrorKind::Underflow,
            Error::Overflow { .. } => ErrorKind::Overflow,
            Error::ZeroCapacity
            | Error::UnknownFormat(_)
            | Error::ZeroCount
            | Error::EmptyShape(_)
            | Error::SizeOverflow(_)
            | Error::InvalidDimensions(_)
            | Error::ItemsizeMismatch { .. }
            | Error::ByteLengthMismatch { .. }
            | Error::LengthMismatch { .. }
            | Error::ReshapeMismatch { .. }
            | Error::IndexOutOfBounds { .. }
            | Error::Misaligned { .. }
            | Error::NoInputs
            | Error::EmptyInput(_)
            | Error::EmptyConcatenation
            | Error::DimensionMismatch { .. } => ErrorKind::Value,
        }
    }

    #[inline]
    pub fn is_underflow(&self) -> bool {
        self.kind() == ErrorKind::Underflow
    }

    #[inline]
    pub fn is_overflow(&self) -> bool {
        self.kind() == ErrorKind::Overflow
    }
}

pub type Result<T> = core::result::Result<T, Error>;
