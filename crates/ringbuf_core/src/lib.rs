//! Lock-free single-producer single-consumer ring buffer for typed elements.
//!
//! This crate provides the storage engine that moves fixed-width numeric
//! elements from one writer thread to one reader thread without locks or
//! per-transfer allocation, the typed array views that describe the data
//! going in and out, and a helper that joins several typed arrays into one.
//! Everything is `no_std` with `alloc` so the same code runs in firmware and
//! on the host.

#![cfg_attr(not(test), no_std)]

extern crate alloc;

/// Typed array adapter.
///
/// Flat or 2-D views over fixed-width elements, owned ([`Array`]) or borrowed
/// ([`ArrayView`], [`ArrayViewMut`]), all sharing the [`TypedBuffer`]
/// contract. Validates itemsize, byte length and element type on every
/// reinterpretation.
pub mod array;

/// Concatenation of typed arrays.
///
/// Produces one freshly allocated array from several inputs of the same
/// format and row width, copying each input with a single memcpy.
pub mod concat;

/// Error taxonomy for every fallible operation in this crate.
pub mod error;

/// Fixed-capacity ring buffer over a contiguous byte region.
///
/// Tracks monotonically increasing read and write cursors, copies elements in
/// and out in at most two memcpys, and exposes zero-copy peek and poke
/// windows over its storage.
pub mod ring_buffer;

/// Writer and reader ends of a split ring buffer.
///
/// Moving each end into its own thread is how the buffer is shared; the
/// handles carry the single-writer, single-reader discipline in their types.
pub mod spsc;

pub use array::{
    Array, ArrayView, ArrayViewMut, Shape, TypedBuffer, TypedBufferExt, TypedBufferMut,
    TypedBufferMutExt,
};
pub use concat::{Operand, concatenate, concatenate_views};
pub use error::{Error, ErrorKind, Result};
pub use ring_buffer::{Peek, RingBuffer};
pub use ringbuf_common::{Element, Format, Kind, Limit, limits, with_element};
pub use spsc::{Consumer, Producer};
