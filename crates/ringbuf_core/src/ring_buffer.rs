use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::UnsafeCell;
use core::mem::size_of;
use core::ptr;
use core::slice;
use core::sync::atomic::{AtomicU64, Ordering};

use ringbuf_common::Format;
use tracing::{debug, trace};

use crate::array::{
    Array, ArrayView, ArrayViewMut, Shape, TypedBuffer, TypedBufferExt, TypedBufferMut, byte_len,
};
use crate::error::{Error, Result};
use crate::spsc::{Consumer, Producer};

/// Storage engine shared by [`RingBuffer`], [`Producer`] and [`Consumer`].
///
/// Cursors count elements over the buffer's lifetime and are never wrapped;
/// only `cursor % capacity` addresses storage. `write == read` is empty,
/// `write - read == capacity` is full.
///
/// The writer role owns `write` and the free slots, the reader role owns
/// `read` and the filled slots. Every `unsafe fn` below names the role its
/// caller must hold exclusively. `scratch` belongs to the writer as well.
pub(crate) struct Ring {
    storage: Box<[UnsafeCell<u64>]>,
    scratch: UnsafeCell<Vec<u64>>,
    format: Format,
    itemsize: usize,
    capacity: usize,
    _pad0: [u8; 64],
    write: AtomicU64,
    _pad1: [u8; 64],
    read: AtomicU64,
}

// Safety: element bytes are only touched through the writer and reader
// roles, which address disjoint slots and publish them with Release/Acquire
// cursor stores; `scratch` is only touched by the writer. The public handles
// make each role unique.
unsafe impl Sync for Ring {}

impl Ring {
    pub(crate) fn new(format: Format, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        let itemsize = format.itemsize();
        let words = byte_len(format, Shape::Flat(capacity))?.div_ceil(size_of::<u64>());
        let storage = (0..words).map(|_| UnsafeCell::new(0)).collect();
        debug!(format = %format, capacity, "ring buffer allocated");

        Ok(Self {
            storage,
            scratch: UnsafeCell::new(Vec::new()),
            format,
            itemsize,
            capacity,
            _pad0: [0; 64],
            write: AtomicU64::new(0),
            _pad1: [0; 64],
            read: AtomicU64::new(0),
        })
    }

    #[inline(always)]
    pub(crate) fn format(&self) -> Format {
        self.format
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline(always)]
    fn base(&self) -> *mut u8 {
        // `UnsafeCell<u64>` has the layout of `u64`; writes through this
        // pointer are permitted because the bytes live inside the cells.
        self.storage.as_ptr() as *mut u8
    }

    #[inline(always)]
    fn slot(&self, cursor: u64) -> usize {
        (cursor % self.capacity as u64) as usize
    }

    /// `(write, read)` as seen by the writer.
    #[inline(always)]
    fn writer_cursors(&self) -> (u64, u64) {
        let write = self.write.load(Ordering::Relaxed);
        let read = self.read.load(Ordering::Acquire);
        (write, read)
    }

    /// `(read, write)` as seen by the reader.
    #[inline(always)]
    fn reader_cursors(&self) -> (u64, u64) {
        let read = self.read.load(Ordering::Relaxed);
        let write = self.write.load(Ordering::Acquire);
        (read, write)
    }

    /// Number of unread elements from an observer's point of view.
    ///
    /// Exact for either role; a snapshot for anyone else.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        let read = self.read.load(Ordering::Acquire);
        let write = self.write.load(Ordering::Acquire);
        write.saturating_sub(read) as usize
    }

    #[inline]
    pub(crate) fn free(&self) -> usize {
        self.capacity - self.len().min(self.capacity)
    }

    #[inline]
    fn window_len(shape: Shape) -> Result<usize> {
        match shape.checked_len() {
            None => Err(Error::SizeOverflow(shape)),
            Some(0) => Err(Error::EmptyShape(shape)),
            Some(len) => Ok(len),
        }
    }

    fn check_format(&self, found: Format) -> Result<()> {
        if self.format.is_layout_compatible(found) {
            Ok(())
        } else {
            Err(Error::FormatMismatch {
                expected: self.format,
                found,
            })
        }
    }

    /// Copies whole elements from `src` into storage starting at `cursor`,
    /// wrapping at the physical end.
    ///
    /// # Safety
    ///
    /// The caller holds the writer role and `src` fits in the free slots.
    unsafe fn copy_in(&self, cursor: u64, src: &[u8]) {
        let start = self.slot(cursor);
        let count = src.len() / self.itemsize;
        let split = count.min(self.capacity - start) * self.itemsize;
        let base = self.base();
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), base.add(start * self.itemsize), split);
            ptr::copy_nonoverlapping(src.as_ptr().add(split), base, src.len() - split);
        }
    }

    /// Copies whole elements starting at `cursor` out into `dst`.
    ///
    /// # Safety
    ///
    /// The caller holds the reader role and `dst` is no longer than the unread
    /// elements.
    unsafe fn copy_out(&self, cursor: u64, dst: &mut [u8]) {
        let start = self.slot(cursor);
        let count = dst.len() / self.itemsize;
        let split = count.min(self.capacity - start) * self.itemsize;
        let base = self.base();
        let len = dst.len();
        unsafe {
            ptr::copy_nonoverlapping(base.add(start * self.itemsize), dst.as_mut_ptr(), split);
            ptr::copy_nonoverlapping(base, dst.as_mut_ptr().add(split), len - split);
        }
    }

    /// # Safety
    ///
    /// The caller holds the writer role.
    pub(crate) unsafe fn push<'a, B>(&self, src: &'a B) -> Result<Option<ArrayView<'a>>>
    where
        B: TypedBuffer + ?Sized,
    {
        self.check_format(src.format())?;
        let bytes = src.as_bytes();
        let offered = bytes.len() / self.itemsize;
        let (write, read) = self.writer_cursors();
        let free = self.capacity - (write - read) as usize;
        let count = offered.min(free);

        let taken = count * self.itemsize;
        if count > 0 {
            unsafe { self.copy_in(write, &bytes[..taken]) };
            self.write.store(write + count as u64, Ordering::Release);
        }
        if count == offered {
            return Ok(None);
        }

        trace!(offered, accepted = count, "push truncated");
        Ok(Some(ArrayView::new_unchecked(
            src.format(),
            Shape::Flat(offered - count),
            &bytes[taken..],
        )))
    }

    /// Moves up to `dst.len() / itemsize` elements into `dst` and returns
    /// how many were moved.
    ///
    /// # Safety
    ///
    /// The caller holds the reader role.
    unsafe fn pop_bytes(&self, dst: &mut [u8]) -> usize {
        let (read, write) = self.reader_cursors();
        let available = (write - read) as usize;
        let count = (dst.len() / self.itemsize).min(available);
        if count > 0 {
            unsafe { self.copy_out(read, &mut dst[..count * self.itemsize]) };
            self.read.store(read + count as u64, Ordering::Release);
        }
        count
    }

    /// # Safety
    ///
    /// The caller holds the reader role.
    pub(crate) unsafe fn pop(&self, count: usize) -> Result<Array> {
        if count == 0 {
            return Err(Error::ZeroCount);
        }
        let available = self.len();
        if available == 0 {
            trace!(requested = count, "pop underflow");
            return Err(Error::Underflow {
                requested: count,
                available,
            });
        }
        let count = count.min(available);
        let mut out = Array::zeroed(self.format, Shape::Flat(count), count * self.itemsize);
        let moved = unsafe { self.pop_bytes(out.as_bytes_mut()) };
        debug_assert_eq!(moved, out.len());
        Ok(out)
    }

    /// # Safety
    ///
    /// The caller holds the reader role.
    pub(crate) unsafe fn pop_into<B>(&self, dst: &mut B) -> Result<usize>
    where
        B: TypedBufferMut + ?Sized,
    {
        self.check_format(dst.format())?;
        let requested = dst.len();
        if requested == 0 {
            return Err(Error::ZeroCount);
        }
        match unsafe { self.pop_bytes(dst.as_bytes_mut()) } {
            0 => {
                trace!(requested, "pop underflow");
                Err(Error::Underflow {
                    requested,
                    available: 0,
                })
            }
            moved => Ok(moved),
        }
    }

    /// # Safety
    ///
    /// The caller holds the reader role, or shares it only with other
    /// callers of `peek`.
    pub(crate) unsafe fn peek(&self, shape: Shape) -> Result<Peek<'_>> {
        let count = Self::window_len(shape)?;
        let (read, write) = self.reader_cursors();
        let available = (write - read) as usize;
        if count > available {
            trace!(requested = count, available, "peek underflow");
            return Err(Error::Underflow {
                requested: count,
                available,
            });
        }

        let start = self.slot(read);
        if start + count <= self.capacity {
            // Safety: slots `start..start + count` are unread, so the writer
            // leaves them alone until the read cursor moves past them.
            let bytes = unsafe {
                slice::from_raw_parts(
                    self.base().add(start * self.itemsize),
                    count * self.itemsize,
                )
            };
            Ok(Peek::Borrowed(ArrayView::new_unchecked(
                self.format,
                shape,
                bytes,
            )))
        } else {
            let mut copy = Array::zeroed(self.format, shape, count * self.itemsize);
            unsafe { self.copy_out(read, copy.as_bytes_mut()) };
            Ok(Peek::Copied(copy))
        }
    }

    /// # Safety
    ///
    /// The caller holds the writer role.
    pub(crate) unsafe fn poke<R, F>(&self, shape: Shape, fill: F) -> Result<R>
    where
        F: FnOnce(&mut ArrayViewMut<'_>) -> R,
    {
        let count = Self::window_len(shape)?;
        let (write, read) = self.writer_cursors();
        let available = self.capacity - (write - read) as usize;
        if count > available {
            trace!(requested = count, available, "poke overflow");
            return Err(Error::Overflow {
                requested: count,
                available,
            });
        }

        let start = self.slot(write);
        let result = if start + count <= self.capacity {
            // Safety: slots `start..start + count` are free and only the
            // writer touches free slots.
            let bytes = unsafe {
                slice::from_raw_parts_mut(
                    self.base().add(start * self.itemsize),
                    count * self.itemsize,
                )
            };
            fill(&mut ArrayViewMut::new_unchecked(self.format, shape, bytes))
        } else {
            let nbytes = count * self.itemsize;
            // Safety: only the writer role touches `scratch`.
            let scratch = unsafe { &mut *self.scratch.get() };
            let words = nbytes.div_ceil(size_of::<u64>());
            if scratch.len() < words {
                trace!(words, "poke scratch grown");
                scratch.resize(words, 0);
            }
            let bytes =
                unsafe { slice::from_raw_parts_mut(scratch.as_mut_ptr().cast::<u8>(), nbytes) };
            let result = fill(&mut ArrayViewMut::new_unchecked(self.format, shape, &mut *bytes));
            unsafe { self.copy_in(write, bytes) };
            result
        };

        // Commit only once `fill` returned; a panic above leaves the cursor alone.
        self.write.store(write + count as u64, Ordering::Release);
        Ok(result)
    }

    /// # Safety
    ///
    /// The caller holds the reader role.
    pub(crate) unsafe fn read(&self, shape: Shape) -> Result<Option<Array>> {
        let count = Self::window_len(shape)?;
        let (read, write) = self.reader_cursors();
        let available = (write - read) as usize;
        if count > available {
            trace!(requested = count, available, "read found too few elements");
            return Ok(None);
        }
        let mut out = Array::zeroed(self.format, shape, count * self.itemsize);
        unsafe { self.copy_out(read, out.as_bytes_mut()) };
        self.read.store(read + count as u64, Ordering::Release);
        Ok(Some(out))
    }

    /// Drops up to `count` unread elements without copying them.
    ///
    /// # Safety
    ///
    /// The caller holds the reader role.
    pub(crate) unsafe fn skip(&self, count: usize) -> usize {
        let (read, write) = self.reader_cursors();
        let skipped = count.min((write - read) as usize);
        if skipped > 0 {
            self.read.store(read + skipped as u64, Ordering::Release);
        }
        skipped
    }

    pub(crate) fn reset(&mut self) {
        *self.write.get_mut() = 0;
        *self.read.get_mut() = 0;
        debug!(format = %self.format, capacity = self.capacity, "ring buffer reset");
    }
}

/// Result of a peek: a view straight into ring storage, or a copy when the
/// requested window wraps around the physical end of storage.
///
/// Equality looks at format, shape and bytes only, so a borrowed and a copied
/// window with the same contents compare equal.
#[derive(Debug)]
pub enum Peek<'a> {
    Borrowed(ArrayView<'a>),
    Copied(Array),
}

impl PartialEq for Peek<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.format() == other.format()
            && self.shape() == other.shape()
            && self.as_bytes() == other.as_bytes()
    }
}

impl Peek<'_> {
    /// Whether the window had to be materialized.
    pub fn is_copied(&self) -> bool {
        matches!(self, Peek::Copied(_))
    }

    pub fn into_array(self) -> Array {
        match self {
            Peek::Borrowed(view) => view.to_array(),
            Peek::Copied(array) => array,
        }
    }
}

impl TypedBuffer for Peek<'_> {
    fn format(&self) -> Format {
        match self {
            Peek::Borrowed(view) => view.format(),
            Peek::Copied(array) => array.format(),
        }
    }

    fn shape(&self) -> Shape {
        match self {
            Peek::Borrowed(view) => view.shape(),
            Peek::Copied(array) => array.shape(),
        }
    }

    fn as_bytes(&self) -> &[u8] {
        match self {
            Peek::Borrowed(view) => view.as_bytes(),
            Peek::Copied(array) => array.as_bytes(),
        }
    }
}

/// Fixed-capacity FIFO of typed elements.
///
/// A `RingBuffer` owns both ends, so every operation is available through
/// `&mut self` and the borrow checker bounds the lifetime of peek and poke
/// windows. Use [`RingBuffer::split`] to hand the writer and reader ends to
/// two threads.
///
/// ```
/// use ringbuf_core::{Format, RingBuffer, TypedBuffer};
///
/// let mut buffer = RingBuffer::new(Format::UChar, 7).unwrap();
/// assert!(buffer.push(&b"spam"[..]).unwrap().is_none());
/// let rest = buffer.push(&b"eggs"[..]).unwrap().unwrap();
/// assert_eq!(rest.as_bytes(), b"s");
/// assert_eq!(buffer.pop(7).unwrap().as_bytes(), b"spamegg");
/// ```
pub struct RingBuffer {
    ring: Ring,
}

impl RingBuffer {
    /// Allocates a buffer of `capacity` elements of `format`.
    pub fn new(format: Format, capacity: usize) -> Result<Self> {
        Ok(Self {
            ring: Ring::new(format, capacity)?,
        })
    }

    /// Like [`RingBuffer::new`], taking the format as its tag character.
    pub fn with_tag(tag: char, capacity: usize) -> Result<Self> {
        let format = Format::from_tag(tag).ok_or(Error::UnknownFormat(tag))?;
        Self::new(format, capacity)
    }

    #[inline]
    pub fn format(&self) -> Format {
        self.ring.format()
    }

    #[inline]
    pub fn itemsize(&self) -> usize {
        self.ring.itemsize
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Number of unread elements.
    #[inline]
    pub fn size(&self) -> usize {
        self.ring.len()
    }

    #[inline]
    pub fn read_available(&self) -> usize {
        self.ring.len()
    }

    #[inline]
    pub fn write_available(&self) -> usize {
        self.ring.free()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.len() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.free() == 0
    }

    /// Cursors are native 64-bit atomics; no operation takes a lock.
    #[inline]
    pub const fn is_lock_free(&self) -> bool {
        cfg!(target_has_atomic = "64")
    }

    /// Copies as many elements of `src` as fit and returns the rest.
    ///
    /// Running out of space is not an error: the unconsumed tail comes back as
    /// `Some(view)`, and `None` means everything was taken.
    pub fn push<'a, B>(&mut self, src: &'a B) -> Result<Option<ArrayView<'a>>>
    where
        B: TypedBuffer + ?Sized,
    {
        // Safety: `&mut self` holds both roles.
        unsafe { self.ring.push(src) }
    }

    /// Removes up to `count` elements.
    ///
    /// Fails with [`Error::Underflow`] when nothing is available and with
    /// [`Error::ZeroCount`] when `count` is zero.
    pub fn pop(&mut self, count: usize) -> Result<Array> {
        unsafe { self.ring.pop(count) }
    }

    /// Removes up to `dst.len()` elements into `dst`, returning how many were
    /// moved. Underflow and zero-length rules match [`RingBuffer::pop`].
    pub fn pop_into<B>(&mut self, dst: &mut B) -> Result<usize>
    where
        B: TypedBufferMut + ?Sized,
    {
        unsafe { self.ring.pop_into(dst) }
    }

    /// Shows the next `shape` unread elements without consuming them.
    pub fn peek(&self, shape: impl Into<Shape>) -> Result<Peek<'_>> {
        // Safety: `&self` excludes every consuming call while the view lives.
        unsafe { self.ring.peek(shape.into()) }
    }

    /// Lends `fill` a window over the next `shape` free slots and commits them
    /// once it returns.
    ///
    /// The window's initial contents are unspecified; `fill` must write every
    /// element. Fails with [`Error::Overflow`] rather than shrinking the window.
    ///
    /// A window that wraps past the physical end of storage is filled in a
    /// scratch region owned by the writer and then copied in. The region grows
    /// to the largest such window seen and is reused afterwards, so steady
    /// state pokes do not allocate.
    pub fn poke<R, F>(&mut self, shape: impl Into<Shape>, fill: F) -> Result<R>
    where
        F: FnOnce(&mut ArrayViewMut<'_>) -> R,
    {
        unsafe { self.ring.poke(shape.into(), fill) }
    }

    /// Consumes exactly `shape` elements, or returns `Ok(None)` when fewer are
    /// available.
    pub fn read(&mut self, shape: impl Into<Shape>) -> Result<Option<Array>> {
        unsafe { self.ring.read(shape.into()) }
    }

    /// Drops up to `count` unread elements, typically after a [`RingBuffer::peek`].
    pub fn skip(&mut self, count: usize) -> usize {
        unsafe { self.ring.skip(count) }
    }

    /// Discards all content; storage is kept.
    pub fn reset(&mut self) {
        self.ring.reset();
    }

    /// Splits the buffer into its writer and reader ends.
    pub fn split(self) -> (Producer, Consumer) {
        debug!(
            format = %self.ring.format(),
            capacity = self.ring.capacity(),
            "ring buffer split"
        );
        crate::spsc::split(self.ring)
    }
}

impl core::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("format", &self.format())
            .field("capacity", &self.capacity())
            .field("size", &self.size())
            .finish()
    }
}
