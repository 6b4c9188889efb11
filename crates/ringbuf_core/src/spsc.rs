use alloc::sync::Arc;

use ringbuf_common::Format;

use crate::array::{Array, ArrayView, ArrayViewMut, Shape, TypedBuffer, TypedBufferMut};
use crate::error::Result;
use crate::ring_buffer::{Peek, Ring};

pub(crate) fn split(ring: Ring) -> (Producer, Consumer) {
    let ring = Arc::new(ring);
    (
        Producer {
            ring: Arc::clone(&ring),
        },
        Consumer { ring },
    )
}

/// Writer end of a split [`RingBuffer`](crate::RingBuffer).
///
/// There is exactly one `Producer` per buffer; it is `Send` but not `Clone`,
/// so writes always come from a single thread at a time.
pub struct Producer {
    ring: Arc<Ring>,
}

impl Producer {
    #[inline]
    pub fn format(&self) -> Format {
        self.ring.format()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Free slots. Only grows while the caller is not writing.
    #[inline]
    pub fn write_available(&self) -> usize {
        self.ring.free()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.free() == 0
    }

    /// Whether the [`Consumer`] has been dropped.
    #[inline]
    pub fn is_abandoned(&self) -> bool {
        Arc::strong_count(&self.ring) == 1
    }

    /// See [`RingBuffer::push`](crate::RingBuffer::push).
    pub fn push<'a, B>(&mut self, src: &'a B) -> Result<Option<ArrayView<'a>>>
    where
        B: TypedBuffer + ?Sized,
    {
        // Safety: the only Producer, borrowed mutably.
        unsafe { self.ring.push(src) }
    }

    /// See [`RingBuffer::poke`](crate::RingBuffer::poke).
    pub fn poke<R, F>(&mut self, shape: impl Into<Shape>, fill: F) -> Result<R>
    where
        F: FnOnce(&mut ArrayViewMut<'_>) -> R,
    {
        unsafe { self.ring.poke(shape.into(), fill) }
    }
}

/// Reader end of a split [`RingBuffer`](crate::RingBuffer).
pub struct Consumer {
    ring: Arc<Ring>,
}

impl Consumer {
    #[inline]
    pub fn format(&self) -> Format {
        self.ring.format()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Unread elements. Only grows while the caller is not reading.
    #[inline]
    pub fn read_available(&self) -> usize {
        self.ring.len()
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.ring.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.len() == 0
    }

    /// Whether the [`Producer`] has been dropped. Remaining elements can
    /// still be read.
    #[inline]
    pub fn is_abandoned(&self) -> bool {
        Arc::strong_count(&self.ring) == 1
    }

    /// See [`RingBuffer::pop`](crate::RingBuffer::pop).
    pub fn pop(&mut self, count: usize) -> Result<Array> {
        // Safety: the only Consumer, borrowed mutably.
        unsafe { self.ring.pop(count) }
    }

    /// See [`RingBuffer::pop_into`](crate::RingBuffer::pop_into).
    pub fn pop_into<B>(&mut self, dst: &mut B) -> Result<usize>
    where
        B: TypedBufferMut + ?Sized,
    {
        unsafe { self.ring.pop_into(dst) }
    }

    /// See [`RingBuffer::peek`](crate::RingBuffer::peek).
    pub fn peek(&self, shape: impl Into<Shape>) -> Result<Peek<'_>> {
        // Safety: consuming calls need `&mut self`, so they cannot overlap a
        // live window.
        unsafe { self.ring.peek(shape.into()) }
    }

    /// See [`RingBuffer::read`](crate::RingBuffer::read).
    pub fn read(&mut self, shape: impl Into<Shape>) -> Result<Option<Array>> {
        unsafe { self.ring.read(shape.into()) }
    }

    /// See [`RingBuffer::skip`](crate::RingBuffer::skip).
    pub fn skip(&mut self, count: usize) -> usize {
        unsafe { self.ring.skip(count) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::TypedBufferExt;
    use crate::RingBuffer;

    fn assert_send<T: Send>() {}

    #[test]
    fn handles_are_send() {
        assert_send::<Producer>();
        assert_send::<Consumer>();
    }

    #[test]
    fn split_shares_storage() {
        let buffer = RingBuffer::new(Format::Int, 4).unwrap();
        let (mut producer, mut consumer) = buffer.split();
        assert_eq!(producer.capacity(), 4);
        assert_eq!(consumer.format(), Format::Int);

        assert!(producer.push(&[1i32, 2, 3, 4, 5][..]).unwrap().is_some());
        assert!(producer.is_full());
        assert_eq!(consumer.read_available(), 4);
        assert_eq!(consumer.pop(2).unwrap().to_elements::<i32>().unwrap(), [1, 2]);
        assert_eq!(producer.write_available(), 2);
    }

    #[test]
    fn abandonment_is_visible() {
        let (producer, consumer) = RingBuffer::new(Format::UChar, 2).unwrap().split();
        assert!(!consumer.is_abandoned());
        drop(producer);
        assert!(consumer.is_abandoned());
    }

    #[test]
    fn peek_then_skip_is_zero_copy_consumption() {
        let (mut producer, mut consumer) = RingBuffer::new(Format::Float, 8).unwrap().split();
        producer
            .poke(3usize, |window| window_fill(window))
            .unwrap();
        {
            let window = consumer.peek(3usize).unwrap();
            assert!(!window.is_copied());
            assert_eq!(window.elements::<f32>().unwrap(), &[0.0, 1.0, 2.0]);
        }
        assert_eq!(consumer.skip(10), 3);
        assert!(consumer.is_empty());
    }

    fn window_fill(window: &mut ArrayViewMut<'_>) {
        use crate::array::TypedBufferMutExt;
        for (i, slot) in window.elements_mut::<f32>().unwrap().iter_mut().enumerate() {
            *slot = i as f32;
        }
    }
}
