//! Random operation sequences checked against a `VecDeque` reference.

use std::collections::VecDeque;

use proptest::prelude::*;
use ringbuf_core::{Format, RingBuffer, TypedBufferExt, TypedBufferMutExt};

#[derive(Debug, Clone)]
enum Op {
    Push(Vec<i16>),
    Pop(usize),
    Peek(usize),
    Poke(usize, i16),
    Read(usize),
    Skip(usize),
    Reset,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => prop::collection::vec(any::<i16>(), 0..40).prop_map(Op::Push),
        3 => (1usize..40).prop_map(Op::Pop),
        2 => (1usize..40).prop_map(Op::Peek),
        2 => (1usize..40, any::<i16>()).prop_map(|(n, v)| Op::Poke(n, v)),
        2 => (1usize..40).prop_map(Op::Read),
        1 => (0usize..40).prop_map(Op::Skip),
        1 => Just(Op::Reset),
    ]
}

proptest! {
    #[test]
    fn matches_fifo_model(capacity in 1usize..64, ops in prop::collection::vec(op(), 1..200)) {
        let mut buffer = RingBuffer::new(Format::Short, capacity).unwrap();
        let mut model: VecDeque<i16> = VecDeque::new();

        for op in ops {
            match op {
                Op::Push(data) => {
                    let free = capacity - model.len();
                    let taken = data.len().min(free);
                    let rest = buffer.push(&data[..]).unwrap();
                    match rest {
                        None => prop_assert_eq!(taken, data.len()),
                        Some(rest) => prop_assert_eq!(rest.elements::<i16>().unwrap(), &data[taken..]),
                    }
                    model.extend(&data[..taken]);
                }
                Op::Pop(count) => match buffer.pop(count) {
                    Ok(out) => {
                        let want: Vec<i16> = model.drain(..count.min(model.len())).collect();
                        prop_assert_eq!(out.to_elements::<i16>().unwrap(), want);
                    }
                    Err(err) => {
                        prop_assert!(err.is_underflow());
                        prop_assert!(model.is_empty());
                    }
                },
                Op::Peek(count) => match buffer.peek(count) {
                    Ok(view) => {
                        let want: Vec<i16> = model.iter().take(count).copied().collect();
                        prop_assert_eq!(view.to_elements::<i16>().unwrap(), want);
                    }
                    Err(err) => {
                        prop_assert!(err.is_underflow());
                        prop_assert!(count > model.len());
                    }
                },
                Op::Poke(count, value) => {
                    match buffer.poke(count, |window| window.fill(value)) {
                        Ok(filled) => {
                            filled.unwrap();
                            model.extend(std::iter::repeat_n(value, count));
                        }
                        Err(err) => {
                            prop_assert!(err.is_overflow());
                            prop_assert!(count > capacity - model.len());
                        }
                    }
                }
                Op::Read(count) => match buffer.read(count).unwrap() {
                    Some(out) => {
                        let want: Vec<i16> = model.drain(..count).collect();
                        prop_assert_eq!(out.to_elements::<i16>().unwrap(), want);
                    }
                    None => prop_assert!(count > model.len()),
                },
                Op::Skip(count) => {
                    let skipped = buffer.skip(count);
                    prop_assert_eq!(skipped, count.min(model.len()));
                    model.drain(..skipped);
                }
                Op::Reset => {
                    buffer.reset();
                    model.clear();
                }
            }
            prop_assert_eq!(buffer.read_available(), model.len());
            prop_assert_eq!(buffer.write_available(), capacity - model.len());
            prop_assert_eq!(buffer.read_available() + buffer.write_available(), capacity);
        }
    }
}
