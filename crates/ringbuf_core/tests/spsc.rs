//! Cross-thread behaviour of the split producer and consumer handles.

use std::thread;

use ringbuf_core::{Format, RingBuffer, TypedBufferExt, TypedBufferMutExt};

const TOTAL: u64 = 200_000;

#[test]
fn elements_arrive_in_order_across_threads() {
    let (mut producer, mut consumer) = RingBuffer::new(Format::ULongLong, 1024).unwrap().split();

    let writer = thread::spawn(move || {
        let mut next = 0u64;
        while next < TOTAL {
            let end = (next + 97).min(TOTAL);
            let chunk: Vec<u64> = (next..end).collect();
            let mut pending = &chunk[..];
            loop {
                match producer.push(pending).unwrap() {
                    None => break,
                    Some(rest) => {
                        let taken = pending.len() - rest.len();
                        pending = &pending[taken..];
                        thread::yield_now();
                    }
                }
            }
            next = end;
        }
    });

    let mut expected = 0u64;
    let mut scratch = vec![0u64; 61];
    while expected < TOTAL {
        match consumer.pop_into(&mut scratch[..]) {
            Ok(moved) => {
                for &value in &scratch[..moved] {
                    assert_eq!(value, expected);
                    expected += 1;
                }
            }
            Err(err) if err.is_underflow() => thread::yield_now(),
            Err(err) => panic!("unexpected error: {err}"),
        }
    }

    writer.join().unwrap();
    assert!(consumer.is_empty());
    assert!(consumer.is_abandoned());
}

#[test]
fn poke_and_read_across_threads() {
    const WINDOW: usize = 64;
    const WINDOWS: usize = 2_000;

    let (mut producer, mut consumer) = RingBuffer::new(Format::Int, 250).unwrap().split();

    let writer = thread::spawn(move || {
        for w in 0..WINDOWS {
            loop {
                let filled = producer.poke(WINDOW, |window| {
                    let base = (w * WINDOW) as i32;
                    for (i, slot) in window.elements_mut::<i32>().unwrap().iter_mut().enumerate() {
                        *slot = base + i as i32;
                    }
                });
                match filled {
                    Ok(()) => break,
                    Err(err) if err.is_overflow() => thread::yield_now(),
                    Err(err) => panic!("unexpected error: {err}"),
                }
            }
        }
    });

    let mut expected = 0i32;
    let mut windows = 0;
    while windows < WINDOWS {
        match consumer.read(WINDOW).unwrap() {
            Some(window) => {
                for &value in window.elements::<i32>().unwrap() {
                    assert_eq!(value, expected);
                    expected += 1;
                }
                windows += 1;
            }
            None => thread::yield_now(),
        }
    }

    writer.join().unwrap();
    assert_eq!(consumer.read_available(), 0);
}
