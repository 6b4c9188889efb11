//! Signal helpers shared by the integration tests.

#![allow(dead_code)]

use ringbuf_core::Element;

/// `len` evenly spaced values across the full range of `T`'s format.
pub fn linspace<T: Element>(len: usize) -> Vec<T> {
    let lo = T::FORMAT.min().as_f64();
    let hi = T::FORMAT.max().as_f64();
    (0..len)
        .map(|i| {
            let t = if len > 1 {
                i as f64 / (len - 1) as f64
            } else {
                0.0
            };
            T::from_f64(lo * (1.0 - t) + hi * t)
        })
        .collect()
}

/// Sizes of `parts` nearly equal pieces of `len`, larger pieces first.
pub fn split_sizes(len: usize, parts: usize) -> Vec<usize> {
    let (base, extra) = (len / parts, len % parts);
    (0..parts).map(|i| base + usize::from(i < extra)).collect()
}
