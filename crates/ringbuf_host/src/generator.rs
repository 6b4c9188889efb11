//! Test signal generator.
//!
//! Produces evenly spaced ramps spanning a format's whole representable range,
//! so a single file exercises the smallest and largest values of the type.

use anyhow::{Context, Result};
use ringbuf_core::{Array, Element, Format, Shape, TypedBufferExt, TypedBufferMutExt, with_element};
use ringbuf_io::save_samples;
use tracing::info;

/// `len` evenly spaced values from the lowest to the highest value of `T`.
pub fn linspace<T: Element>(len: usize) -> Vec<T> {
    let lo = T::FORMAT.min().as_f64();
    let hi = T::FORMAT.max().as_f64();
    let last = len.saturating_sub(1).max(1) as f64;
    (0..len)
        .map(|i| {
            let t = i as f64 / last;
            T::from_f64(lo * (1.0 - t) + hi * t)
        })
        .collect()
}

/// A ramp of `format` elements laid out as `shape`.
pub fn signal(format: Format, shape: Shape) -> Result<Array> {
    let mut samples = Array::new(format, shape)?;
    with_element!(format, T => samples.assign(&linspace::<T>(shape.len())[..]))?;
    Ok(samples)
}

pub fn generate_signal(path: &str, format: Format, shape: Shape) -> Result<()> {
    let samples = signal(format, shape)?;
    save_samples(path, &samples).with_context(|| format!("writing signal to {path}"))?;
    info!(
        path,
        %format,
        ?shape,
        bytes = samples.nbytes(),
        "generated signal"
    );
    println!("Wrote {} {} samples to {}", shape.len(), format, path);
    Ok(())
}
