use anyhow::{Result, ensure};
use rayon::prelude::*;
use ringbuf_core::{
    Array, Element, Format, TypedBuffer, TypedBufferExt, TypedBufferMutExt, concatenate,
    with_element,
};
use std::time::Instant;
use tracing::info;

/// Array `i` holds the value `i` (wrapped into the format's range) in every slot.
fn build_inputs(format: Format, arrays: usize, len: usize) -> Result<Vec<Array>> {
    let inputs = (0..arrays)
        .into_par_iter()
        .map(|i| -> Result<Array> {
            let mut array = Array::new(format, len)?;
            with_element!(format, T => array.fill(T::from_f64((i % 128) as f64)))?;
            Ok(array)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(inputs)
}

pub fn run_concat_benchmark(format: Format, arrays: usize, len: usize) -> Result<()> {
    ensure!(arrays > 0 && len > 0, "need at least one non-empty input array");

    println!("Filling {arrays} arrays of {len} {format} elements (Parallel - Rayon)...");
    let start_fill = Instant::now();
    let inputs = build_inputs(format, arrays, len)?;
    println!("Filled in {:?}", start_fill.elapsed());

    let start_bench = Instant::now();
    let joined = concatenate(&inputs)?;
    let duration = start_bench.elapsed();

    ensure!(joined.len() == arrays * len, "joined array has the wrong length");
    let last = with_element!(format, T => joined.element::<T>(joined.len() - 1)?.to_f64());
    ensure!(
        last == ((arrays - 1) % 128) as f64,
        "last element {last} does not come from the last input"
    );

    let seconds = duration.as_secs_f64();
    let gib = joined.nbytes() as f64 / (1u64 << 30) as f64;
    info!(arrays, len, %format, seconds, "concatenation finished");

    println!("Results");
    println!("Time: {:.6} s", seconds);
    println!("Throughput: {:.2} GiB/s", gib / seconds.max(f64::MIN_POSITIVE));
    println!("Shape: {:?}", joined.shape());

    Ok(())
}
