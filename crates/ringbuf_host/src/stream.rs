use crate::generator;
use crate::stats::LatencyStats;
use anyhow::{Context, Result, anyhow, ensure};
use ringbuf_core::{
    Array, ArrayView, Consumer, Format, Producer, RingBuffer, Shape, TypedBuffer, TypedBufferExt,
    TypedBufferMut,
};
use ringbuf_io::load_samples;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub struct StreamConfig {
    pub input: Option<String>,
    pub format: Format,
    pub capacity: usize,
    pub chunk: Shape,
    pub duration_secs: u64,
    pub zero_copy: bool,
}

#[derive(Default)]
struct StreamCounters {
    pushed: AtomicU64,
    consumed: AtomicU64,
    stalls: AtomicU64,
    mismatches: AtomicU64,
}

pub fn run_stream(config: &StreamConfig) -> Result<()> {
    let source = match &config.input {
        Some(path) => load_samples(path, config.format, None)
            .with_context(|| format!("loading samples from {path}"))?,
        None => generator::signal(config.format, Shape::Flat(config.capacity))?,
    };
    ensure!(!source.is_empty(), "source signal has no samples");

    let chunk_len = config.chunk.len();
    ensure!(
        chunk_len > 0 && chunk_len <= config.capacity,
        "chunk {:?} must hold between 1 and {} elements",
        config.chunk,
        config.capacity
    );

    println!("RING BUFFER STREAMING");
    println!("Format: {} ({} bytes)", config.format, config.format.itemsize());
    println!("Capacity: {} elements", config.capacity);
    println!("Chunk: {:?}", config.chunk);
    println!("Mode: {}", if config.zero_copy { "poke" } else { "push" });
    println!("Source: {} samples", source.len());
    println!("Duration: {} s", config.duration_secs);
    println!("-------------------------------");

    let buffer = RingBuffer::new(config.format, config.capacity)?;
    debug!(lock_free = buffer.is_lock_free(), "ring buffer ready");
    let (producer, consumer) = buffer.split();

    let source = Arc::new(source);
    let running = Arc::new(AtomicBool::new(true));
    let counters = Arc::new(StreamCounters::default());

    let writer = {
        let (source, running, counters) = (source.clone(), running.clone(), counters.clone());
        let zero_copy = config.zero_copy;
        thread::spawn(move || produce(producer, &source, chunk_len, zero_copy, &running, &counters))
    };
    let reader = {
        let (source, running, counters) = (source.clone(), running.clone(), counters.clone());
        let chunk = config.chunk;
        thread::spawn(move || consume(consumer, &source, chunk, &running, &counters))
    };

    let start_time = Instant::now();
    let mut last_consumed = 0;
    while start_time.elapsed().as_secs() < config.duration_secs {
        thread::sleep(Duration::from_secs(1));
        let pushed = counters.pushed.load(Ordering::Relaxed);
        let consumed = counters.consumed.load(Ordering::Relaxed);
        let stalls = counters.stalls.load(Ordering::Relaxed);
        let mismatches = counters.mismatches.load(Ordering::Relaxed);

        let rate = consumed - last_consumed;
        last_consumed = consumed;

        println!(
            "T={:2}s | Pushed: {:10} | Consumed: {:10} ({:9}/s) | Stalls: {:8} | Mismatch: {}",
            start_time.elapsed().as_secs(),
            pushed,
            consumed,
            rate,
            stalls,
            mismatches
        );
    }

    running.store(false, Ordering::Relaxed);
    writer
        .join()
        .map_err(|_| anyhow!("producer thread panicked"))??;
    let latency = reader
        .join()
        .map_err(|_| anyhow!("consumer thread panicked"))??;

    latency.print_report("Read Latency (Service Time)");

    let consumed = counters.consumed.load(Ordering::Relaxed);
    let mismatches = counters.mismatches.load(Ordering::Relaxed);
    info!(consumed, mismatches, "stream finished");
    ensure!(mismatches == 0, "{mismatches} chunks arrived out of order");
    println!("Done.");
    Ok(())
}

fn produce(
    mut producer: Producer,
    source: &Array,
    chunk_len: usize,
    zero_copy: bool,
    running: &AtomicBool,
    counters: &StreamCounters,
) -> Result<()> {
    let bytes = source.as_bytes();
    let itemsize = source.itemsize();
    let total = source.len();
    let mut offset = 0;

    while running.load(Ordering::Relaxed) {
        let sent = if zero_copy {
            let filled = producer.poke(chunk_len, |window| {
                fill_cyclic(bytes, offset * itemsize, window.as_bytes_mut())
            });
            match filled {
                Ok(()) => chunk_len,
                Err(err) if err.is_overflow() => 0,
                Err(err) => return Err(err.into()),
            }
        } else {
            let end = (offset + chunk_len).min(total);
            let chunk = ArrayView::from_bytes(
                source.format(),
                end - offset,
                &bytes[offset * itemsize..end * itemsize],
            )?;
            match producer.push(&chunk)? {
                None => chunk.len(),
                Some(rest) => chunk.len() - rest.len(),
            }
        };

        if sent == 0 {
            counters.stalls.fetch_add(1, Ordering::Relaxed);
            std::hint::spin_loop();
            continue;
        }
        offset = (offset + sent) % total;
        counters.pushed.fetch_add(sent as u64, Ordering::Relaxed);
    }
    Ok(())
}

fn consume(
    mut consumer: Consumer,
    source: &Array,
    chunk: Shape,
    running: &AtomicBool,
    counters: &StreamCounters,
) -> Result<LatencyStats> {
    let bytes = source.as_bytes();
    let mut offset = 0;
    let mut latency = LatencyStats::new();

    while running.load(Ordering::Relaxed) {
        let start = Instant::now();
        let Some(window) = consumer.read(chunk)? else {
            std::hint::spin_loop();
            continue;
        };
        latency.update(start.elapsed().as_nanos() as u64);

        let data = window.as_bytes();
        if !matches_cyclic(bytes, offset, data) {
            let seen = counters.mismatches.fetch_add(1, Ordering::Relaxed);
            if seen == 0 {
                warn!(offset, len = data.len(), "chunk does not match the source signal");
            }
        }
        offset = (offset + data.len()) % bytes.len();
        counters
            .consumed
            .fetch_add(window.len() as u64, Ordering::Relaxed);
    }
    Ok(latency)
}

/// Fills `dst` from `src` starting at byte `start`, wrapping around its end.
fn fill_cyclic(src: &[u8], start: usize, dst: &mut [u8]) {
    let mut pos = start % src.len();
    let mut done = 0;
    while done < dst.len() {
        let n = (src.len() - pos).min(dst.len() - done);
        dst[done..done + n].copy_from_slice(&src[pos..pos + n]);
        done += n;
        pos = 0;
    }
}

fn matches_cyclic(src: &[u8], start: usize, data: &[u8]) -> bool {
    let mut pos = start % src.len();
    let mut done = 0;
    while done < data.len() {
        let n = (src.len() - pos).min(data.len() - done);
        if data[done..done + n] != src[pos..pos + n] {
            return false;
        }
        done += n;
        pos = 0;
    }
    true
}
