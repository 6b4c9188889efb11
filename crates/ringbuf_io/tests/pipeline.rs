//! File -> ring buffer -> file, with remainders stitched back together.

use std::fs;

use ringbuf_core::{
    Array, ArrayView, RingBuffer, Shape, TypedBuffer, TypedBufferExt, concatenate,
};
use ringbuf_io::{load_samples, parse_format, parse_shape, save_samples};

#[test]
fn samples_survive_a_trip_through_the_ring() {
    let dir = std::env::temp_dir();
    let input = dir.join(format!("ringbuf_pipeline_in_{}.raw", std::process::id()));
    let output = dir.join(format!("ringbuf_pipeline_out_{}.raw", std::process::id()));

    let format = parse_format("=i").unwrap();
    let shape = parse_shape("(50, 2)").unwrap();
    let values: Vec<i32> = (0..100).map(|v| v * 7 - 300).collect();
    save_samples(&input, &values).unwrap();

    let samples = load_samples(&input, format, Some(shape)).unwrap();
    assert_eq!(samples.shape(), Shape::rows(50, 2));

    let mut buffer = RingBuffer::new(format, 32).unwrap();
    let all = samples.view();
    let itemsize = all.itemsize();
    let mut drained: Vec<Array> = Vec::new();
    let mut start = 0;
    while start < all.len() {
        let bytes = &all.bytes()[start * itemsize..];
        let chunk = ArrayView::from_bytes(format, bytes.len() / itemsize, bytes).unwrap();
        let left = buffer.push(&chunk).unwrap().map_or(0, |rest| rest.len());
        start += chunk.len() - left;
        drained.push(buffer.pop(buffer.capacity()).unwrap());
    }
    assert!(buffer.is_empty());

    let joined = concatenate(&drained).unwrap().reshape(shape).unwrap();
    assert_eq!(joined, samples);

    save_samples(&output, &joined).unwrap();
    assert_eq!(fs::read(&output).unwrap(), fs::read(&input).unwrap());

    fs::remove_file(&input).unwrap();
    fs::remove_file(&output).unwrap();
}
