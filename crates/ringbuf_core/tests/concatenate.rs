use ringbuf_core::{
    Array, Error, ErrorKind, Format, Operand, RingBuffer, Shape, TypedBuffer, TypedBufferExt,
    TypedBufferMutExt, concatenate, concatenate_views,
};

#[test]
fn joins_many_int_arrays() {
    let arrays: Vec<Array> = (0..100)
        .map(|i| {
            let mut array = Array::with_itemsize(Format::Int, 1000usize, 4).unwrap();
            array.fill(i as i32).unwrap();
            array
        })
        .collect();

    let joined = concatenate(&arrays).unwrap();
    assert_eq!(joined.format(), Format::Int);
    assert_eq!(joined.shape(), Shape::Flat(100_000));

    let values = joined.elements::<i32>().unwrap();
    for (i, chunk) in values.chunks(1000).enumerate() {
        assert!(chunk.iter().all(|&v| v == i as i32));
    }
}

#[test]
fn rejects_bad_inputs() {
    let floats = [1.5f64, 2.5];
    let ints = [1i64, 2];

    let err = concatenate(Vec::<Operand<'_>>::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);

    let err = concatenate([Operand::from(&floats[..]), Operand::from(&ints[..])]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);

    let err = concatenate([Operand::Raw(b"hello"), Operand::from(&ints[..])]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);

    let err = concatenate([Operand::Raw(b"")]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Value);

    let square = Array::from_slice(&ints[..]).reshape((1, 2)).unwrap();
    let err = concatenate([Operand::from(&square), Operand::from(&ints[..])]).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { index: 1, .. }));
    assert_eq!(err.kind(), ErrorKind::Value);
}

#[test]
fn single_input_is_copied() {
    let data = [3u16, 1, 4, 1, 5];
    let joined = concatenate([&data[..]]).unwrap();
    assert_eq!(joined.to_elements::<u16>().unwrap(), data);
}

#[test]
fn stitches_push_remainders() {
    let mut buffer = RingBuffer::new(Format::Short, 3).unwrap();
    let first = [1i16, 2, 3, 4];
    let second = [5i16, 6];

    let left = buffer.push(&first[..]).unwrap().unwrap();
    let right = buffer.push(&second[..]).unwrap().unwrap();
    let pending = concatenate_views(&[left, right]).unwrap();
    assert_eq!(pending.to_elements::<i16>().unwrap(), [4, 5, 6]);

    buffer.pop(3).unwrap();
    assert!(buffer.push(&pending).unwrap().is_none());
    assert_eq!(buffer.pop(3).unwrap().to_elements::<i16>().unwrap(), [4, 5, 6]);
}
