//! End-to-end tests for bytepipe.
//!
//! These drive real producer and consumer threads through a pipe and check
//! that the byte stream arrives intact no matter how reads and writes are
//! fragmented.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::{CloseCause, PipeError, PipeReader, PipeWriter, Synced, Writer, pipe};

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Writes all of `data`, retrying partial writes.
fn write_all(w: &PipeWriter, mut data: &[u8]) -> Result<(), PipeError> {
    while !data.is_empty() {
        let n = w.write(data)?;
        data = &data[n..];
    }
    Ok(())
}

/// Reads with the given buffer sizes (cycled) until the writer's cause arrives.
fn read_to_close(r: &PipeReader, sizes: &[usize]) -> (Vec<u8>, PipeError) {
    let mut got = Vec::new();
    let mut buf = vec![0u8; sizes.iter().copied().max().unwrap_or(1)];
    for &size in sizes.iter().cycle() {
        match r.read(&mut buf[..size]) {
            Ok(n) => got.extend_from_slice(&buf[..n]),
            Err(e) => return (got, e),
        }
    }
    unreachable!("cycle over a non-empty slice never ends")
}

// ============================================================================
// Stream integrity
// ============================================================================

#[test]
fn test_alphabet_through_small_pipe() {
    let (r, w) = pipe(10).unwrap();

    let producer = thread::spawn(move || {
        write_all(&w, ALPHABET).unwrap();
        w.close().unwrap();
    });

    let (got, err) = read_to_close(&r, &[1, 3, 7, 2, 10, 5, 26]);
    producer.join().unwrap();

    assert_eq!(got, ALPHABET);
    assert!(err.is_eof());
}

#[test]
fn test_alphabet_with_fragmented_writes() {
    let (r, w) = pipe(10).unwrap();

    let producer = thread::spawn(move || {
        for chunk in ALPHABET.chunks(4) {
            write_all(&w, chunk).unwrap();
            thread::sleep(Duration::from_millis(1));
        }
        w.close().unwrap();
    });

    let (got, err) = read_to_close(&r, &[6, 0, 11, 1]);
    producer.join().unwrap();

    assert_eq!(got, ALPHABET);
    assert_eq!(err, PipeError::Closed(CloseCause::Eof));
}

#[test]
fn test_randomized_sizes() {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    let payload: Vec<u8> = (0..50_000).map(|_| rng.u8(..)).collect();
    let expected = payload.clone();

    let (r, w) = pipe(97).unwrap();
    let producer = thread::spawn(move || {
        let mut rng = fastrand::Rng::with_seed(1);
        let mut rest = &payload[..];
        while !rest.is_empty() {
            let len = rng.usize(0..=rest.len().min(300));
            let n = w.write(&rest[..len]).unwrap();
            assert!(n <= len);
            rest = &rest[n..];
        }
        w.close().unwrap();
    });

    let sizes: Vec<usize> = (0..64).map(|_| rng.usize(0..=260)).collect();
    let (got, err) = read_to_close(&r, &sizes);
    producer.join().unwrap();

    assert_eq!(got, expected);
    assert!(err.is_eof());
}

// ============================================================================
// Half-close
// ============================================================================

#[test]
fn test_writer_cause_arrives_after_buffered_bytes() {
    let (r, w) = pipe(16).unwrap();
    let cause = CloseCause::with_kind(std::io::ErrorKind::ConnectionAborted, "upstream aborted");

    w.write(b"pending").unwrap();
    w.close_with_error(Some(cause.clone())).unwrap();

    let (got, err) = read_to_close(&r, &[2]);
    assert_eq!(got, b"pending");
    assert_eq!(err, PipeError::Closed(cause));
}

#[test]
fn test_reader_close_stops_blocked_producer() {
    let (r, w) = pipe(4).unwrap();

    let producer = thread::spawn(move || {
        let mut sent = 0;
        loop {
            match w.write(ALPHABET) {
                Ok(n) => sent += n,
                Err(e) => return (sent, e),
            }
        }
    });

    let mut buf = [0u8; 4];
    assert_eq!(r.read(&mut buf), Ok(4));
    r.close().unwrap();

    let (sent, err) = producer.join().unwrap();
    assert!(sent >= 4);
    assert_eq!(err, PipeError::Closed(CloseCause::ClosedPipe));
    assert_eq!(r.read(&mut buf), Err(PipeError::ClosedPipe));
}

#[test]
fn test_both_sides_closed_is_terminal() {
    let (r, w) = pipe(4).unwrap();
    w.write(b"ab").unwrap();
    w.close().unwrap();

    let (got, _) = read_to_close(&r, &[4]);
    assert_eq!(got, b"ab");
    r.close().unwrap();

    assert!(r.status().is_finished());
    let mut buf = [0u8; 4];
    for _ in 0..3 {
        assert_eq!(r.read(&mut buf), Err(PipeError::ClosedPipe));
        assert_eq!(w.write(b"x"), Err(PipeError::ClosedPipe));
    }
}

// ============================================================================
// Many producers, many consumers
// ============================================================================

#[test]
fn test_many_producers_many_consumers() {
    const PRODUCERS: usize = 4;
    const CONSUMERS: usize = 3;
    const PER_PRODUCER: usize = 5_000;

    let (r, w) = pipe(32).unwrap();
    let w = Arc::new(Synced::new(w));

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|_| {
            let w = Arc::clone(&w);
            thread::spawn(move || {
                let data = vec![1u8; PER_PRODUCER];
                for chunk in data.chunks(37) {
                    assert_eq!(w.write(chunk), Ok(chunk.len()));
                }
            })
        })
        .collect();

    let consumers: Vec<_> = (0..CONSUMERS)
        .map(|i| {
            let r = r.clone();
            thread::spawn(move || {
                let (got, err) = read_to_close(&r, &[i + 1, 17, 64]);
                assert!(err.is_eof());
                got.len()
            })
        })
        .collect();

    for p in producers {
        p.join().unwrap();
    }
    w.get_ref().close().unwrap();

    let total: usize = consumers.into_iter().map(|c| c.join().unwrap()).sum();
    assert_eq!(total, PRODUCERS * PER_PRODUCER);
}
