//! pipedemo - randomized read/write harness for bytepipe.
//!
//! A writer thread pushes a repeating alphabet into a pipe using random
//! write sizes while the main thread reads it back with random read sizes,
//! reassembles it and checks every 26-byte window.
//!
//! Run with: RUST_LOG=debug cargo run --bin pipedemo -- --rounds 1000

use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use bytepipe::{CloseCause, PipeError, PipeReader, PipeWriter, RingBuffer, pipe};
use clap::Parser;
use tracing::{debug, info, trace};
use tracing_subscriber::EnvFilter;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Randomized read/write harness for bytepipe.
#[derive(Parser, Debug)]
#[command(name = "pipedemo")]
#[command(about = "Stream a repeating alphabet through a bounded pipe and verify it")]
struct Args {
    /// Pipe capacity in bytes
    #[arg(short, long, default_value_t = 1300)]
    capacity: usize,

    /// Alphabets to verify before stopping (0 runs until interrupted)
    #[arg(short, long, default_value_t = 10_000)]
    rounds: u64,

    /// Largest single write, at most 26
    #[arg(long, default_value_t = 26)]
    max_write: usize,

    /// Largest single read
    #[arg(long, default_value_t = 260)]
    max_read: usize,

    /// Pause between writes, in nanoseconds
    #[arg(long, default_value_t = 50)]
    write_pause_ns: u64,

    /// Random seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if args.max_write > ALPHABET.len() {
        bail!("--max-write must be at most {}", ALPHABET.len());
    }
    if args.max_read == 0 {
        bail!("--max-read must be greater than 0");
    }

    let seed = args.seed.unwrap_or_else(|| fastrand::u64(..));
    info!(
        "pipe capacity={} rounds={} seed={}",
        args.capacity, args.rounds, seed
    );

    let (r, w) = pipe(args.capacity).context("failed to create pipe")?;

    let writer = {
        let max_write = args.max_write;
        let pause = Duration::from_nanos(args.write_pause_ns);
        let rng = fastrand::Rng::with_seed(seed);
        thread::spawn(move || write_loop(w, rng, max_write, pause))
    };

    let mut rng = fastrand::Rng::with_seed(seed.wrapping_add(1));
    let verified = read_loop(&r, &mut rng, args.max_read, args.rounds)?;

    r.close_with_error(Some(CloseCause::other("demo finished")))?;
    let written = match writer.join() {
        Ok(result) => result?,
        Err(_) => bail!("writer thread panicked"),
    };

    info!("verified {} alphabets, writer sent {} bytes", verified, written);
    Ok(())
}

/// Writes random-length slices of the repeating alphabet until the reader
/// closes. Returns the number of bytes written.
fn write_loop(w: PipeWriter, mut rng: fastrand::Rng, max_write: usize, pause: Duration) -> Result<u64> {
    let alphabet3 = ALPHABET.repeat(3);
    let mut written = 0u64;
    let mut i = 0;

    loop {
        let c = rng.usize(0..=max_write);
        let n = match w.write(&alphabet3[i..i + c]) {
            Ok(n) => n,
            Err(PipeError::Closed(cause)) => {
                debug!("reader closed: {}", cause);
                return Ok(written);
            }
            Err(e) => return Err(e).context("write to pipe"),
        };
        trace!("wrote {}", String::from_utf8_lossy(&alphabet3[i..i + n]));

        written += n as u64;
        i += n;
        if i >= ALPHABET.len() {
            i -= ALPHABET.len();
        }
        thread::sleep(pause);
    }
}

/// Reads random-length chunks, reassembles them and verifies each alphabet.
/// Returns the number of alphabets verified.
fn read_loop(r: &PipeReader, rng: &mut fastrand::Rng, max_read: usize, rounds: u64) -> Result<u64> {
    let mut buf = vec![0u8; max_read.max(ALPHABET.len())];
    let mut received = RingBuffer::new(2 * max_read.max(ALPHABET.len()))?;
    let mut verified = 0u64;

    while rounds == 0 || verified < rounds {
        let len = rng.usize(0..=max_read);
        let n = r.read(&mut buf[..len]).context("read from pipe")?;

        let c = received
            .write(&buf[..n])
            .context("write to reassembly buffer")?;
        if c != n {
            bail!("only wrote {} of {} bytes to reassembly buffer", c, n);
        }

        while received.buffered() >= ALPHABET.len() {
            let window = &mut buf[..ALPHABET.len()];
            let n = received.read(window);
            if n != ALPHABET.len() {
                bail!("only read {} of {} bytes from reassembly buffer", n, ALPHABET.len());
            }
            debug!(" read {}", String::from_utf8_lossy(window));

            if window[..] != ALPHABET[..] {
                bail!(
                    "expecting '{}', got '{}'",
                    String::from_utf8_lossy(ALPHABET),
                    String::from_utf8_lossy(window)
                );
            }
            verified += 1;
            if rounds != 0 && verified == rounds {
                break;
            }
        }
    }

    Ok(verified)
}
