mod generator;
mod stats;
mod stream;
mod throughput;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ringbuf_core::{Format, Shape};
use ringbuf_io::{parse_format, parse_shape};

#[derive(Parser)]
#[command(about = "Generate, stream and concatenate typed sample buffers")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a ramp across the format's full range as a raw sample file.
    Gen {
        #[arg(short, long, default_value = "signal.raw")]
        out: String,
        #[arg(short, long, default_value = "h", value_parser = parse_format)]
        format: Format,
        /// Sample count, or `rows x cols` for a 2-D signal.
        #[arg(short, long, default_value = "4096", value_parser = parse_shape)]
        len: Shape,
    },
    /// Move samples between a producer and a consumer thread.
    Stream {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long, default_value = "h", value_parser = parse_format)]
        format: Format,
        #[arg(short, long, default_value_t = 1 << 16)]
        capacity: usize,
        #[arg(long, default_value = "1024", value_parser = parse_shape)]
        chunk: Shape,
        #[arg(short, long, default_value_t = 5)]
        duration: u64,
        /// Fill the ring in place through poke windows instead of push.
        #[arg(long)]
        zero_copy: bool,
    },
    /// Time joining many arrays into one.
    Concat {
        #[arg(short, long, default_value = "i", value_parser = parse_format)]
        format: Format,
        #[arg(short, long, default_value_t = 100)]
        arrays: usize,
        #[arg(short, long, default_value_t = 100_000)]
        len: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Gen { out, format, len } => {
            generator::generate_signal(&out, format, len)?;
        }
        Commands::Stream {
            input,
            format,
            capacity,
            chunk,
            duration,
            zero_copy,
        } => {
            let config = stream::StreamConfig {
                input,
                format,
                capacity,
                chunk,
                duration_secs: duration,
                zero_copy,
            };
            stream::run_stream(&config)?;
        }
        Commands::Concat {
            format,
            arrays,
            len,
        } => {
            throughput::run_concat_benchmark(format, arrays, len)?;
        }
    }
    Ok(())
}
