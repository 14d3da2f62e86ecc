use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use huff::{Backpatch, Decoder, Encoder, EncoderConfig};

/// Static Huffman compressor.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Compress a file into a huff container
    #[command(visible_alias = "e")]
    Encode {
        /// Input file, or - for stdin
        #[arg(short, long)]
        input: PathBuf,
        /// Output file, or - for stdout
        #[arg(short, long)]
        output: PathBuf,
        /// Build the container in memory instead of patching the header in place
        #[arg(long)]
        buffered: bool,
    },
    /// Restore the original bytes from a huff container
    #[command(visible_alias = "d")]
    Decode {
        /// Input container, or - for stdin
        #[arg(short, long)]
        input: PathBuf,
        /// Output file, or - for stdout
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Create `path` and hand it to `write`, removing the file again if `write` fails.
fn with_output_file<T>(path: &Path, write: impl FnOnce(File) -> huff::Result<T>) -> huff::Result<T> {
    let file = File::create(path)?;
    write(file).map_err(|e| {
        let _ = fs::remove_file(path);
        e
    })
}

fn encode(input: &Path, output: &Path, buffered: bool) -> huff::Result<()> {
    let mut config = EncoderConfig::from_env()?;
    let stdio = is_stdio(input) || is_stdio(output);
    if buffered || stdio {
        if stdio && config.backpatch == Backpatch::Seek {
            log::debug!("stdin/stdout cannot seek, building the container in memory");
        }
        config.backpatch = Backpatch::Buffer;
    }
    let encoder = Encoder::with_config(config)?;
    log::info!("encoding {} into {}", input.display(), output.display());

    let summary = match (is_stdio(input), is_stdio(output)) {
        (false, false) => {
            let mut src = File::open(input)?;
            with_output_file(output, |mut dst| encoder.encode(&mut src, &mut dst))?
        }
        (true, false) => with_output_file(output, |dst| {
            encoder.encode_unseekable(io::stdin().lock(), dst)
        })?,
        (false, true) => encoder.encode_buffered(&mut File::open(input)?, io::stdout().lock())?,
        (true, true) => encoder.encode_unseekable(io::stdin().lock(), io::stdout().lock())?,
    };
    log::info!(
        "{} bytes -> {} bytes ({} distinct symbols)",
        summary.header.original_len,
        summary.output_len,
        summary.distinct_symbols
    );
    Ok(())
}

fn decode(input: &Path, output: &Path) -> huff::Result<()> {
    let decoder = Decoder::new();
    log::info!("decoding {} into {}", input.display(), output.display());

    let summary = match (is_stdio(input), is_stdio(output)) {
        (false, false) => {
            let src = File::open(input)?;
            with_output_file(output, |dst| decoder.decode(src, dst))?
        }
        (true, false) => with_output_file(output, |dst| decoder.decode(io::stdin().lock(), dst))?,
        (false, true) => decoder.decode(File::open(input)?, io::stdout().lock())?,
        (true, true) => decoder.decode(io::stdin().lock(), io::stdout().lock())?,
    };
    log::info!("restored {} bytes", summary.output_len);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let result = match &args.mode {
        Mode::Encode {
            input,
            output,
            buffered,
        } => encode(input, output, *buffered),
        Mode::Decode { input, output } => decode(input, output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("huff: {e}");
            ExitCode::FAILURE
        }
    }
}
