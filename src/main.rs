// src/main.rs
mod logger;

use clap::{Parser, Subcommand};
use huff::{CodecConfig, HuffError, config::DEFAULT_BUFFER_CAPACITY};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(name = "huff", version)]
#[command(about = "Compress and restore files with a static Huffman code.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Staging buffer size in bytes, rounded down to whole 8-byte words
    #[arg(long, global = true, default_value_t = DEFAULT_BUFFER_CAPACITY)]
    buffer_size: usize,

    /// Log more (repeat for debug and trace output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log errors only
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress INPUT into OUTPUT
    Encode { input: PathBuf, output: PathBuf },
    /// Restore a compressed INPUT into OUTPUT
    Decode { input: PathBuf, output: PathBuf },
    /// Compress and restore INPUT in memory and compare digests
    Check { input: PathBuf },
}

fn run(cli: Cli) -> Result<bool, HuffError> {
    let config = CodecConfig::new(cli.buffer_size)?;
    match cli.command {
        Commands::Encode { input, output } => {
            let summary = huff::encode_file(&input, &output, &config)?;
            println!(
                "{} -> {}: {} bytes -> {} bytes ({:.1}%)",
                input.display(),
                output.display(),
                summary.original_len,
                summary.encoded_len,
                summary.ratio() * 100.0
            );
            Ok(true)
        }
        Commands::Decode { input, output } => {
            let summary = huff::decode_file(&input, &output, &config)?;
            println!(
                "{} -> {}: restored {} bytes",
                input.display(),
                output.display(),
                summary.original_len
            );
            Ok(true)
        }
        Commands::Check { input } => {
            let report = huff::verify_file(&input, &config)?;
            let digest: String = report
                .original_digest
                .iter()
                .map(|byte| format!("{:02x}", byte))
                .collect();
            if report.is_match() {
                println!(
                    "{}: OK ({} bytes, {} encoded, sha256 {})",
                    input.display(),
                    report.original_len,
                    report.encoded_len,
                    digest
                );
            } else {
                println!("{}: MISMATCH after round trip", input.display());
            }
            Ok(report.is_match())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(logger::level_for(cli.verbose, cli.quiet));

    let span = tracing::info_span!("command_execution", command = ?std::env::args().collect::<Vec<_>>());
    let _enter = span.enter();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
