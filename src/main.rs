//! utf8-lineseparator - verify UTF-8 encoding and report CR/LF usage.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use utf8stream::{quote_sh, report, BufferedStream};

/// Verify proper UTF-8 encoding and report usage of CR and LF characters in
/// FILE if given, otherwise of STDIN.
#[derive(Parser, Debug)]
#[command(name = "utf8-lineseparator", version)]
struct Args {
    /// Print one JSON object instead of a human-readable summary
    #[arg(long)]
    json: bool,

    /// Log filter, e.g. `debug` or `utf8stream=trace` (default: $RUST_LOG, then `warn`)
    #[arg(long)]
    log: Option<String>,

    /// File to check
    file: Option<PathBuf>,
}

fn init_logging(filter: Option<&str>) {
    let filter = match filter {
        Some(f) => EnvFilter::new(f),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<ExitCode> {
    let mut stream = match &args.file {
        Some(path) => BufferedStream::open_read(path)
            .with_context(|| format!("open {}", quote_sh(&path.to_string_lossy())))?,
        None => BufferedStream::stdin().context("open STDIN")?,
    };

    let outcome = report(&mut stream);
    debug!(bytes = stream.consumed(), failed = outcome.is_failure(), "decoded input");
    if args.json {
        println!("{}", outcome.to_json()?);
    } else if outcome.is_failure() {
        println!("{}: {}", stream.name_sh(), outcome);
    } else {
        println!("{outcome}");
    }

    let name = stream.name_sh();
    stream.close().with_context(|| format!("close {name}"))?;

    Ok(if outcome.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log.as_deref());
    match run(&args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("utf8-lineseparator: {err:#}");
            ExitCode::FAILURE
        }
    }
}
