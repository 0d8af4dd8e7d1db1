//! Entry point for elfprobe.
//!
//! This file handles high-level application flow:
//! 1. Parse command-line arguments using `clap`.
//! 2. Initialize logging from `--log-level` (`RUST_LOG` takes precedence).
//! 3. Map the input file into memory.
//! 4. Inspect it and write the model as JSON.
//!
//! Error handling is done via `anyhow`.

use anyhow::{Context, Result};
use clap::Parser;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing_subscriber::EnvFilter;

use elfprobe::config::Config;
use elfprobe::inspect;

fn main() -> Result<()> {
    let config = Config::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let file = File::open(&config.input).with_context(|| format!("failed to open {}", config.input.display()))?;
    let mmap = unsafe { Mmap::map(&file)? };

    let model = inspect(&mmap, &config.options())
        .with_context(|| format!("failed to inspect {}", config.input.display()))?;

    let out: Box<dyn Write> = match &config.output {
        Some(path) => {
            Box::new(File::create(path).with_context(|| format!("failed to create {}", path.display()))?)
        }
        None => Box::new(io::stdout().lock()),
    };
    let mut out = BufWriter::new(out);

    if config.pretty {
        serde_json::to_writer_pretty(&mut out, &model)?;
    } else {
        serde_json::to_writer(&mut out, &model)?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
