use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::process;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ptp::{convert, Translation};

mod config;

use config::{Cli, Config};

/*
Usage:
  ptp2bin 0800 1f00 program.ptp program.bin

  NOTE: All four arguments are required. START and LENGTH are hex.

 */

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ptp2bin=warn,ptp=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from(Cli::parse());
    if let Err(e) = try_main(&config) {
        eprintln!("ERROR: {:#}", e);
        process::exit(1);
    }
}

fn try_main(config: &Config) -> anyhow::Result<()> {
    let input = File::open(&config.input_path)
        .with_context(|| format!("Failed to open {}", config.input_path.display()))?;
    let output = File::create(&config.output_path)
        .with_context(|| format!("Failed to create {}", config.output_path.display()))?;

    let translation = convert(BufReader::new(input), BufWriter::new(output), config.window)
        .with_context(|| format!("Failed to convert {}", config.input_path.display()))?;
    tracing::debug!(
        "{} records, 0x{:X} bytes kept",
        translation.records,
        translation.written
    );

    println!("{}", summary(&translation));
    Ok(())
}

fn summary(translation: &Translation) -> String {
    format!(
        "Translated {:X} bytes.\n{}",
        translation.total,
        translation.image.window()
    )
}
