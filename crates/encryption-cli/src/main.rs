//! `encryption-cli`: encrypt, decrypt, sign and unsign from the shell.
//!
//! Startup sequence:
//! 1. Parse arguments.
//! 2. Load and validate [`EncryptionConfig`] from `ENCRYPTION__*` variables.
//! 3. Initialise structured JSON logging on stderr.
//! 4. Run the command and print its output on stdout.

mod commands;
mod telemetry;

use anyhow::{Context, Result};
use clap::Parser;
use encryption::{EncryptionConfig, EncryptionManager};

use crate::commands::Cli;

fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Arguments
    // -----------------------------------------------------------------------
    let cli = Cli::parse();

    // -----------------------------------------------------------------------
    // 2. Configuration
    // -----------------------------------------------------------------------
    let cfg = EncryptionConfig::from_env().map_err(|e| {
        eprintln!("ERROR: encryption configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 3. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;

    // -----------------------------------------------------------------------
    // 4. Command
    // -----------------------------------------------------------------------
    let manager =
        EncryptionManager::from_config(&cfg).context("failed to build encryption manager")?;
    let output = commands::run(&manager, &cli)?;
    println!("{output}");
    Ok(())
}
