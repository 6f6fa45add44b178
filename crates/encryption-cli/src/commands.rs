//! Argument parsing and command execution.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use encryption::{EncryptOptions, EncryptionDriver, EncryptionManager, Expiry};
use serde_json::Value;
use tracing::debug;

/// Uniform failure message for tokens that fail to decrypt or verify.
const INVALID_TOKEN: &str = "invalid token";

/// Encrypt, decrypt, sign and unsign values with configured drivers.
#[derive(Debug, Parser)]
#[command(name = "encryption-cli", version, about)]
pub struct Cli {
    /// Configured driver name; the default driver when omitted.
    #[arg(long, global = true)]
    pub driver: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Encrypt a payload into a token.
    Encrypt(ProduceArgs),
    /// Decrypt a token and print its payload as JSON.
    Decrypt(ConsumeArgs),
    /// Sign a payload without encrypting it.
    Sign(ProduceArgs),
    /// Verify a signed token and print its payload as JSON.
    Unsign(ConsumeArgs),
}

#[derive(Debug, Args)]
pub struct ProduceArgs {
    /// JSON payload. Text that is not valid JSON is used as a string.
    pub payload: String,

    /// Purpose the token is bound to.
    #[arg(long)]
    pub purpose: Option<String>,

    /// Lifetime such as `30m`, `2 days` or a number of milliseconds.
    #[arg(long, value_name = "DURATION", allow_hyphen_values = true)]
    pub expires_in: Option<Expiry>,
}

impl ProduceArgs {
    fn options(&self) -> EncryptOptions {
        EncryptOptions {
            expires_in: self.expires_in,
            purpose: self.purpose.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct ConsumeArgs {
    /// Token to decrypt or verify.
    pub token: String,

    /// Purpose the token must have been bound to.
    #[arg(long)]
    pub purpose: Option<String>,
}

/// Parse `raw` as JSON, falling back to a JSON string.
pub fn parse_payload(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

/// Run `cli` against `manager` and return what should be printed on stdout.
///
/// # Errors
///
/// Fails on configuration errors, on payloads that cannot be encrypted, and
/// with a uniform "invalid token" for any token that does not verify.
pub fn run(manager: &EncryptionManager, cli: &Cli) -> Result<String> {
    let encryption = manager
        .use_driver(cli.driver.as_deref())
        .context("failed to select encryption driver")?;
    debug!(driver = cli.driver.as_deref().unwrap_or("default"), "running command");

    match &cli.command {
        Command::Encrypt(args) => encryption
            .encrypt_value(&parse_payload(&args.payload), &args.options())
            .context("failed to encrypt payload"),
        Command::Sign(args) => encryption
            .message_verifier()
            .sign_value(&parse_payload(&args.payload), &args.options())
            .context("failed to sign payload"),
        Command::Decrypt(args) => encryption
            .decrypt_value(&args.token, args.purpose.as_deref())
            .map(|value| value.to_string())
            .ok_or_else(|| anyhow!(INVALID_TOKEN)),
        Command::Unsign(args) => encryption
            .message_verifier()
            .unsign_value(&args.token, args.purpose.as_deref())
            .map(|value| value.to_string())
            .ok_or_else(|| anyhow!(INVALID_TOKEN)),
    }
}
