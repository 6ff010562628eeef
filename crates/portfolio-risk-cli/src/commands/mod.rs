pub mod analysis;
pub mod optimize;
pub mod prices;
pub mod var;

use std::error::Error;
use std::time::Instant;

use clap::Args;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use portfolio_risk_core::with_metadata;

use crate::input;

pub type CommandResult = Result<Value, Box<dyn Error>>;

/// Request source shared by every file-driven command
#[derive(Args)]
pub struct InputArgs {
    /// Path to a JSON or YAML request file (stdin is read when omitted)
    #[arg(long)]
    pub input: Option<String>,
}

/// Load a typed request from `--input` or piped stdin.
pub fn read_request<T: DeserializeOwned>(
    args: &InputArgs,
    command: &str,
) -> Result<T, Box<dyn Error>> {
    if let Some(ref path) = args.input {
        input::file::read_request(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err(format!("--input <file.json|file.yaml> or stdin required for {command}").into())
    }
}

/// Wrap a core result in the standard output envelope.
pub fn envelope<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    started: Instant,
    result: T,
) -> CommandResult {
    let elapsed_us = started.elapsed().as_micros() as u64;
    let output = with_metadata(methodology, assumptions, warnings, elapsed_us, result);
    Ok(serde_json::to_value(output)?)
}
