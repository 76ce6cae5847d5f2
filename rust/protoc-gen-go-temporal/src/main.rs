use std::io::{Read, Write};
use std::process::ExitCode;

use prost::Message;
use protoc_gen_go_temporal::{CodeGeneratorRequest, respond};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter directives for the plugin's stderr log, e.g. `debug` or
/// `temporal_codegen=trace`.
const LOG_ENV: &str = "PROTOC_GEN_GO_TEMPORAL_LOG";

fn main() -> ExitCode {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let mut input = Vec::new();
    std::io::stdin().read_to_end(&mut input)?;
    let request = CodeGeneratorRequest::decode(input.as_slice())?;

    let response = respond(&request);
    if let Some(error) = &response.error {
        tracing::debug!(%error, "reporting failure to protoc");
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&response.encode_to_vec())?;
    stdout.flush()?;
    Ok(())
}

// stdout carries the response, so logs go to stderr.
fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()?;
    Ok(())
}
