// crates/pulse-server/src/main.rs
// ============================================================================
// Module: Pulse Server Entry Point
// Description: Binary entry point for the dashboard HTTP server.
// Purpose: Load configuration, build the server, and serve until failure.
// Dependencies: clap, pulse-config, pulse-server, tokio
// ============================================================================

//! ## Overview
//! Thin binary wrapper: parse arguments, load and validate the config file,
//! then hand off to [`pulse_server::PulseServer`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use pulse_config::PulseConfig;
use pulse_server::PulseServer;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "pulse-server", version)]
struct Cli {
    /// Path to the TOML config file; defaults to `pulse.toml`.
    #[arg(long, value_name = "PATH", env = "PULSE_CONFIG")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Server entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => emit_error(&message),
    }
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "pulse-server: {message}");
    ExitCode::FAILURE
}

/// Loads configuration and serves until the listener fails.
async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let config = PulseConfig::load(cli.config.as_deref()).map_err(|err| err.to_string())?;
    let server = PulseServer::from_config(config).map_err(|err| err.to_string())?;
    server.serve().await.map_err(|err| err.to_string())
}
