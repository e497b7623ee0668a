//! Drydock CLI
//!
//! CLI for tearing down disposable test clusters.
//!
//! Exit codes: 0 on success or idempotent no-op, 2 on configuration errors,
//! 3 on backend errors. Exactly one human-readable line is printed to
//! stderr per failure; stdout stays silent on success.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use drydock_cli::{exit_code, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    // Diagnostics go to stderr so stdout stays script-friendly; a clean run
    // prints nothing unless RUST_LOG raises the filter.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    match cli.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}
