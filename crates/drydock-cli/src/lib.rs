//! Drydock CLI library

pub mod commands;

pub use drydock_common::{Error, ErrorClass, Result};

use clap::{Parser, Subcommand};

/// Drydock - test cluster lifecycle management
#[derive(Parser, Debug)]
#[command(name = "drydock")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bring down a cluster
    Down(commands::down::DownArgs),
}

impl Cli {
    /// Run the CLI command
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Down(args) => commands::down::run(args).await,
        }
    }
}

/// Exit code for configuration errors (missing/malformed config, bad inputs)
pub const EXIT_CONFIG_ERROR: u8 = 2;

/// Exit code for backend errors (delegate unavailable, transition failed)
pub const EXIT_BACKEND_ERROR: u8 = 3;

/// Map a failed invocation to its documented exit code.
///
/// These values are stable; scripts may rely on them to distinguish
/// configuration mistakes from backend failures.
pub fn exit_code(err: &Error) -> u8 {
    match err.class() {
        ErrorClass::Config => EXIT_CONFIG_ERROR,
        ErrorClass::Backend => EXIT_BACKEND_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn down_parses_config_and_image_flags() {
        let cli = Cli::try_parse_from([
            "drydock",
            "down",
            "--config",
            "/topo/cluster.yml",
            "--image",
            "registry.local/deck:1.2",
        ])
        .unwrap();

        let Commands::Down(args) = cli.command;
        assert_eq!(
            args.config.as_deref(),
            Some(std::path::Path::new("/topo/cluster.yml"))
        );
        assert_eq!(args.image.as_deref(), Some("registry.local/deck:1.2"));
    }

    #[test]
    fn down_flags_are_optional() {
        let cli = Cli::try_parse_from(["drydock", "down"]).unwrap();
        let Commands::Down(args) = cli.command;
        assert!(args.config.is_none());
    }

    #[test]
    fn exit_codes_distinguish_config_from_backend() {
        assert_eq!(
            exit_code(&Error::config_not_found("config.yml")),
            EXIT_CONFIG_ERROR
        );
        assert_eq!(
            exit_code(&Error::invalid_cluster_config("no image")),
            EXIT_CONFIG_ERROR
        );
        assert_eq!(
            exit_code(&Error::backend_unavailable("compose", "down")),
            EXIT_BACKEND_ERROR
        );
        assert_eq!(
            exit_code(&Error::transition_failed("deck", "boom")),
            EXIT_BACKEND_ERROR
        );
    }
}
