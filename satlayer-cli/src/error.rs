//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use satlayer::config::{ConfigError, MAPBOX_TOKEN_ENV};
use satlayer::provider::FetchError;
use satlayer::records::RecordError;
use std::fmt;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(ConfigError),
    /// Invalid command-line usage
    Usage(String),
    /// Failed to read a record file
    Records { path: String, error: RecordError },
    /// Failed to build the HTTP client
    Client(FetchError),
    /// `verify` found gaps in one or more splits
    Incomplete { missing: usize, unreadable: usize },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Config(ConfigError::MissingCredential) => {
                eprintln!();
                eprintln!("Provide a MapBox access token in one of these ways:");
                eprintln!("  1. export {}=<token>", MAPBOX_TOKEN_ENV);
                eprintln!("  2. satlayer fetch --token <token> ...");
                eprintln!("  3. Set access_token under [mapbox] in the config file");
                eprintln!("     (run 'satlayer config init' to create one)");
            }
            CliError::Incomplete { .. } => {
                eprintln!();
                eprintln!("Run 'satlayer fetch' again to download missing images.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::Usage(msg) => write!(f, "{}", msg),
            CliError::Records { path, error } => {
                write!(f, "Failed to read records from '{}': {}", path, error)
            }
            CliError::Client(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Incomplete {
                missing,
                unreadable,
            } => write!(
                f,
                "Dataset incomplete: {} missing, {} unreadable",
                missing, unreadable
            ),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Records { error, .. } => Some(error),
            CliError::Client(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<FetchError> for CliError {
    fn from(e: FetchError) -> Self {
        CliError::Client(e)
    }
}
