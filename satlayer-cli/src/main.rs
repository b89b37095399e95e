//! SatLayer CLI - Command-line interface
//!
//! This binary provides a command-line interface to the SatLayer library:
//! fetch satellite imagery for tabular datasets and verify the result.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::config::ConfigCommands;
use commands::fetch::FetchArgs;
use commands::verify::VerifyArgs;
use error::CliError;
use runner::RunnerOptions;
use satlayer::config::MAX_CONCURRENCY;

#[derive(Parser)]
#[command(name = "satlayer")]
#[command(version = satlayer::VERSION)]
#[command(about = "Download satellite imagery for tabular datasets", long_about = None)]
struct Cli {
    /// Config file (default: ~/.satlayer/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Also print log output to stdout
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download one image per record for each split
    ///
    /// Images already on disk are skipped, so an interrupted run can simply
    /// be repeated.
    Fetch {
        /// Split name (repeat together with --records)
        #[arg(long = "split", required = true)]
        splits: Vec<String>,

        /// CSV file with id, lat and long columns for the preceding --split
        #[arg(long = "records", required = true)]
        records: Vec<PathBuf>,

        /// Dataset root (images go to <base-dir>/images/<split>)
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// MapBox access token (overrides MAPBOX_TOKEN and config)
        #[arg(long)]
        token: Option<String>,

        /// Records fetched concurrently
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..=MAX_CONCURRENCY as i64))]
        concurrency: Option<u16>,

        /// Also pause after records that were skipped
        #[arg(long)]
        throttle_skipped: bool,
    },

    /// Check that every record has an image on disk
    Verify {
        /// Split name (repeat together with --records)
        #[arg(long = "split", required = true)]
        splits: Vec<String>,

        /// CSV file for the preceding --split
        #[arg(long = "records", required = true)]
        records: Vec<PathBuf>,

        /// Dataset root
        #[arg(long)]
        base_dir: Option<PathBuf>,

        /// Decode every image instead of checking existence only
        #[arg(long)]
        decode: bool,
    },

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let options = RunnerOptions {
        config_path: cli.config,
        debug: cli.debug,
        verbose: cli.verbose,
    };

    let result = match cli.command {
        Commands::Fetch {
            splits,
            records,
            base_dir,
            token,
            concurrency,
            throttle_skipped,
        } => {
            let args = FetchArgs {
                splits,
                records,
                base_dir,
                token,
                concurrency: concurrency.map(usize::from),
                throttle_skipped,
            };
            commands::fetch::run(args, &options).await
        }
        Commands::Verify {
            splits,
            records,
            base_dir,
            decode,
        } => {
            let args = VerifyArgs {
                splits,
                records,
                base_dir,
                decode,
            };
            commands::verify::run(args, &options).await
        }
        Commands::Config(command) => commands::config::run(command, options.config_path),
    };

    if let Err(e) = result {
        e.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_fetch_collects_split_pairs() {
        let cli = Cli::try_parse_from([
            "satlayer",
            "fetch",
            "--split",
            "train",
            "--records",
            "train.csv",
            "--split",
            "test",
            "--records",
            "test.csv",
            "--concurrency",
            "4",
        ])
        .unwrap();

        match cli.command {
            Commands::Fetch {
                splits,
                records,
                concurrency,
                throttle_skipped,
                ..
            } => {
                assert_eq!(splits, vec!["train", "test"]);
                assert_eq!(
                    records,
                    vec![PathBuf::from("train.csv"), PathBuf::from("test.csv")]
                );
                assert_eq!(concurrency, Some(4));
                assert!(!throttle_skipped);
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_concurrency_must_be_positive() {
        let result = Cli::try_parse_from([
            "satlayer",
            "fetch",
            "--split",
            "train",
            "--records",
            "train.csv",
            "--concurrency",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["satlayer", "config", "path", "--config", "/tmp/c.ini"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.ini")));
        assert!(matches!(cli.command, Commands::Config(ConfigCommands::Path)));
    }
}
