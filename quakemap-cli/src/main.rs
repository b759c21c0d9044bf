//! QuakeMap CLI - Command-line interface
//!
//! Shows recent earthquakes from a QuakeML feed, filtered by magnitude and
//! region, as a terminal map listing.

mod commands;
mod error;
mod runner;
mod view;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use quakemap::provider::TimeWindow;

use commands::common::{FilterArgs, OutputArgs};
use commands::config::ConfigCommands;
use commands::fetch::FetchArgs;
use commands::parse::ParseArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "quakemap")]
#[command(version, about = "Recent earthquakes by magnitude and region", long_about = None)]
struct Cli {
    /// Configuration file (default: platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a feed window and list the matching earthquakes
    Fetch {
        /// Time window: hour, day, week or month
        #[arg(short, long)]
        window: Option<TimeWindow>,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Decode a saved QuakeML file
    Parse {
        /// Path of the QuakeML document
        file: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        e.exit();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Fetch {
            window,
            filter,
            output,
        } => {
            let runner = CliRunner::new(config_path, cli.verbose)?;
            commands::fetch::run(
                &runner,
                FetchArgs {
                    window,
                    filter,
                    output,
                },
            )
            .await
        }
        Commands::Parse {
            file,
            filter,
            output,
        } => {
            let runner = CliRunner::new(config_path, cli.verbose)?;
            commands::parse::run(
                &runner,
                ParseArgs {
                    file,
                    filter,
                    output,
                },
            )
        }
        Commands::Config { command } => commands::config::run(command, config_path),
    }
}
