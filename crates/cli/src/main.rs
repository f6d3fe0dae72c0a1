// rollsync CLI - weekly membership/CRM reconciliation runs

mod exit_codes;
mod run;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::EXIT_SUCCESS;

#[derive(Parser)]
#[command(name = "rollsync")]
#[command(about = "Reconcile a membership ledger against CRM records")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run reconciliation from a TOML config file
    #[command(after_help = "\
Examples:
  rollsync run weekly.sync.toml
  rollsync run weekly.sync.toml --json
  rollsync run weekly.sync.toml --output report.json")]
    Run {
        /// Path to the .sync.toml config file
        config: PathBuf,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file (overrides [output] json)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Suppress stderr notes (summary, wrote-file messages)
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Validate a sync config without running
    #[command(after_help = "\
Examples:
  rollsync validate weekly.sync.toml")]
    Validate {
        /// Path to the .sync.toml config file
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            json,
            output,
            quiet,
        } => run::cmd_run(config, json, output, quiet),
        Commands::Validate { config } => run::cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}
