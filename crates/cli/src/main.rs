// Cargolink CLI - dispatch/sales spreadsheet reconciliation (headless)

mod config;
mod exit_codes;
mod merge;
mod saved;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{EXIT_ERROR, EXIT_IO, EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "cargolink")]
#[command(about = "Merge dispatch and sales spreadsheet exports into one record set")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge dispatch files with a sales file and report data-quality issues
    #[command(after_help = "\
Examples:
  cargolink merge --dispatch jan.xlsx --dispatch feb.xlsx --sales sales.xlsx --json
  cargolink merge --dispatch jan.xlsx --sales sales.xlsx --output result.json
  cargolink merge --dispatch jan.xlsx --sales sales.xlsx --export merged.xlsx
  cargolink merge --dispatch jan.xlsx --sales sales.xlsx --save 'Q1 close'")]
    Merge {
        /// Dispatch spreadsheet (repeatable)
        #[arg(long, required = true)]
        dispatch: Vec<PathBuf>,

        /// Sales spreadsheet (exactly one)
        #[arg(long)]
        sales: PathBuf,

        /// Print the merge response as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Write the merge response as JSON to a file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Export the merged records to an xlsx file
        #[arg(long)]
        export: Option<PathBuf>,

        /// Save the result under this name in the local store
        #[arg(long)]
        save: Option<String>,

        /// Description for --save
        #[arg(long, requires = "save")]
        description: Option<String>,

        /// Store database path (defaults to the local data directory)
        #[arg(long)]
        db: Option<PathBuf>,

        /// TOML file overriding the ingestion limits
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Inspect previously saved merge results
    #[command(subcommand)]
    Saved(saved::SavedCommands),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Merge {
            dispatch,
            sales,
            json,
            output,
            export,
            save,
            description,
            db,
            config,
        } => merge::cmd_merge(merge::MergeArgs {
            dispatch,
            sales,
            json,
            output,
            export,
            save,
            description,
            db,
            config,
        }),
        Commands::Saved(cmd) => saved::cmd_saved(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(err.code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn error(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
