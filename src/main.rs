//! Cancer report worker main executable

pub mod common;
pub mod err;
pub mod input;
pub mod lookup;
pub mod process;
pub mod refgene;
pub mod sheets;
pub mod split;
pub mod workbook;
pub mod xlink;

use clap::{Args, Parser, Subcommand};
use console::{Emoji, Term};

/// CLI parser based on clap.
#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Cancer report workbook worker",
    long_about = "This tool turns clinical cancer genome reports into review workbooks"
)]
struct Cli {
    /// Commonly used arguments
    #[command(flatten)]
    common: common::Args,

    /// The sub command to run
    #[command(subcommand)]
    command: Commands,
}

/// Enum supporting the parsing of top-level commands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Workbook-related commands.
    Workbook(Workbook),
}

/// Parsing of "workbook *" sub commands.
#[derive(Debug, Args)]
#[command(args_conflicts_with_subcommands = true)]
struct Workbook {
    /// The sub command to run
    #[command(subcommand)]
    command: WorkbookCommands,
}

/// Enum supporting the parsing of "workbook *" sub commands.
#[derive(Debug, Subcommand)]
enum WorkbookCommands {
    Build(workbook::Args),
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::INFO,
        })
        .compact()
        .finish();

    // Install collector and go into sub commands.
    let term = Term::stderr();
    tracing::subscriber::with_default(collector, || {
        match &cli.command {
            Commands::Workbook(workbook) => match &workbook.command {
                WorkbookCommands::Build(args) => {
                    workbook::run(&cli.common, args)?;
                }
            },
        }

        Ok::<(), anyhow::Error>(())
    })?;
    term.write_line(&format!("All done. Have a nice day!{}", Emoji(" 😃", "")))?;

    Ok(())
}
