//! Command-line interface of the `spellcard` binary.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, CONFIG_ENV};
use crate::error::Error;
use crate::extract::{extract_record, ExtractOptions};
use crate::loader::Loader;
use crate::record::RecordKind;

/// Extracts a spell or magic item from an Archives of Nethys page into a JSON
/// record for the TeX card templates.
#[derive(Parser, Debug)]
#[command(name = "spellcard", version)]
pub struct Cli {
    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// YAML config file
    #[arg(long, global = true, env = CONFIG_ENV, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract a spell
    Spell(ExtractArgs),
    /// Extract a magic item
    Item(ExtractArgs),
}

impl Command {
    pub fn kind(&self) -> RecordKind {
        match self {
            Command::Spell(_) => RecordKind::Spell,
            Command::Item(_) => RecordKind::Item,
        }
    }

    pub fn args(&self) -> &ExtractArgs {
        match self {
            Command::Spell(args) | Command::Item(args) => args,
        }
    }
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("input").required(true).args(["url", "file"])))]
pub struct ExtractArgs {
    /// Page to fetch
    #[arg(short, long)]
    pub url: Option<String>,

    /// Saved page to read instead of fetching
    #[arg(short, long, value_name = "PAGE")]
    pub file: Option<PathBuf>,

    /// Where to write the record; stdout if omitted
    #[arg(short, long, value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Abbreviate values to save card space
    #[arg(long)]
    pub compact: bool,
}

/// Logs go to stderr so that a record printed to stdout stays clean.
/// `RUST_LOG` takes precedence over the flags.
pub fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,spellcard_extractor={}", level)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// Runs one extraction. Nothing is written unless the record is complete.
pub fn run(cli: &Cli) -> Result<(), Error> {
    let config = Config::load(cli.config.as_deref())?;
    let kind = cli.command.kind();
    let args = cli.command.args();

    let html = match (&args.url, &args.file) {
        (Some(url), _) => Loader::new(&config)?.fetch(url)?,
        (None, Some(file)) => fs::read_to_string(file)?,
        (None, None) => {
            return Err(Error::InvalidInput(
                "either --url or --file is required".into(),
            ))
        }
    };

    let options = ExtractOptions {
        compact: args.compact || config.compact,
    };
    let extraction = extract_record(&html, kind, &options)?;
    let json = extraction.record.to_json()?;

    match &args.output {
        Some(path) => {
            fs::write(path, json)?;
            tracing::info!(path = %path.display(), "wrote {} record", kind);
        }
        None => io::stdout().write_all(json.as_bytes())?,
    }
    Ok(())
}
