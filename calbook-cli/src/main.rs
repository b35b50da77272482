mod command;
mod commands;
mod render;
mod session;

use std::path::PathBuf;

use anyhow::{Result, bail};
use calbook_core::CalbookConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::session::Session;

#[derive(Parser)]
#[command(name = "calbook")]
#[command(about = "Keep calendars of events and recurring series, and check them for conflicts")]
struct Cli {
    /// Log what calbook is doing (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Load configuration from this file instead of ~/.config/calbook/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Type commands at a prompt
    Interactive,
    /// Run the commands in a file. The file must end with `exit`
    Headless { file: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config)?;
    let mut session = Session::new(config)?;

    match cli.command {
        Commands::Interactive => commands::interactive::run(&mut session),
        Commands::Headless { file } => commands::headless::run(&mut session, &file),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<CalbookConfig> {
    match path {
        Some(path) => {
            if !path.exists() {
                bail!("Config file {} does not exist", path.display());
            }
            Ok(CalbookConfig::load_from(&path)?)
        }
        None => Ok(CalbookConfig::load()?),
    }
}
