// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use atm_sim::{Atm, AtmConfig, AtmError, Console};

/// Single-session ATM simulator over a fixed set of in-memory accounts
#[derive(Parser, Debug)]
#[command(name = "atm-sim")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON config (identifier format and seed accounts)
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSV of seed accounts (holder_name,balance); replaces the config's list
    #[arg(long)]
    accounts: Option<PathBuf>,

    /// Print the session journal as JSON lines on exit
    #[arg(long)]
    journal: bool,

    /// Full-screen terminal UI
    #[arg(long)]
    tui: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("❌ {:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// RUST_LOG wins; otherwise -v picks the level. The TUI owns the screen,
/// so it only gets a subscriber when RUST_LOG asks for one.
fn init_logging(cli: &Cli) {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if cli.tui => return,
        Err(_) => EnvFilter::new(match cli.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<AtmConfig> {
    let config = match &cli.config {
        Some(path) => AtmConfig::from_file(path)?,
        None => AtmConfig::default(),
    };

    match &cli.accounts {
        Some(path) => config.with_seed_csv(path),
        None => Ok(config),
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    let mut atm = match Atm::from_config(&config) {
        Ok(atm) => atm,
        Err(AtmError::EmptyRegistry) => {
            anyhow::bail!("No accounts are registered with the ATM. Exiting.")
        }
        Err(err) => return Err(err).context("Failed to set up accounts"),
    };

    if cli.tui {
        run_ui_mode(&mut atm)?;
    } else {
        let stdin = io::stdin();
        let mut console = Console::new(stdin.lock(), io::stdout());
        console.run(&mut atm)?;
    }

    if cli.journal {
        atm.journal().write_json_lines(&mut io::stdout())?;
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(atm: &mut Atm) -> Result<()> {
    let mut app = ui::App::new(atm);
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_atm: &mut Atm) -> Result<()> {
    anyhow::bail!("TUI mode not available! Rebuild with: cargo build --features tui")
}
