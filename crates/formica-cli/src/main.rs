//! Formica CLI - drive a persistent ant colony from the command line.

mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "formica")]
#[command(author, version, about = "Formica - A persistent virtual ant colony", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new Formica project and found a colony
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Advance the colony simulation
    Run {
        /// Number of ticks to run (default: [run] ticks in formica.toml)
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Stop early once this many milliseconds have passed
        #[arg(short, long)]
        budget_ms: Option<u64>,
    },

    /// Show colony statistics
    Stats {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Apply a directive document (JSON) to the colony
    Directive {
        /// Directive file
        file: String,
    },

    /// Manage sessions
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Discard the current colony and found a new one
    Reset,
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Save current colony under a name
    Save {
        /// Session name
        name: String,
    },

    /// Make a saved session the current colony
    Load {
        /// Session name
        name: String,
    },

    /// List saved sessions
    List,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Run { ticks, budget_ms } => commands::run::run(ticks, budget_ms, cli.verbose),
        Commands::Stats { json } => commands::stats::run(json),
        Commands::Directive { file } => commands::directive::run(&file),
        Commands::Session { command } => match command {
            SessionCommands::Save { name } => commands::session::save(&name),
            SessionCommands::Load { name } => commands::session::load(&name),
            SessionCommands::List => commands::session::list(),
        },
        Commands::Reset => commands::reset::run(),
    }
}
