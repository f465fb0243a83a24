//! lintkit CLI tool.
//!
//! Usage:
//! ```bash
//! lintkit check [OPTIONS] [PACKAGES]...
//! lintkit list-rules [--plugin <PATH>]
//! lintkit init [--force]
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Pluggable checker runner for Rust crates
#[derive(Parser)]
#[command(name = "lintkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output (prints every selection decision)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the selected checkers over crates
    Check(commands::check::CheckArgs),

    /// List registered checkers and whether they are selected
    ListRules {
        /// Plugin manifest whose checkers are listed too
        #[arg(long)]
        plugin: Option<PathBuf>,
    },

    /// Write a default lintkit.toml
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let source = config_resolver::resolve(Path::new("."), cli.config.as_deref());

    match cli.command {
        Commands::Check(args) => commands::check::run(&args, &source),
        Commands::ListRules { plugin } => commands::list_rules::run(plugin.as_deref(), &source),
        Commands::Init { force } => commands::init::run(Path::new("lintkit.toml"), force),
    }
}
