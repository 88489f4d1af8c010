//! packsync — keep a directory of loadable artifacts in step with a remote.
//!
//! # Usage
//!
//! ```text
//! packsync [--root <dir>] [--config <file>] update
//! packsync [--root <dir>] [--config <file>] load
//! packsync [--root <dir>] [--config <file>] check [--json]
//! packsync [--root <dir>] [--config <file>] chat [--author <name>]
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{chat::ChatArgs, check::CheckArgs, load::LoadArgs, update::UpdateArgs, Context};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "packsync",
    version,
    about = "Sync, back up and load artifacts from a remote pack server",
    long_about = None,
)]
struct Cli {
    /// Installation root; relative directories in the settings resolve here.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Settings file (default: <root>/packsync.yaml, then ~/.packsync/config.yaml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one full update pass over the artifact directory.
    Update(UpdateArgs),

    /// Sync every artifact, then load it.
    Load(LoadArgs),

    /// Report which artifacts are out of date without changing anything.
    Check(CheckArgs),

    /// Run console lines through the chat word filter.
    Chat(ChatArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let ctx = Context::resolve(cli.root, cli.config.as_deref())?;
    match cli.command {
        Commands::Update(args) => args.run(&ctx),
        Commands::Load(args) => args.run(&ctx),
        Commands::Check(args) => args.run(&ctx),
        Commands::Chat(args) => args.run(&ctx),
    }
}
