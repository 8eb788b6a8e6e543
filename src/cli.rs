use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kwin-bridge")]
#[command(about = "Forwards KWin window, desktop and cursor state to a D-Bus endpoint")]
pub struct Cli {
    /// Config file to use instead of ~/.config/kwin-bridge/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a recorded host scenario through the bridge
    Replay {
        /// Scenario file (JSON)
        scenario: PathBuf,

        /// Print calls as JSON lines instead of sending them over D-Bus
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the window and workspace signal catalog
    Catalog,
}
