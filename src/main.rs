use anyhow::Result;
use clap::Parser;

use kwin_bridge::cli::Cli;

fn main() -> Result<()> {
    kwin_bridge::app::run(Cli::parse())
}
