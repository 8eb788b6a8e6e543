//! Command entry points.

mod init;

use anyhow::Result;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;

use crate::bridge::Bridge;
use crate::cli::{Cli, Commands};
use crate::config::{BridgeConfig, load_config};
use crate::dispatch::{DbusTransport, Dispatcher, PrintTransport};
use crate::host::scenario::Scenario;
use crate::host::workspace_signals;
use crate::signals::{Emit, WINDOW_SIGNALS};

pub use init::init_logging;

/// Run the command given on the command line.
pub fn run(cli: Cli) -> Result<()> {
    init::init_logging(cli.verbose);
    info!(version = env!("CARGO_PKG_VERSION"), "Starting kwin-bridge");

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Replay { scenario, dry_run } => replay(&scenario, dry_run, &config),
        Commands::Catalog => {
            write_catalog(&mut io::stdout().lock())?;
            Ok(())
        }
    }
}

fn replay(path: &Path, dry_run: bool, config: &BridgeConfig) -> Result<()> {
    let scenario = Scenario::load(path)?;

    if dry_run {
        let dispatcher = Dispatcher::new(
            config.endpoint.clone(),
            Box::new(PrintTransport::stdout()),
        );
        run_scenario(&scenario, dispatcher, config);
        return Ok(());
    }

    let runtime = init::build_runtime()?;
    runtime.block_on(async {
        let (transport, worker) = DbusTransport::connect(&config.endpoint).await?;
        let dispatcher = Dispatcher::new(config.endpoint.clone(), Box::new(transport));
        run_scenario(&scenario, dispatcher, config);
        // The bridge and its queue sender are gone; wait for the queue to drain.
        worker.finish().await;
        Ok::<(), anyhow::Error>(())
    })
}

/// Start a bridge over the scenario's workspace, replay its events and stop.
///
/// Returns the number of events applied.
pub fn run_scenario(scenario: &Scenario, dispatcher: Dispatcher, config: &BridgeConfig) -> usize {
    let workspace = scenario.build_workspace();
    let mut bridge = Bridge::start(workspace.clone(), dispatcher, config);
    let applied = scenario.run_events(&workspace);
    bridge.shutdown();
    info!(applied, total = scenario.events.len(), "Scenario replayed");
    applied
}

/// Print the signal catalog.
pub fn write_catalog(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Window signals:")?;
    for entry in WINDOW_SIGNALS {
        let emits: Vec<String> = entry.emits.iter().map(describe_emit).collect();
        writeln!(out, "  {:<30} {}", entry.signal, emits.join(", "))?;
    }
    writeln!(out)?;
    writeln!(out, "Workspace signals:")?;
    for signal in workspace_signals::ALL {
        writeln!(out, "  {}", signal)?;
    }
    Ok(())
}

fn describe_emit(emit: &Emit) -> String {
    match emit {
        Emit::Property { name, .. } => format!("NotifyWindowPropertyChanged({})", name),
        Emit::Geometry => "NotifyGeometryChanged".to_string(),
    }
}
