pub mod catalog;
pub mod events;
pub mod executor;
pub mod orchestrator;
pub mod state;

pub use events::*;
pub use orchestrator::{StopHandle, TestOrchestrator};
pub use state::*;

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::ApiClient;
use crate::report;
use crate::utils::config::Config;
use executor::{RemoteExecutor, ScenarioExecutor, SimulatedExecutor};

/// Run a scenario selection end to end: console listener, Ctrl+C wired to
/// the stop handle, optional JSON report. `scenario_ids: None` selects
/// every enabled scenario.
pub async fn run_scenarios(
    config: &Config,
    scenario_ids: Option<Vec<String>>,
    simulate: bool,
    report_enabled: bool,
    output: &Path,
) -> Result<RunSummary> {
    let mut orchestrator = TestOrchestrator::new(catalog::builtin_catalog());

    match scenario_ids {
        Some(ids) => {
            for id in &ids {
                if !orchestrator.toggle_selection(id) {
                    anyhow::bail!("unknown or disabled scenario: {}", id);
                }
            }
        }
        None => orchestrator.select_all(),
    }

    let executor: Box<dyn ScenarioExecutor> = if simulate {
        Box::new(SimulatedExecutor)
    } else {
        Box::new(RemoteExecutor::new(Arc::new(ApiClient::new(config)?)))
    };

    tokio::spawn(events::ConsoleEventListener::listen(orchestrator.subscribe()));

    let stop = orchestrator.stop_handle();
    ctrlc::set_handler(move || {
        println!(
            "\n{} Stopping after the current scenario...",
            "⏹".yellow()
        );
        stop.stop();
    })?;

    let summary = orchestrator.run_selected(executor.as_ref()).await?;

    if report_enabled {
        let run_id = orchestrator
            .run_id()
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        report::write_run_report(output, &run_id, orchestrator.results(), &summary)?;
    }

    Ok(summary)
}
