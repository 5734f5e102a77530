use tokio::sync::broadcast;

use super::state::RunSummary;

/// Run lifecycle events for live status updates
#[derive(Debug, Clone)]
pub enum RunEvent {
    RunStarted {
        run_id: String,
        total: usize,
    },
    RunFinished {
        summary: RunSummary,
    },

    ScenarioStarted {
        id: String,
        name: String,
    },
    ScenarioPassed {
        id: String,
        duration_ms: u64,
    },
    ScenarioFailed {
        id: String,
        duration_ms: u64,
        error: String,
    },
    ScenarioSkipped {
        id: String,
        reason: String,
    },
}

/// Event emitter for broadcasting run events
pub struct EventEmitter {
    sender: broadcast::Sender<RunEvent>,
}

impl EventEmitter {
    pub fn emit(&self, event: RunEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }
}

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration as StdDuration;

/// Console event listener printing real-time run status
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    pub async fn listen(mut receiver: broadcast::Receiver<RunEvent>) {
        use colored::Colorize;
        use std::io::IsTerminal;

        // Hidden draw target when output is piped, to avoid escape codes
        let multi = if std::io::stdout().is_terminal() {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        };

        let mut spinner: Option<ProgressBar> = None;
        let mut scenario_text = String::new();

        while let Ok(event) = receiver.recv().await {
            match event {
                RunEvent::RunStarted { run_id, total } => {
                    multi
                        .println(format!(
                            "\n{} Test run started: {} ({} scenarios)",
                            "▶".green().bold(),
                            run_id.cyan(),
                            total
                        ))
                        .ok();
                }

                RunEvent::RunFinished { summary } => {
                    if let Some(pb) = spinner.take() {
                        pb.finish();
                    }

                    println!("\n{} Test run finished", "■".blue().bold());
                    println!("  Total: {}", summary.total);
                    println!(
                        "  {} passed, {} failed, {} skipped",
                        summary.passed.to_string().green(),
                        summary.failed.to_string().red(),
                        summary.skipped.to_string().yellow()
                    );
                }

                RunEvent::ScenarioStarted { id, name } => {
                    let pb = multi.add(ProgressBar::new_spinner());
                    let style = ProgressStyle::default_spinner()
                        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
                        .template("    {spinner} {msg}")
                        .unwrap();
                    pb.set_style(style);

                    scenario_text = format!("[{}] {}... ", id, name.dimmed());
                    pb.set_message(scenario_text.clone());
                    pb.enable_steady_tick(StdDuration::from_millis(100));
                    spinner = Some(pb);
                }

                RunEvent::ScenarioPassed { duration_ms, .. } => {
                    let done = format!("    {} {}({}ms)", "✓".green(), scenario_text, duration_ms);
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    println!("{}", done);
                }

                RunEvent::ScenarioFailed {
                    duration_ms, error, ..
                } => {
                    let done = format!(
                        "    {} {}({}ms) {}",
                        "✗".red(),
                        scenario_text,
                        duration_ms,
                        error.red()
                    );
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    println!("{}", done);
                }

                RunEvent::ScenarioSkipped { reason, .. } => {
                    let done = format!("    {} {}({})", "○".yellow(), scenario_text, reason.dimmed());
                    if let Some(pb) = spinner.take() {
                        pb.finish_and_clear();
                    }
                    println!("{}", done);
                }
            }
        }
    }
}
