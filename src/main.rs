use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use iso_console::api::types::{MessageResponse, SimulatorStats};
use iso_console::api::{ApiClient, SimulatorGateway};
use iso_console::dashboard::{self, StatsPoller};
use iso_console::editor::fields::field_label;
use iso_console::editor::{MessageEditor, MessageType};
use iso_console::runner::{self, catalog};
use iso_console::ui::SelectState;
use iso_console::utils::config::Config;
use iso_console::{report, ConsoleError};

#[derive(Parser)]
#[command(name = "iso-console")]
#[command(version = "0.1.0")]
#[command(about = "Operator console for an ISO8583 payment-message simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run test scenarios against the switch (or its mock)
    Run {
        /// Scenario id(s) to run. Can be specified multiple times.
        #[arg(short, long)]
        scenario: Vec<String>,

        /// Run every enabled scenario
        #[arg(long, default_value = "false")]
        all: bool,

        /// Use the built-in simulated executor instead of the backend
        #[arg(long, default_value = "false")]
        simulate: bool,

        /// Write a JSON run report
        #[arg(long, default_value = "false")]
        report: bool,

        /// Output directory for reports
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,
    },

    /// Compose and submit a single message
    Send {
        /// Message type (e.g. FINANCIAL_REQUEST_0200)
        #[arg(short, long)]
        message_type: Option<String>,

        /// Field assignment, N=VALUE. Can be specified multiple times.
        #[arg(short, long)]
        field: Vec<String>,

        /// Generate a mock response instead of sending to the switch
        #[arg(long, default_value = "false")]
        mock: bool,

        /// Skip seeding fields from the server-side template
        #[arg(long, default_value = "false")]
        no_template: bool,

        /// Export the draft and response summary to a JSON file
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Fetch and print a message template
    Template {
        /// Message type (e.g. NETWORK_REQUEST_0800)
        message_type: String,
    },

    /// List the built-in test scenario catalog
    Scenarios,

    /// Show simulator stats and connection status
    Stats {
        /// Keep polling at the configured interval
        #[arg(long, default_value = "false")]
        watch: bool,

        /// Run a connection test first
        #[arg(long, default_value = "false")]
        test: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Commands::Run {
            scenario,
            all,
            simulate,
            report,
            output,
        } => {
            println!("{} Running test scenarios", "▶".green().bold());
            println!("  API: {}", config.base_url.cyan());
            if simulate {
                println!("  Executor: {}", "Simulated".yellow());
            }
            if report {
                println!("  Output: {}", output.display().to_string().cyan());
            }

            let ids = if all {
                None
            } else if scenario.is_empty() {
                anyhow::bail!("no scenarios selected (use --scenario or --all)");
            } else {
                Some(scenario)
            };

            let summary = runner::run_scenarios(&config, ids, simulate, report, &output).await?;
            if summary.failed > 0 {
                std::process::exit(1);
            }
        }

        Commands::Send {
            message_type,
            field,
            mock,
            no_template,
            export,
        } => {
            send_message(&config, message_type, field, mock, no_template, export).await?;
        }

        Commands::Template { message_type } => {
            let message_type = MessageType::parse(&message_type)
                .ok_or_else(|| anyhow::anyhow!("unknown message type: {}", message_type))?;
            let client = ApiClient::new(&config)?;

            println!(
                "{} Fetching template for {}",
                "▶".green().bold(),
                message_type.to_string().cyan()
            );
            let template = client.fetch_template(message_type.as_str()).await?;

            if let Some(ref description) = template.description {
                println!("  {}", description);
            }
            println!();
            for (number, value) in template.fields.iter() {
                let label = field_label(number).unwrap_or("");
                println!("  {:>4}  {:<34} {}", number.cyan(), label.dimmed(), value);
            }
        }

        Commands::Scenarios => {
            println!("{} Test scenario catalog", "▶".green().bold());
            for scenario in catalog::builtin_catalog() {
                let marker = if scenario.enabled {
                    "●".green()
                } else {
                    "○".dimmed()
                };
                println!(
                    "  {} {}  {} [{}]",
                    marker,
                    scenario.id.cyan(),
                    scenario.name,
                    scenario.message_type.dimmed()
                );
                println!("      {}", scenario.description.dimmed());
            }
        }

        Commands::Stats { watch, test } => {
            let gateway: Arc<dyn SimulatorGateway> = Arc::new(ApiClient::new(&config)?);

            if test {
                println!("{} Testing switch connection...", "▶".green().bold());
                match dashboard::test_connection(gateway.as_ref()).await {
                    Ok(stats) => print_stats(&stats),
                    Err(e) => println!("{} {}", "✗".red(), e),
                }
                if !watch {
                    return Ok(());
                }
            }

            if watch {
                watch_stats(gateway, &config).await?;
            } else {
                let stats = gateway.fetch_stats().await?;
                print_stats(&stats);
            }
        }
    }

    Ok(())
}

async fn send_message(
    config: &Config,
    message_type: Option<String>,
    field_args: Vec<String>,
    mock: bool,
    no_template: bool,
    export: Option<PathBuf>,
) -> anyhow::Result<()> {
    let message_type = match message_type {
        Some(value) => MessageType::parse(&value)
            .ok_or_else(|| anyhow::anyhow!("unknown message type: {}", value))?,
        None => pick_message_type()?,
    };

    let gateway: Arc<dyn SimulatorGateway> = Arc::new(ApiClient::new(config)?);
    let mut editor = MessageEditor::new(gateway).with_timeout(config.request_timeout_ms);

    if no_template {
        editor.set_message_type(message_type);
    } else {
        editor.select_message_type(message_type).await;
    }

    for assignment in &field_args {
        let (number, value) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("invalid field assignment (want N=VALUE): {}", assignment))?;
        editor.update_field(number.trim(), value);
    }

    println!(
        "{} Sending {} message{}",
        "▶".green().bold(),
        message_type.label().cyan(),
        if mock { " (mock)".yellow().to_string() } else { String::new() }
    );
    for (number, value) in editor.fields().iter() {
        println!("  {:>4} = {}", number.cyan(), value);
    }

    match editor.submit(mock).await {
        Ok(response) => {
            let response = response.clone();
            print_response(&response);
        }
        Err(ConsoleError::Validation(message)) => anyhow::bail!(message),
        Err(e) => {
            println!("{} {}", "✗".red(), e);
            std::process::exit(1);
        }
    }

    if let Some(path) = export {
        let artifact = editor.export_draft();
        let written = report::write_draft(&artifact, Some(&path))?;
        println!("{} Draft exported to: {}", "✓".green(), written.display());
    }

    Ok(())
}

/// Interactive message-type picker driven by the select state machine
fn pick_message_type() -> anyhow::Result<MessageType> {
    if !io::stdin().is_terminal() {
        anyhow::bail!("no message type selected (use --message-type)");
    }

    let mut select = SelectState::new();
    select.open();

    println!("\n{}", "Select a message type:".bold());
    for (i, message_type) in MessageType::ALL.iter().enumerate() {
        println!("  {}) {}", i + 1, message_type.label());
    }

    let stdin = io::stdin();
    let mut input = String::new();

    while select.is_open() {
        print!("{} ", "message-type>".blue().bold());
        io::stdout().flush()?;

        input.clear();
        if stdin.read_line(&mut input)? == 0 {
            anyhow::bail!("no message type selected");
        }
        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        let picked = line
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| MessageType::ALL.get(i).copied())
            .or_else(|| MessageType::parse(line));

        match picked {
            Some(message_type) => select.select(message_type.as_str()),
            None => println!("{} Unknown message type: {}", "⚠".yellow(), line),
        }
    }

    let value = select
        .value()
        .ok_or_else(|| anyhow::anyhow!("no message type selected"))?;
    MessageType::parse(value).ok_or_else(|| anyhow::anyhow!("unknown message type: {}", value))
}

async fn watch_stats(gateway: Arc<dyn SimulatorGateway>, config: &Config) -> anyhow::Result<()> {
    println!(
        "{} Watching simulator stats (Ctrl+C to exit)",
        "▶".green().bold()
    );

    let poller = StatsPoller::start(gateway, Duration::from_millis(config.poll_interval_ms));
    let mut rx = poller.subscribe();

    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let stats = rx.borrow().clone();
                if let Some(stats) = stats {
                    print_stats(&stats);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                break;
            }
        }
    }

    poller.stop();
    println!("\nStopped watching.");
    Ok(())
}

fn print_stats(stats: &SimulatorStats) {
    let connection = &stats.connection_status;
    let badge = if connection.connected {
        "Connected".green().bold()
    } else {
        "Disconnected".red().bold()
    };

    println!("\n{} Simulator stats", "■".blue().bold());
    println!("  Messages sent: {}", stats.total_messages_sent);
    println!(
        "  {} successful, {} failed ({}% success)",
        stats.successful_responses.to_string().green(),
        stats.failed_responses.to_string().red(),
        stats.success_rate()
    );
    println!("  Avg response time: {:.1}ms", stats.average_response_time);
    println!(
        "  Switch: {} [{}:{}]",
        badge, connection.host, connection.port
    );
    if let Some(ref error) = connection.error {
        println!("  {} {}", "⚠".yellow(), error);
    }
}

fn print_response(response: &MessageResponse) {
    let badge = if response.success {
        "Success".green().bold()
    } else {
        "Failed".red().bold()
    };

    println!("\n{} Response [{}]", "■".blue().bold(), badge);
    if let Some(time) = response.response_time {
        println!("  Response time: {}ms", time);
    }
    if let Some(ref code) = response.response_code {
        println!("  Response code: {}", code.cyan());
    }
    if let (Some(request_mti), Some(response_mti)) =
        (&response.request_mti, &response.response_mti)
    {
        println!("  MTI: {} → {}", request_mti, response_mti);
    }
    if let Some(ref fields) = response.response_fields {
        println!("  Response fields:");
        let mut numbers: Vec<&String> = fields.keys().collect();
        numbers.sort_by_key(|n| n.parse::<u32>().unwrap_or(u32::MAX));
        for number in numbers {
            println!("  {:>4} = {}", number.cyan(), fields[number]);
        }
    }
    if let Some(ref message) = response.error_message {
        println!("  {} {}", "✗".red(), message);
    }
    println!("  {}", response.timestamp.to_rfc3339().dimmed());
}
