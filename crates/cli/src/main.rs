mod config;
mod logging;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use events::{Event, EventEnvelope};
use futures::future::join_all;
use orchestrator::{FetchOutcome, FetchRequest, SyncContext, TaskError};
use section_core::{Entitlements, Module, Section, Severity, Status, TaskKind, TaskMeta};
use serde_json::json;
use tokio::sync::broadcast::error::TryRecvError;

use crate::config::{load_options, Options};

#[derive(Parser)]
#[command(name = "section-sync")]
#[command(about = "Deduplicated background fetches for UI sections", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project config file (defaults to ./section-sync.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// trace, debug, info, warn, error or critical
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a section against a simulated background job
    Fetch {
        #[arg(short, long)]
        section: String,

        /// Module gating the section. Active by default when the config
        /// lists no modules.
        #[arg(short, long)]
        module: String,

        #[arg(long)]
        refresh: bool,

        /// Require a premium account
        #[arg(long)]
        premium: bool,

        /// Make the job fail with this message
        #[arg(long)]
        fail: Option<String>,

        /// Number of concurrent fetch calls
        #[arg(long, default_value_t = 1)]
        repeat: usize,

        #[arg(long, default_value_t = 200)]
        delay_ms: u64,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let options = load_options(cli.config.as_deref())?;
    let level = cli.log_level.clone().or_else(|| options.logging.level.clone());
    if let Some(level) = &level {
        logging::validate_level(level)?;
    }
    logging::init_tracing(level.as_deref());

    match cli.command {
        Commands::Fetch {
            section,
            module,
            refresh,
            premium,
            fail,
            repeat,
            delay_ms,
        } => {
            let args = FetchArgs {
                section,
                module,
                refresh,
                premium,
                fail,
                repeat,
                delay: Duration::from_millis(delay_ms),
            };
            run_fetch(&options, args).await?;
        }
        Commands::Config => show_config(&options)?,
    }

    Ok(())
}

struct FetchArgs {
    section: String,
    module: String,
    refresh: bool,
    premium: bool,
    fail: Option<String>,
    repeat: usize,
    delay: Duration,
}

async fn run_fetch(options: &Options, args: FetchArgs) -> Result<()> {
    let section = Section::parse(&args.section).context("Invalid section")?;
    let module = Module::parse(&args.module).context("Invalid module")?;

    let mut entitlements = options.entitlements()?;
    if options.session.active_modules.is_none() {
        entitlements = Entitlements::new([module.clone()]).with_premium(entitlements.premium);
    }

    let context = SyncContext::new(options.orchestrator_config())?;
    let orchestrator = context.orchestrator(entitlements);
    let mut rx = context.event_bus.subscribe();

    println!(
        "{} {} ({} call{})",
        "Fetching".cyan().bold(),
        section,
        args.repeat,
        if args.repeat == 1 { "" } else { "s" }
    );

    let task_kind = TaskKind::new(format!("query_{section}"));
    let calls = (0..args.repeat).map(|_| {
        let tasks = context.task_manager.clone();
        let kind = task_kind.clone();
        let fail = args.fail.clone();
        let delay = args.delay;
        let section_name = section.to_string();
        let label = section.to_string();

        let request = FetchRequest::new(module.clone(), section.clone(), kind.clone(), move || {
            async move {
                Ok(tasks.spawn(kind, async move {
                    tokio::time::sleep(delay).await;
                    match fail {
                        Some(message) => Err(TaskError::failed(message)),
                        None => Ok(json!({ "section": section_name, "entries": [] })),
                    }
                }))
            }
        })
        .with_meta(TaskMeta::new(format!("Query {section}")))
        .with_premium(args.premium)
        .with_refresh(args.refresh)
        .with_error(format!("Failed to fetch {section}"), move |error: &str| {
            format!("The {label} query failed: {error}")
        });

        orchestrator.fetch_async(request)
    });

    let outcomes = join_all(calls).await;
    tokio::task::yield_now().await;
    print_events(&mut rx);

    println!();
    for (index, outcome) in outcomes.iter().enumerate() {
        println!("  call {:>2}: {}", index + 1, format_outcome(outcome));
    }

    let status = context.status_store.get(&section);
    println!("\n{} {}", "Status:".bold(), format_status(status));
    match context.state.get(section.as_str()) {
        Some(value) => println!(
            "{} {}",
            "Committed:".bold(),
            serde_json::to_string_pretty(&value)?
        ),
        None => println!("{} {}", "Committed:".bold(), "nothing".dimmed()),
    }

    Ok(())
}

fn show_config(options: &Options) -> Result<()> {
    let effective = EffectiveConfig {
        logging: EffectiveLogging {
            level: options
                .logging
                .level
                .clone()
                .unwrap_or_else(|| logging::default_level().to_string()),
        },
        session: options.session.clone(),
        orchestrator: options.orchestrator_config(),
    };

    if let Some(path) = config::user_options_path() {
        println!("# user options: {}", path.display());
    }
    print!("{}", toml::to_string_pretty(&effective)?);
    Ok(())
}

#[derive(serde::Serialize)]
struct EffectiveConfig {
    logging: EffectiveLogging,
    session: config::SessionOptions,
    orchestrator: orchestrator::OrchestratorConfig,
}

#[derive(serde::Serialize)]
struct EffectiveLogging {
    level: String,
}

fn print_events(rx: &mut tokio::sync::broadcast::Receiver<EventEnvelope>) {
    loop {
        match rx.try_recv() {
            Ok(envelope) => print_event(&envelope),
            Err(TryRecvError::Lagged(skipped)) => {
                println!("  {}", format!("... {skipped} events dropped").dimmed());
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

fn print_event(envelope: &EventEnvelope) {
    let time = envelope.timestamp.format("%H:%M:%S%.3f").to_string().dimmed();
    let line = match &envelope.event {
        Event::StatusChanged { section, from, to } => {
            format!("{section}: {} -> {}", format_status(*from), format_status(*to))
        }
        Event::FetchCommitted { section, target } => {
            format!("{section}: {} to '{target}'", "committed".green())
        }
        Event::FetchFailed { section, error } => {
            format!("{section}: {} ({error})", "failed".red())
        }
        Event::TaskSpawned { task_id, task_kind } => {
            format!("task {task_id} spawned ({task_kind})")
        }
        Event::TaskFinished { task_id, success } => {
            let result = if *success { "ok".green() } else { "error".red() };
            format!("task {task_id} finished: {result}")
        }
        Event::Notification(notification) => {
            let severity = match notification.severity {
                Severity::Error => notification.severity.as_str().red().bold(),
                Severity::Warning => notification.severity.as_str().yellow().bold(),
                Severity::Info => notification.severity.as_str().blue().bold(),
            };
            format!("[{severity}] {}: {}", notification.title, notification.message)
        }
        Event::Message(message) => format!("{}: {}", message.title, message.description),
    };
    println!("  {time} {line}");
}

fn format_status(status: Status) -> colored::ColoredString {
    match status {
        Status::None => status.as_str().dimmed(),
        Status::Loading | Status::Refreshing => status.as_str().yellow(),
        Status::PartiallyLoaded => status.as_str().cyan(),
        Status::Loaded => status.as_str().green(),
    }
}

fn format_outcome(outcome: &FetchOutcome) -> String {
    match outcome {
        FetchOutcome::Committed => "committed".green().to_string(),
        FetchOutcome::Skipped(reason) => format!("{} ({reason})", "skipped".yellow()),
        FetchOutcome::Failed { error } => format!("{} ({error})", "failed".red()),
    }
}
