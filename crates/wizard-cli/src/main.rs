//! `wizard-inspect`: classify failures, dump preserved progress, validate
//! configuration and run a fail-then-recover simulation from the shell.

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use wizard_progress::{FileStore, KeyValueStore, MemoryStore, ProgressStore};
use wizard_recovery::{RecoveryController, ResilienceConfig};
use wizard_reporter::{ErrorInfo, ErrorReporter, RecoveryStrategy};
use wizard_taxonomy::{classify, recovery_plan, Failure, WorkflowId};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Command::new("wizard-inspect")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Inspect the Deal Wizard resilience layer")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("classify")
                .about("Categorize a failure and list its suggestions")
                .arg(
                    Arg::new("name")
                        .long("name")
                        .default_value("Error")
                        .help("Failure name, e.g. NetworkError"),
                )
                .arg(
                    Arg::new("message")
                        .long("message")
                        .required(true)
                        .help("Failure message"),
                ),
        )
        .subcommand(
            Command::new("progress")
                .about("Dump the progress snapshot stored for a workflow")
                .arg(
                    Arg::new("dir")
                        .long("dir")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory of a file-backed progress store"),
                )
                .arg(
                    Arg::new("workflow")
                        .long("workflow")
                        .required(true)
                        .help("Workflow (deal) id"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Validate a resilience configuration file")
                .arg(
                    Arg::new("path")
                        .long("path")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file"),
                ),
        )
        .subcommand(
            Command::new("simulate")
                .about("Fail a step repeatedly, then attempt a recovery")
                .arg(
                    Arg::new("failures")
                        .long("failures")
                        .default_value("1")
                        .value_parser(value_parser!(u32))
                        .help("Failures captured before the recovery attempt"),
                )
                .arg(
                    Arg::new("name")
                        .long("name")
                        .default_value("NetworkError")
                        .help("Failure name"),
                )
                .arg(
                    Arg::new("message")
                        .long("message")
                        .default_value("fetch failed")
                        .help("Failure message"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file"),
                )
                .arg(
                    Arg::new("dir")
                        .long("dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Persist progress to this directory instead of memory"),
                )
                .arg(
                    Arg::new("delay-ms")
                        .long("delay-ms")
                        .value_parser(value_parser!(u64))
                        .help("Override the recovery delay"),
                ),
        );

    match cli.get_matches().subcommand() {
        Some(("classify", args)) => run_classify(args),
        Some(("progress", args)) => run_progress(args),
        Some(("config", args)) => run_config(args),
        Some(("simulate", args)) => run_simulate(args).await,
        _ => Ok(()),
    }
}

fn arg<'a>(args: &'a ArgMatches, id: &str) -> Result<&'a String> {
    args.get_one::<String>(id)
        .with_context(|| format!("missing --{id}"))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_classify(args: &ArgMatches) -> Result<()> {
    let failure = Failure::new(arg(args, "name")?.as_str(), arg(args, "message")?.as_str());
    let categorization = classify(&failure);
    print_json(&json!({
        "failure": failure,
        "categorization": categorization,
        "suggestions": recovery_plan(Some(&categorization), false),
    }))
}

fn run_progress(args: &ArgMatches) -> Result<()> {
    let dir = args
        .get_one::<PathBuf>("dir")
        .context("missing --dir")?;
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }
    let workflow_id = WorkflowId::new(arg(args, "workflow")?.as_str());

    let store = ProgressStore::new(Arc::new(FileStore::new(dir)));
    match store.load(&workflow_id) {
        Some(snapshot) => print_json(&serde_json::to_value(snapshot)?),
        None => bail!("no usable progress stored for workflow {workflow_id}"),
    }
}

fn run_config(args: &ArgMatches) -> Result<()> {
    let path = args
        .get_one::<PathBuf>("path")
        .context("missing --path")?;
    let config = ResilienceConfig::load(path)
        .with_context(|| format!("invalid configuration {}", path.display()))?;
    print_json(&json!({
        "recovery": config.recovery,
        "reporter": config.reporter,
    }))
}

async fn run_simulate(args: &ArgMatches) -> Result<()> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => ResilienceConfig::load(path)
            .with_context(|| format!("invalid configuration {}", path.display()))?,
        None => ResilienceConfig::default(),
    };
    if let Some(delay) = args.get_one::<u64>("delay-ms") {
        config.recovery = config.recovery.with_recovery_delay(Duration::from_millis(*delay));
    }

    let store: Arc<dyn KeyValueStore> = match args.get_one::<PathBuf>("dir") {
        Some(dir) => Arc::new(FileStore::new(dir)),
        None => Arc::new(MemoryStore::new()),
    };
    let reporter = Arc::new(ErrorReporter::new(config.reporter.clone()));
    let controller = RecoveryController::builder("simulated-deal", 2, "Payor Info")
        .config(config.recovery.clone())
        .reporter(reporter.clone())
        .store(store)
        .build();

    let failures = args.get_one::<u32>("failures").copied().unwrap_or(1);
    let failure = Failure::new(arg(args, "name")?.as_str(), arg(args, "message")?.as_str());
    for _ in 0..failures {
        let info = ErrorInfo::new().with_entry("source", "wizard-inspect");
        controller.handle_error(failure.clone(), info);
    }
    controller.preserve_progress(Default::default(), Default::default());

    let suggestions = controller.get_recovery_suggestions();
    let recovered = controller.attempt_recovery(RecoveryStrategy::Manual).await;

    print_json(&json!({
        "recovered": recovered,
        "errorState": controller.error_state(),
        "recoveryState": controller.recovery_state(),
        "suggestions": suggestions,
        "analytics": reporter.get_error_analytics(),
    }))
}
