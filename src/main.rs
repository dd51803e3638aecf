use clap::Parser;
use docushield::{AppError, PipelineOrchestrator, Settings};
use std::path::PathBuf;
use tracing::{error, Level};

#[derive(Parser, Debug)]
#[command(
    name = "docushield",
    version,
    about = "Run DocuShield virtual-environment evaluation"
)]
struct Cli {
    #[arg(long, default_value_t = 20, help = "Number of frames to evaluate")]
    frames: usize,
    #[arg(
        long,
        help = "Path to JSONL audit log; overrides the configured audit.path"
    )]
    audit_path: Option<PathBuf>,
    #[arg(long, help = "Optional settings file (TOML, YAML or JSON)")]
    config: Option<PathBuf>,
    #[arg(long, help = "Enable debug logging")]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Configured settings, with `--audit-path` applied only when given.
fn load_settings(cli: &Cli) -> Result<Settings, AppError> {
    let settings = Settings::load(cli.config.as_deref())?;
    Ok(match &cli.audit_path {
        Some(path) => settings.with_audit_path(path.clone()),
        None => settings,
    })
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let settings = load_settings(&cli)?;
    let mut orchestrator = PipelineOrchestrator::builder(settings).build()?;
    let report = orchestrator.run_configured_sweep(Some(cli.frames)).await?;
    println!("{}", serde_json::to_string_pretty(&report.summary)?);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
