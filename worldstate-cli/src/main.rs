//! Worldstate CLI
//!
//! Refreshes the world state indicator snapshot.

mod config;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use worldstate_core::system_clock;
use worldstate_net::{create_client, HttpClient};
use worldstate_providers::{
    create_gemini_backend, create_openai_backend, GeminiConfig, OpenAIBackendConfig,
    SharedBackend,
};
use worldstate_runtime::{
    probe_sources, ExecutionMode, Orchestrator, OrchestratorConfig, Sources, DEFAULT_OUTPUT_FILE,
};

use crate::config::FileConfig;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

#[derive(Parser)]
#[command(name = "worldstate")]
#[command(author, version, about = "Worldstate: normalized world state indicators", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Options for `update`, which runs when no subcommand is given
    #[command(flatten)]
    update: UpdateArgs,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1", global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute all indicators and overwrite the snapshot file
    Update(UpdateArgs),

    /// Check that every external source answers
    Probe(ProbeArgs),
}

#[derive(Args)]
struct UpdateArgs {
    /// Snapshot file to overwrite
    #[arg(short, long, env = "WORLDSTATE_OUTPUT", default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Gemini API key (or set GEMINI_API_KEY env var)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_key: Option<String>,

    /// OpenAI API key (or set OPENAI_API_KEY env var)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Judge headlines with OpenAI instead of Gemini
    #[arg(long)]
    openai: bool,

    /// LLM model to use
    #[arg(short, long)]
    model: Option<String>,

    /// TOML file overriding source URLs, timeouts and retry policy
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run all providers at once instead of one after another
    #[arg(long)]
    concurrent: bool,

    /// Print the snapshot instead of writing the file
    #[arg(long)]
    stdout: bool,
}

#[derive(Args)]
struct ProbeArgs {
    /// Gemini API key; the LLM endpoint is probed only when set
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_key: Option<String>,

    /// LLM model to probe
    #[arg(short, long)]
    model: Option<String>,

    /// TOML file overriding source URLs, timeouts and retry policy
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Per-source timeout in seconds
    #[arg(long, default_value = "10")]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match cli.command.unwrap_or(Commands::Update(cli.update)) {
        Commands::Update(args) => run_update(args).await,
        Commands::Probe(args) => run_probe(args).await,
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<FileConfig> {
    match path {
        Some(path) => {
            let config = FileConfig::load(path)?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        }
        None => Ok(FileConfig::default()),
    }
}

fn non_empty(key: Option<String>) -> Option<String> {
    key.filter(|k| !k.trim().is_empty())
}

fn gemini_config(key: &str, model: Option<String>, file: &FileConfig) -> GeminiConfig {
    let model = model
        .or_else(|| file.llm.model.clone())
        .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());
    let mut config = GeminiConfig::new(key, &model);
    if let Some(base_url) = &file.llm.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(timeout) = file.llm.timeout_secs {
        config.timeout_secs = timeout;
    }
    config
}

/// Pick the sentiment judge. A missing or rejected credential leaves the
/// sentiment indicator neutral; it never fails the run.
fn select_backend(
    use_openai: bool,
    gemini_key: Option<String>,
    openai_key: Option<String>,
    model: Option<String>,
    file: &FileConfig,
    client: &HttpClient,
) -> Option<SharedBackend> {
    let created = if use_openai {
        let Some(key) = non_empty(openai_key) else {
            println!("⚠️  OPENAI_API_KEY not set; sentiment will be neutral");
            return None;
        };
        let model = model
            .or_else(|| file.llm.model.clone())
            .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());
        let mut config = OpenAIBackendConfig::openai(&key, &model);
        config.base_url = file.llm.base_url.clone();
        println!("📡 Provider: OpenAI | Model: {}", model);
        create_openai_backend(config, client)
    } else {
        let Some(key) = non_empty(gemini_key) else {
            println!("⚠️  GEMINI_API_KEY not set; sentiment will be neutral");
            return None;
        };
        let config = gemini_config(&key, model, file);
        println!("📡 Provider: Gemini | Model: {}", config.model);
        create_gemini_backend(config, client.clone())
    };

    match created {
        Ok(backend) => Some(backend),
        Err(e) => {
            warn!("LLM backend unavailable ({}); sentiment will be neutral", e);
            None
        }
    }
}

async fn run_update(args: UpdateArgs) -> Result<()> {
    println!("--- UPDATE START ---");

    let file = load_config(args.config.as_ref())?;
    let client = create_client(&file.http_config())?;

    let backend = select_backend(
        args.openai,
        args.gemini_key,
        args.api_key,
        args.model,
        &file,
        &client,
    );

    let mode = if args.concurrent {
        ExecutionMode::Concurrent
    } else {
        ExecutionMode::Sequential
    };

    let sources = Sources::http(&client, file.sources, backend);
    let orchestrator = Orchestrator::standard(
        OrchestratorConfig {
            clock: system_clock(),
            mode,
        },
        sources,
    );

    if args.stdout {
        let snapshot = orchestrator.collect().await?;
        println!("{}", snapshot.to_json_pretty()?);
        return Ok(());
    }

    let snapshot = orchestrator
        .run(&args.output)
        .await
        .with_context(|| format!("Failed to update {}", args.output.display()))?;

    println!("--- UPDATE SUCCESS ---");
    println!("📄 Snapshot saved to: {}", args.output.display());
    println!("{}", snapshot.to_json_pretty()?);

    Ok(())
}

async fn run_probe(args: ProbeArgs) -> Result<()> {
    println!("🔌 Probing external sources...\n");

    let file = load_config(args.config.as_ref())?;
    let client = create_client(&file.http_config())?;
    let gemini = non_empty(args.gemini_key).map(|key| gemini_config(&key, args.model, &file));

    let reports = probe_sources(
        &client,
        &file.sources,
        gemini.as_ref(),
        Duration::from_secs(args.timeout),
    )
    .await;

    for report in &reports {
        println!("{}", report);
    }

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    if failed == 0 {
        println!("\n✅ All {} sources reachable", reports.len());
    } else {
        println!(
            "\n⚠️  {} of {} sources unavailable; their indicators will use defaults",
            failed,
            reports.len()
        );
    }

    Ok(())
}
