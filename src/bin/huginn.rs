//! huginn: one-shot generation from the command line.
//!
//! Builds an orchestrator from the config file, runs one request and prints
//! the result as JSON.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use huginn::{Config, GenerationRequest, HuginnError, KindCatalog, Orchestrator, ParamValue};

/// Generate structured content through the configured provider chain
#[derive(Parser)]
#[command(name = "huginn")]
#[command(version)]
#[command(about = "Generation orchestrator CLI")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "HUGINN_CONFIG")]
    config: Option<PathBuf>,

    /// Content kind to generate.
    #[arg(short, long)]
    kind: Option<String>,

    /// Request parameter as key=value; comma-separated values become a list.
    #[arg(short, long = "param", value_parser = parse_param)]
    params: Vec<(String, ParamValue)>,

    /// Prompt text (or omit to read --prompt-file or stdin)
    #[arg(long, conflicts_with = "prompt_file")]
    prompt: Option<String>,

    /// File holding the prompt text.
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    /// List the available content kinds and exit.
    #[arg(long)]
    list_kinds: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("huginn=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let catalog = KindCatalog::builtin();

    if args.list_kinds {
        for name in catalog.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let kind_name = args
        .kind
        .as_deref()
        .ok_or_else(|| HuginnError::Configuration("--kind is required".to_string()))?;
    let kind = catalog.get(kind_name).ok_or_else(|| {
        HuginnError::Configuration(format!(
            "unknown kind {kind_name:?} (available: {})",
            catalog.names().join(", ")
        ))
    })?;

    let prompt = read_prompt(args.prompt, args.prompt_file.as_deref())?;
    let config = Config::load(args.config.as_deref())?;
    let orchestrator = Orchestrator::from_config(&config)?;

    let request = args
        .params
        .into_iter()
        .fold(GenerationRequest::new(kind, prompt), |request, (key, value)| {
            request.param(key, value)
        });

    let generated = orchestrator.generate(&request).await;
    println!("{}", serde_json::to_string_pretty(&generated)?);
    Ok(())
}

fn parse_param(raw: &str) -> Result<(String, ParamValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in {raw:?}"));
    }
    let value = if value.contains(',') {
        ParamValue::from(value.split(',').map(str::trim).collect::<Vec<_>>())
    } else {
        ParamValue::from(value)
    };
    Ok((key.to_string(), value))
}

fn read_prompt(
    inline: Option<String>,
    file: Option<&std::path::Path>,
) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(prompt) = inline {
        return Ok(prompt);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read prompt file {path:?}: {e}").into());
    }
    if io::stdin().is_terminal() {
        return Err("no prompt given; use --prompt, --prompt-file or pipe it on stdin".into());
    }
    let mut prompt = String::new();
    io::stdin().read_to_string(&mut prompt)?;
    Ok(prompt)
}
