//! llm-relay CLI - 流式对话、批处理与模型对比的命令行工具
//!
//! Usage:
//!   llm-relay chat <prompt> [--system <text>]   Stream a single reply
//!   llm-relay batch <requests.yaml>             Run a batch job, print JSON
//!   llm-relay models                            List built-in models
//!   llm-relay compare                           Compare built-in models

use anyhow::{bail, Context};
use futures::StreamExt;
use llm_relay::batch::{ApiRequest, BatchConfig, BatchProcessor};
use llm_relay::models::{
    compare_models, comparison_rows, model_capabilities, ModelRegistry, DEFAULT_CRITERIA,
};
use llm_relay::provider::{DeepSeekProvider, Provider};
use llm_relay::pipeline::UsageSummary;
use llm_relay::{CancelHandle, Message, ProviderConfig, StreamChunk};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let outcome = match args[1].as_str() {
        "chat" => cmd_chat(&args[2..]).await,
        "batch" => cmd_batch(&args[2..]).await,
        "models" => cmd_models(),
        "compare" => cmd_compare(),
        "version" | "--version" | "-V" => {
            cmd_version();
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"llm-relay - 流式大模型命令行工具

USAGE:
    llm-relay <COMMAND> [OPTIONS]

COMMANDS:
    chat <prompt> [--system <text>]   Stream a reply and print token usage
    batch <requests.yaml>             Run a YAML list of requests as one batch job
    models                            List built-in model descriptors
    compare                           Compare built-in models and their capabilities
    version                           Show version information
    help                              Show this help message

ENVIRONMENT:
    DEEPSEEK_API_KEY                  API key (required for chat and batch)
    DEEPSEEK_BASE_URL                 Endpoint base URL
    DEEPSEEK_MODEL_ID                 Model id (default deepseek-chat)
    LLM_RELAY_HTTP_TIMEOUT_SECS       Request timeout
    LLM_RELAY_PROXY_URL               HTTP(S) proxy
    RUST_LOG                          Log filter (default info)"#
    );
}

fn cmd_version() {
    println!("llm-relay {}", env!("CARGO_PKG_VERSION"));
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

/// Ctrl-C cancels the in-flight work instead of killing the process.
fn cancel_on_ctrl_c() -> CancelHandle {
    let cancel = CancelHandle::new();
    let handle = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });
    cancel
}

async fn cmd_chat(args: &[String]) -> anyhow::Result<()> {
    let Some(prompt) = args.first().filter(|a| !a.starts_with("--")) else {
        bail!("usage: llm-relay chat <prompt> [--system <text>]");
    };
    let system = flag_value(args, "--system").unwrap_or("");

    let config = ProviderConfig::from_env().context("loading provider configuration")?;
    let provider = DeepSeekProvider::new(config)?;
    let cancel = cancel_on_ctrl_c();

    let mut stream =
        provider.create_message_with_cancel(system, &[Message::user(prompt.clone())], cancel);
    let mut summary = UsageSummary::default();
    let mut saw_usage = false;
    while let Some(chunk) = stream.next().await {
        match chunk? {
            StreamChunk::Text { text } => print!("{text}"),
            StreamChunk::Usage(u) => {
                summary.record(&u);
                saw_usage = true;
            }
        }
    }
    println!();
    if saw_usage {
        eprintln!(
            "[model {} | input {} | output {} | cache read {} | cost ${:.6}]",
            provider.model().id,
            summary.input_tokens,
            summary.output_tokens,
            summary.cache_read_tokens,
            summary.total_cost()
        );
    }
    Ok(())
}

async fn cmd_batch(args: &[String]) -> anyhow::Result<()> {
    let Some(path) = args.first() else {
        bail!("usage: llm-relay batch <requests.yaml>");
    };
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let requests: Vec<ApiRequest> =
        serde_yaml::from_str(&raw).with_context(|| format!("parsing {path}"))?;

    let base = ProviderConfig::from_env().context("loading provider configuration")?;
    let registry = ModelRegistry::builtin();
    let mut model_ids: Vec<&str> = requests.iter().map(|r| r.model_id.as_str()).collect();
    model_ids.sort_unstable();
    model_ids.dedup();

    let mut providers: Vec<Arc<dyn Provider>> = Vec::new();
    for id in model_ids {
        if registry.get(id).is_none() {
            tracing::warn!(model = id, "model not in registry, requests will fail");
            continue;
        }
        let provider = DeepSeekProvider::builder(base.clone().with_model(id))
            .registry(registry.clone())
            .build()?;
        providers.push(Arc::new(provider));
    }

    let processor = BatchProcessor::new(providers, BatchConfig::default());
    let mut job = BatchProcessor::create_job(requests);
    let cancel = cancel_on_ctrl_c();
    processor
        .process_batch_observed(&mut job, &cancel, |p| eprintln!("progress: {p:.0}%"))
        .await;

    println!("{}", serde_json::to_string_pretty(&job)?);
    Ok(())
}

fn cmd_models() -> anyhow::Result<()> {
    let registry = ModelRegistry::builtin();
    for m in registry.list() {
        println!(
            "{:<16} {:<10} ctx {:>6}  max out {:>5}  ${:.3}/${:.3} per 1K",
            m.id,
            m.provider,
            m.limits.context_window,
            m.limits.max_output_tokens,
            m.pricing.input_per_k,
            m.pricing.output_per_k
        );
        if !m.description.is_empty() {
            println!("    {}", m.description);
        }
    }
    Ok(())
}

fn cmd_compare() -> anyhow::Result<()> {
    let registry = ModelRegistry::builtin();
    let rows = comparison_rows(registry.list());
    let table = compare_models(&rows, DEFAULT_CRITERIA);
    println!("{}", serde_json::to_string_pretty(&table)?);
    for row in &rows {
        println!("{}: {}", row.id, model_capabilities(row).join(", "));
    }
    Ok(())
}
