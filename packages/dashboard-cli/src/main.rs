// Terminal dashboard for legislative proposals

mod config;
mod relay;
mod render;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use proposals::backends::OpenAIBackend;
use proposals::fetchers::{HttpFetcher, RelayFetcher};
use proposals::{
    filter_by_category, summarize, Category, CategorySummary, ClassifiedProposal, PageFetcher,
    Pipeline, PipelineConfig,
};
use serde::Serialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "dashboard", version, about = "Legislative proposals dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch, classify and print the current proposals
    Run(RunArgs),
    /// Serve the fetch relay at /api/proxy
    Relay {
        /// Port to listen on (default: $PORT or 3000)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Print JSON instead of the terminal dashboard
    #[arg(long)]
    json: bool,

    /// Only list proposals in this category (e.g. "Iluminação Pública")
    #[arg(long, value_parser = parse_category)]
    category: Option<Category>,

    /// Fetch through a relay instead of hitting the portal directly
    #[arg(long)]
    relay_url: Option<Url>,

    /// Chat model used for classification
    #[arg(long)]
    model: Option<String>,

    /// Maximum classification calls in flight
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// Sustained classification request rate
    #[arg(long)]
    requests_per_second: Option<NonZeroU32>,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    summary: Vec<CategorySummary>,
    proposals: Vec<&'a ClassifiedProposal>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `--json` output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,proposals=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Command::Run(args) => run(args, config).await,
        Command::Relay { port } => serve_relay(port.unwrap_or(config.port)).await,
    }
}

async fn run(args: RunArgs, config: Config) -> Result<()> {
    let mut pipeline_config = PipelineConfig::default();
    if let Some(max) = args.max_concurrency.or(config.max_concurrency) {
        pipeline_config = pipeline_config.with_max_concurrency(max);
    }
    if let Some(rps) = args.requests_per_second.or(config.requests_per_second) {
        pipeline_config = pipeline_config.with_requests_per_second(rps);
    }

    let fetcher: Box<dyn PageFetcher> = match args.relay_url.or(config.relay_url) {
        Some(relay_url) => {
            tracing::info!(relay = %relay_url, "Fetching through relay");
            Box::new(RelayFetcher::new(relay_url))
        }
        None => Box::new(HttpFetcher::new().context("Failed to build HTTP client")?),
    };

    let api_key = config
        .openai_api_key
        .context("OPENAI_API_KEY must be set")?;
    let mut backend = OpenAIBackend::new(api_key);
    if let Some(model) = args.model.or(config.openai_model) {
        backend = backend.with_model(model);
    }
    if let Some(base_url) = config.openai_base_url {
        backend = backend.with_base_url(base_url);
    }

    let pipeline = Pipeline::throttled(fetcher, backend, pipeline_config);
    let proposals = pipeline.run().await?;

    let summary = summarize(&proposals);
    let listed = filter_by_category(&proposals, args.category);

    if args.json {
        let output = JsonOutput {
            summary,
            proposals: listed,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&output).context("Failed to serialize output")?
        );
    } else {
        render::print_banner(proposals.len());
        render::print_summary(&summary);
        render::print_proposals(&listed, args.category);
    }

    Ok(())
}

async fn serve_relay(port: u16) -> Result<()> {
    let fetcher: relay::SharedFetcher =
        Arc::new(HttpFetcher::new().context("Failed to build HTTP client")?);
    let app = relay::router(fetcher);

    let addr = format!("0.0.0.0:{}", port);
    tracing::info!("Fetch relay listening on http://{}/api/proxy", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Fetch relay shutting down");
        })
        .await
        .context("Server error")?;

    Ok(())
}

fn parse_category(label: &str) -> Result<Category> {
    match Category::from_label(label.trim()) {
        Some(category) => Ok(category),
        None => {
            let labels: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
            bail!("unknown category, expected one of: {}", labels.join(", "))
        }
    }
}
