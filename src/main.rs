use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use clap::{CommandFactory, Parser, error::ErrorKind};
use closure_watch::{
    cli::{Cli, UrlSource},
    config::Config,
    extractor::Extractor,
    fetcher::Fetcher,
    llm::OpenAiClient,
    output::{self, OutputMode},
    pipeline::{Pipeline, PipelineConfig, RetryPolicy},
    schedule,
};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let source = match cli.url_source() {
        Ok(source) => source,
        Err(e) => Cli::command().error(ErrorKind::ValueValidation, e).exit(),
    };

    let mut config = Config::from_env()?;
    if let Some(output) = cli.output.clone() {
        config.output = output;
    }
    if let Some(concurrency) = cli.concurrency {
        config.concurrency = concurrency as usize;
    }
    if let Some(retries) = cli.retries {
        config.max_retries = retries;
    }

    if let UrlSource::Auto {
        defaulted: true, ..
    } = source
    {
        eprintln!("No arguments provided. Using automatic weekly URL generation (4 weeks).");
        eprintln!("{}", Cli::command().render_usage());
    }

    let urls = source.urls(&config.base_url, schedule::today());
    match &source {
        UrlSource::Manual(_) => {}
        UrlSource::Auto { weeks, .. } | UrlSource::Dated { weeks, .. } => {
            info!(weeks, "generated weekly URLs");
            for url in &urls {
                info!("  - {}", url);
            }
        }
    }

    let fetcher = Fetcher::new(config.fetch_timeout)?;
    let model = OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.openai_timeout,
    )?;
    let extractor = Extractor::new(
        Arc::new(model),
        config.openai_model.clone(),
        config.region.clone(),
    );
    let pipeline = Pipeline::new(
        fetcher,
        extractor,
        PipelineConfig {
            concurrency: config.concurrency,
            retry: RetryPolicy {
                max_retries: config.max_retries,
                base_backoff_ms: config.base_backoff_ms,
            },
        },
    );

    let shutdown_token = pipeline.shutdown_token();
    tokio::spawn(async move {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        warn!("Received shutdown signal, finishing in-flight pages...");
        shutdown_token.cancel();
    });

    let report = pipeline.run(urls).await;
    info!(
        "Total construction projects found: {}",
        report.record_count()
    );

    let mode = if cli.timestamped {
        OutputMode::Timestamped
    } else {
        OutputMode::Overwrite
    };
    let path = output::resolve_path(&config.output, mode, Utc::now());
    let json = output::write_aggregate(&path, &report.entries).await?;
    println!("{}", json);

    Ok(())
}
