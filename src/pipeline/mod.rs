pub mod backoff;

pub use backoff::{RetryPolicy, calculate_backoff_delay};

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, info, info_span, warn};

use crate::extractor::{self, ExtractError, Extracted, Extractor};
use crate::fetcher::{FetchError, Fetcher};

/// Runner configuration
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub concurrency: usize,
    pub retry: RetryPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            retry: RetryPolicy::default(),
        }
    }
}

/// Outcome of processing one URL.
#[derive(Debug)]
pub struct UrlOutcome {
    pub url: String,
    pub fetched: bool,
    pub entries: Vec<Extracted>,
}

/// Aggregate of one run, in input URL order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub entries: Vec<Extracted>,
    pub urls: usize,
    pub fetched: usize,
    pub fetch_failures: usize,
    /// URLs whose page could not be fetched, in input order.
    pub failed_urls: Vec<String>,
    /// URLs never started because the run was cancelled.
    pub skipped: usize,
}

impl RunReport {
    pub fn record_count(&self) -> usize {
        self.entries.iter().filter(|e| e.as_record().is_some()).count()
    }
}

/// Fetches and extracts a list of closures pages with a bounded worker pool.
#[derive(Clone)]
pub struct Pipeline {
    fetcher: Fetcher,
    extractor: Extractor,
    config: PipelineConfig,
    shutdown_token: CancellationToken,
}

impl Pipeline {
    pub fn new(fetcher: Fetcher, extractor: Extractor, config: PipelineConfig) -> Self {
        Self {
            fetcher,
            extractor,
            config: PipelineConfig {
                concurrency: config.concurrency.max(1),
                ..config
            },
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Token that stops the run from starting further URLs when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Process every URL. Per-URL failures are logged and contribute zero
    /// entries; this never fails.
    pub async fn run(&self, urls: Vec<String>) -> RunReport {
        let total = urls.len();
        info!(
            urls = total,
            concurrency = self.config.concurrency,
            max_retries = self.config.retry.max_retries,
            "starting extraction run"
        );

        let (tx, mut rx) = mpsc::channel::<(usize, UrlOutcome)>(self.config.concurrency * 2);
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));

        let dispatcher = {
            let pipeline = self.clone();
            let semaphore = semaphore.clone();
            tokio::spawn(async move {
                for (index, url) in urls.into_iter().enumerate() {
                    let permit = tokio::select! {
                        biased;
                        _ = pipeline.shutdown_token.cancelled() => {
                            warn!("run cancelled, not starting remaining URLs");
                            break;
                        }
                        permit = semaphore.clone().acquire_owned() => match permit {
                            Ok(permit) => permit,
                            Err(_) => break,
                        },
                    };

                    let pipeline = pipeline.clone();
                    let tx = tx.clone();
                    tokio::spawn(
                        async move {
                            let _permit = permit; // Hold permit until the URL completes
                            let outcome = pipeline.process_url(url).await;
                            let _ = tx.send((index, outcome)).await;
                        }
                        .instrument(info_span!("url", index = index + 1, of = total)),
                    );
                }
                // Dropping our sender lets the receiver close once tasks finish
            })
        };

        let mut outcomes: Vec<(usize, UrlOutcome)> = Vec::with_capacity(total);
        while let Some(item) = rx.recv().await {
            outcomes.push(item);
        }
        if let Err(e) = dispatcher.await {
            warn!(error = %e, "url dispatcher panicked");
        }

        outcomes.sort_by_key(|(index, _)| *index);

        let mut report = RunReport {
            urls: total,
            skipped: total - outcomes.len(),
            ..Default::default()
        };
        for (_, outcome) in outcomes {
            if outcome.fetched {
                report.fetched += 1;
            } else {
                report.fetch_failures += 1;
                report.failed_urls.push(outcome.url);
            }
            report.entries.extend(outcome.entries);
        }

        info!(
            urls = report.urls,
            fetched = report.fetched,
            fetch_failures = report.fetch_failures,
            skipped = report.skipped,
            records = report.record_count(),
            "extraction run finished"
        );
        if !report.failed_urls.is_empty() {
            warn!(urls = ?report.failed_urls, "pages that could not be fetched");
        }
        report
    }

    /// Fetch, clean and extract one URL.
    pub async fn process_url(&self, url: String) -> UrlOutcome {
        info!(url = %url, "fetching page");

        let retry = self.config.retry;
        let text = match retry
            .run("fetch", || self.fetcher.fetch_text(&url), FetchError::should_retry)
            .await
        {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => {
                info!(url = %url, "page had no text content, skipping extraction");
                return UrlOutcome {
                    url,
                    fetched: true,
                    entries: Vec::new(),
                };
            }
            Err(err) => {
                warn!(url = %url, error = %err, "failed to fetch page");
                return UrlOutcome {
                    url,
                    fetched: false,
                    entries: Vec::new(),
                };
            }
        };

        info!(url = %url, chars = text.chars().count(), "analyzing page text");

        let entries = match retry
            .run(
                "extraction",
                || self.extractor.try_extract(&text, &url),
                ExtractError::should_retry,
            )
            .await
        {
            Ok(entries) => entries,
            Err(err) => {
                extractor::report(&err, &url);
                Vec::new()
            }
        };

        info!(url = %url, found = entries.len(), "found construction project(s)");

        UrlOutcome {
            url,
            fetched: true,
            entries,
        }
    }
}
