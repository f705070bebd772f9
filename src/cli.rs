//! Command-line surface.
//!
//! Three mutually exclusive ways to pick URLs: `--auto [WEEKS]`,
//! `--date YYYY-MM-DD [WEEKS]`, or explicit URLs. With none of them the run
//! falls back to `--auto 4`.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use thiserror::Error;

use crate::schedule;

pub const DEFAULT_WEEKS: u32 = 4;

#[derive(Debug, Parser)]
#[command(
    name = "closure-watch",
    version,
    about = "Extract street closure records from weekly municipal pages"
)]
pub struct Cli {
    /// Generate weekly URLs starting today
    #[arg(
        long,
        value_name = "WEEKS",
        num_args = 0..=1,
        default_missing_value = "4",
        conflicts_with_all = ["date", "urls"]
    )]
    pub auto: Option<u32>,

    /// Generate weekly URLs starting at a date: YYYY-MM-DD [WEEKS]
    #[arg(long, value_name = "DATE", num_args = 1..=2, conflicts_with = "urls")]
    pub date: Option<Vec<String>>,

    /// Process these URLs verbatim
    #[arg(value_name = "URL")]
    pub urls: Vec<String>,

    /// Output file for the aggregated JSON
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Write a timestamped file instead of replacing the output file
    #[arg(long)]
    pub timestamped: bool,

    /// Pages processed at once
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub concurrency: Option<u32>,

    /// Extra attempts for retriable fetch or model failures
    #[arg(long)]
    pub retries: Option<u32>,
}

/// How the URL list for a run is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlSource {
    /// Weekly URLs from today. `defaulted` is set when no form was given.
    Auto { weeks: u32, defaulted: bool },
    Dated { anchor: NaiveDate, weeks: u32 },
    Manual(Vec<String>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("invalid date '{0}': expected YYYY-MM-DD (e.g. 2025-10-31)")]
    InvalidDate(String),

    #[error("invalid number of weeks '{0}'")]
    InvalidWeeks(String),
}

impl Cli {
    pub fn url_source(&self) -> Result<UrlSource, ArgumentError> {
        if let Some(weeks) = self.auto {
            return Ok(UrlSource::Auto {
                weeks,
                defaulted: false,
            });
        }

        if let Some(values) = &self.date {
            let raw_date = values.first().map(String::as_str).unwrap_or_default();
            let anchor = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
                .map_err(|_| ArgumentError::InvalidDate(raw_date.to_string()))?;
            let weeks = match values.get(1) {
                Some(raw) => raw
                    .parse()
                    .map_err(|_| ArgumentError::InvalidWeeks(raw.clone()))?,
                None => DEFAULT_WEEKS,
            };
            return Ok(UrlSource::Dated { anchor, weeks });
        }

        if !self.urls.is_empty() {
            return Ok(UrlSource::Manual(self.urls.clone()));
        }

        Ok(UrlSource::Auto {
            weeks: DEFAULT_WEEKS,
            defaulted: true,
        })
    }
}

impl UrlSource {
    pub fn urls(&self, base_url: &str, today: NaiveDate) -> Vec<String> {
        match self {
            Self::Auto { weeks, .. } => schedule::weekly_urls(base_url, today, *weeks),
            Self::Dated { anchor, weeks } => schedule::weekly_urls(base_url, *anchor, *weeks),
            Self::Manual(urls) => urls.clone(),
        }
    }
}
