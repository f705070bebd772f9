pub mod model;
pub mod parse;
pub mod prompt;

pub use model::{ConstructionRecord, Extracted};

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::llm::{CompletionModel, ModelApiError};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("model call failed: {0}")]
    Model(#[from] ModelApiError),

    #[error("model reply is not valid JSON: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    #[error("model reply is valid JSON but not an array")]
    NotAnArray { raw: String },
}

impl ExtractError {
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Model(err) => err.should_retry(),
            Self::Parse { .. } | Self::NotAnArray { .. } => false,
        }
    }

    /// The model's reply, when the failure happened after one arrived.
    pub fn raw_reply(&self) -> Option<&str> {
        match self {
            Self::Model(_) => None,
            Self::Parse { raw, .. } | Self::NotAnArray { raw } => Some(raw),
        }
    }
}

/// Turns cleaned page text into closure records via a language model.
#[derive(Clone)]
pub struct Extractor {
    model: Arc<dyn CompletionModel>,
    model_name: String,
    region: String,
}

impl Extractor {
    pub fn new(
        model: Arc<dyn CompletionModel>,
        model_name: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            model,
            model_name: model_name.into(),
            region: region.into(),
        }
    }

    #[instrument(skip_all, fields(url = %source_url, chars = text.chars().count()))]
    pub async fn try_extract(
        &self,
        text: &str,
        source_url: &str,
    ) -> Result<Vec<Extracted>, ExtractError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let request = prompt::build_request(&self.model_name, &self.region, text);
        let reply = self.model.complete(request).await?;
        debug!(reply_chars = reply.len(), "model replied");

        parse::parse_reply(&reply, source_url)
    }

    /// Like [`Extractor::try_extract`], but failures are logged and yield no
    /// records.
    pub async fn extract(&self, text: &str, source_url: &str) -> Vec<Extracted> {
        match self.try_extract(text, source_url).await {
            Ok(entries) => entries,
            Err(err) => {
                report(&err, source_url);
                Vec::new()
            }
        }
    }
}

pub(crate) fn report(err: &ExtractError, source_url: &str) {
    match err.raw_reply() {
        Some(raw) => warn!(url = %source_url, error = %err, response = %raw, "could not parse model reply"),
        None => warn!(url = %source_url, error = %err, "extraction failed"),
    }
}
