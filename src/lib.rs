pub mod cli;
pub mod config;
pub mod extractor;
pub mod fetcher;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod schedule;
