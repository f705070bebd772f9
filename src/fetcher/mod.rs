pub mod client;
pub mod decode;
pub mod errors;
pub mod text;
pub mod types;

#[cfg(test)]
mod tests;

pub use client::Fetcher;
pub use errors::FetchError;
pub use text::html_to_text;
pub use types::{Charset, PageResponse};
