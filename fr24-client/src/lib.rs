//! fr24-client: HTTP transport and CLI plumbing for a local Flightradar24 feed.
//!
//! `connect()` turns a [`FeedConfig`] into a ready-to-poll aggregator.

pub mod args;
pub mod http;
pub mod render;

pub use http::HttpTransport;

use fr24_core::{Aggregator, FeedConfig, Result};

/// Validate `config` and build an aggregator polling over HTTP.
pub fn connect(config: &FeedConfig) -> Result<Aggregator<HttpTransport>> {
    config.validate()?;
    let transport = HttpTransport::new(config.timeout)?;
    Ok(Aggregator::from_config(transport, config))
}
