//! fr24-core: Decode, filter, and aggregate a local Flightradar24 flights feed.
//!
//! No network I/O lives here: the HTTP round trip is behind the
//! [`Transport`] trait, implemented by `fr24-client`.

pub mod aggregator;
pub mod codec;
pub mod config;
pub mod entry;
pub mod feed;
pub mod filter;
pub mod types;

// Re-export commonly used types at crate root
pub use aggregator::{Aggregator, CallsignPolicy, DEFAULT_HISTORY_DEPTH};
pub use codec::{decode_feed, decode_record, DecodedFeed};
pub use config::FeedConfig;
pub use entry::{FeedEntry, FieldOverride};
pub use feed::{feed_url, Feed, Transport};
pub use filter::{haversine_km, EntryFilter};
pub use types::*;
