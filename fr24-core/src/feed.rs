//! One poll of the flights endpoint: fetch, decode, filter, index.
//!
//! The network round trip sits behind [`Transport`] so this module stays
//! free of I/O. Every failure is logged here and handed back as `Err` with
//! no partial result.

use std::fmt;

use log::{debug, warn};

use crate::codec::decode_feed;
use crate::entry::FeedEntry;
use crate::filter::EntryFilter;
use crate::types::*;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8754;

/// Build the `flights.json` URL for a host and port.
pub fn feed_url(host: &str, port: u16) -> String {
    format!("http://{host}:{port}/flights.json")
}

/// Fetches the raw feed body.
///
/// Implementations return `Transport` for connection failures and timeouts
/// and `HttpStatus` for non-2xx responses.
pub trait Transport {
    fn get(&self, url: &str) -> Result<String>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str) -> Result<String> {
        (**self).get(url)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn get(&self, url: &str) -> Result<String> {
        (**self).get(url)
    }
}

/// A configured flights endpoint.
pub struct Feed<T: Transport> {
    transport: T,
    url: String,
    filter: EntryFilter,
}

impl<T: Transport> Feed<T> {
    pub fn new(transport: T, url: String, filter: EntryFilter) -> Self {
        Feed {
            transport,
            url,
            filter,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn home(&self) -> Coordinates {
        self.filter.home
    }

    pub fn filter(&self) -> &EntryFilter {
        &self.filter
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// One round trip. Entries are filtered and keyed by identifier.
    pub fn fetch(&self) -> Result<Snapshot> {
        let body = self.transport.get(&self.url).inspect_err(|e| {
            warn!("fetch {} failed: {e}", self.url);
        })?;

        let decoded = decode_feed(&body).inspect_err(|e| {
            warn!("unable to decode feed from {}: {e}", self.url);
        })?;

        for reject in &decoded.rejected {
            warn!("skipping record: {reject}");
        }

        let total = decoded.records.len();
        let entries: Vec<FeedEntry> = decoded
            .records
            .into_iter()
            .map(|rec| FeedEntry::new(self.filter.home, rec))
            .collect();
        let kept = self.filter.apply(entries);

        debug!(
            "{}: {total} decoded, {} kept, {} rejected",
            self.url,
            kept.len(),
            decoded.rejected.len()
        );

        let mut snapshot = Snapshot::with_capacity(kept.len());
        for entry in kept {
            snapshot.insert(entry.identifier().to_string(), entry);
        }
        Ok(snapshot)
    }
}

impl<T: Transport> fmt::Display for Feed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Feed(url={})", self.url)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use serde_json::{json, Value};

    use super::*;

    /// Replays canned responses, one per `get`.
    pub(crate) struct ScriptedTransport {
        responses: RefCell<VecDeque<Result<String>>>,
        pub(crate) calls: RefCell<Vec<String>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new(responses: Vec<Result<String>>) -> Self {
            ScriptedTransport {
                responses: RefCell::new(responses.into()),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn get(&self, url: &str) -> Result<String> {
            self.calls.borrow_mut().push(url.to_string());
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(FeedError::Transport("no scripted response".into())))
        }
    }

    pub(crate) fn raw(id: &str, lat: f64, lon: f64, alt: i32, callsign: &str) -> Value {
        json!([
            id, lat, lon, 90, alt, 250, "1200", 0, 0, 0, 1700000000, 0, 0, 0, 0, 0, callsign
        ])
    }

    pub(crate) fn home() -> Coordinates {
        Coordinates::new(51.5, -0.1)
    }

    fn feed(responses: Vec<Result<String>>, radius_km: Option<f64>) -> Feed<ScriptedTransport> {
        Feed::new(
            ScriptedTransport::new(responses),
            feed_url(DEFAULT_HOST, DEFAULT_PORT),
            EntryFilter::new(home(), radius_km),
        )
    }

    #[test]
    fn test_feed_url() {
        assert_eq!(
            feed_url(DEFAULT_HOST, DEFAULT_PORT),
            "http://localhost:8754/flights.json"
        );
        assert_eq!(feed_url("10.0.0.2", 80), "http://10.0.0.2:80/flights.json");
    }

    #[test]
    fn test_fetch_indexes_by_identifier() {
        let body = json!({
            "AAA111": raw("AAA111", 51.6, -0.1, 3000, "BAW1"),
            "BBB222": raw("BBB222", 51.4, -0.2, 8000, ""),
        })
        .to_string();
        let feed = feed(vec![Ok(body)], None);

        let snapshot = feed.fetch().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["AAA111"].callsign(), Some("BAW1"));
        assert!(snapshot["BBB222"].callsign().is_none());
        assert_eq!(snapshot["AAA111"].home(), home());
        let calls = feed.transport().calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], "http://localhost:8754/flights.json");
    }

    #[test]
    fn test_fetch_applies_filter() {
        let body = json!({
            "NEAR01": raw("NEAR01", 51.6, -0.1, 3000, ""),
            "FAR001": raw("FAR001", 53.5, -2.2, 3000, ""),
            "GROUND": raw("GROUND", 51.5, -0.1, 0, ""),
        })
        .to_string();
        let snapshot = feed(vec![Ok(body)], Some(50.0)).fetch().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains_key("NEAR01"));
    }

    #[test]
    fn test_fetch_keeps_fractional_altitude() {
        let body = json!({
            "LOW001": ["LOW001", 51.5, -0.1, 0, 0.4, 0, "", 0, 0, 0, 0, 0, 0, 0, 0, 0, ""],
        })
        .to_string();
        let snapshot = feed(vec![Ok(body)], Some(50.0)).fetch().unwrap();
        assert_eq!(snapshot["LOW001"].altitude(), Some(0.4));
    }

    #[test]
    fn test_fetch_skips_short_records() {
        let body = json!({
            "AAA111": raw("AAA111", 51.6, -0.1, 3000, "BAW1"),
            "SHORT1": ["SHORT1", 51.6, -0.1],
        })
        .to_string();
        let snapshot = feed(vec![Ok(body)], None).fetch().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains_key("AAA111"));
    }

    #[test]
    fn test_fetch_keys_by_record_identifier() {
        let body = json!({ "key-ignored": raw("AAA111", 51.6, -0.1, 3000, "") }).to_string();
        let snapshot = feed(vec![Ok(body)], None).fetch().unwrap();
        assert!(snapshot.contains_key("AAA111"));
    }

    #[test]
    fn test_fetch_duplicate_identifier_last_wins() {
        let body = json!({
            "k1": raw("AAA111", 51.6, -0.1, 3000, "FIRST"),
            "k2": raw("AAA111", 51.6, -0.1, 3000, "SECOND"),
        })
        .to_string();
        let snapshot = feed(vec![Ok(body)], None).fetch().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot["AAA111"].callsign(), Some("SECOND"));
    }

    #[test]
    fn test_fetch_transport_error() {
        let err = feed(vec![Err(FeedError::HttpStatus(500))], None)
            .fetch()
            .unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_fetch_invalid_json() {
        let err = feed(vec![Ok("<html>".into())], None).fetch().unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_display() {
        let f = feed(vec![], None);
        assert_eq!(f.to_string(), "Feed(url=http://localhost:8754/flights.json)");
    }
}
