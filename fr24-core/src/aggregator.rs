//! Cross-poll aggregation: bounded history and callsign repair.
//!
//! The feed often drops the callsign of a flight for a few polls. The
//! aggregator remembers the last known callsign per identifier and patches
//! entries that arrive without one.
//!
//! State only changes inside `update()`, and a failed fetch leaves it as it
//! was. Callers that share an aggregator across threads wrap it in a mutex.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use log::debug;

use crate::config::FeedConfig;
use crate::entry::FieldOverride;
use crate::feed::{Feed, Transport};
use crate::filter::EntryFilter;
use crate::types::*;

/// Poll results kept in the history stack.
pub const DEFAULT_HISTORY_DEPTH: usize = 10;

/// Which observation wins when a flight reports different callsigns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallsignPolicy {
    /// Keep the first non-empty callsign seen for an identifier.
    #[default]
    FirstSeen,
    /// Replace with every new non-empty callsign.
    MostRecent,
}

impl fmt::Display for CallsignPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallsignPolicy::FirstSeen => write!(f, "first_seen"),
            CallsignPolicy::MostRecent => write!(f, "most_recent"),
        }
    }
}

impl FromStr for CallsignPolicy {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "first_seen" | "first" => Ok(CallsignPolicy::FirstSeen),
            "most_recent" | "latest" => Ok(CallsignPolicy::MostRecent),
            other => Err(FeedError::Config(format!("unknown callsign policy: {other}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregator
// ---------------------------------------------------------------------------

/// Wraps a [`Feed`] and repairs missing callsigns from earlier polls.
pub struct Aggregator<T: Transport> {
    feed: Feed<T>,
    history: VecDeque<Snapshot>,
    history_depth: usize,
    callsigns: HashMap<String, String>,
    policy: CallsignPolicy,
}

impl<T: Transport> Aggregator<T> {
    pub fn new(feed: Feed<T>, history_depth: usize) -> Self {
        Aggregator {
            feed,
            history: VecDeque::new(),
            history_depth,
            callsigns: HashMap::new(),
            policy: CallsignPolicy::default(),
        }
    }

    /// Build the feed and aggregator described by `config`.
    pub fn from_config(transport: T, config: &FeedConfig) -> Self {
        let filter = EntryFilter::new(config.home, config.radius_km);
        let feed = Feed::new(transport, config.url(), filter);
        Aggregator::new(feed, config.history_depth).with_policy(config.callsign_policy)
    }

    pub fn with_policy(mut self, policy: CallsignPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Poll once and return the repaired snapshot.
    pub fn update(&mut self) -> Result<Snapshot> {
        let mut snapshot = self.feed.fetch()?;

        // Record before repairing so the memory is current for this batch.
        for entry in snapshot.values() {
            let Some(callsign) = entry.callsign() else {
                continue;
            };
            match self.policy {
                CallsignPolicy::FirstSeen => {
                    self.callsigns
                        .entry(entry.identifier().to_string())
                        .or_insert_with(|| callsign.to_string());
                }
                CallsignPolicy::MostRecent => {
                    self.callsigns
                        .insert(entry.identifier().to_string(), callsign.to_string());
                }
            }
        }

        let mut repaired = 0usize;
        for (id, entry) in snapshot.iter_mut() {
            if entry.has_callsign() {
                continue;
            }
            if let Some(known) = self.callsigns.get(id) {
                entry.override_field(FieldOverride::Callsign(Some(known.clone())));
                repaired += 1;
            }
        }

        self.history.push_front(snapshot.clone());
        self.history.truncate(self.history_depth);

        debug!(
            "{} entries, {repaired} callsigns repaired, {} remembered",
            snapshot.len(),
            self.callsigns.len()
        );

        Ok(snapshot)
    }

    /// Recent poll results, most recent first.
    pub fn history(&self) -> &VecDeque<Snapshot> {
        &self.history
    }

    pub fn history_depth(&self) -> usize {
        self.history_depth
    }

    pub fn callsigns(&self) -> &HashMap<String, String> {
        &self.callsigns
    }

    pub fn remembered_callsign(&self, identifier: &str) -> Option<&str> {
        self.callsigns.get(identifier).map(String::as_str)
    }

    pub fn policy(&self) -> CallsignPolicy {
        self.policy
    }

    pub fn feed(&self) -> &Feed<T> {
        &self.feed
    }
}

impl<T: Transport> fmt::Display for Aggregator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Aggregator(feed={})", self.feed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
