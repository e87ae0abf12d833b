//! Shared types and the error enum for fr24-core.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::entry::FeedEntry;

/// All errors produced by fr24-core and its transports.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected HTTP status {0}")]
    HttpStatus(u16),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("feed body is not a JSON object")]
    NotAnObject,
    #[error("record {key}: not a JSON array")]
    NotAnArray { key: String },
    #[error("record {key}: expected at least 17 positions, got {len}")]
    ShortRecord { key: String, len: usize },
    #[error("record {key}: position {index} is not {expected}")]
    InvalidField {
        key: String,
        index: usize,
        expected: &'static str,
    },
    #[error("config error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FeedError {
    /// Connection refused, timeout, or non-2xx response.
    pub fn is_transport(&self) -> bool {
        matches!(self, FeedError::Transport(_) | FeedError::HttpStatus(_))
    }

    /// Malformed body or a record that does not fit the positional layout.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            FeedError::Json(_)
                | FeedError::NotAnObject
                | FeedError::NotAnArray { .. }
                | FeedError::ShortRecord { .. }
                | FeedError::InvalidField { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinates {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

// ---------------------------------------------------------------------------
// Decoded record
// ---------------------------------------------------------------------------

/// Named fields decoded from one positional feed array.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FlightRecord {
    /// Mode S transponder code. Never empty.
    pub identifier: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Heading in degrees.
    pub track: Option<f64>,
    /// Feet.
    pub altitude: Option<f64>,
    /// Knots.
    pub speed: Option<f64>,
    pub squawk: Option<String>,
    /// Epoch seconds.
    pub updated: Option<i64>,
    /// Feet per minute.
    pub vertical_rate: Option<f64>,
    pub callsign: Option<String>,
}

/// One poll result, keyed by identifier.
pub type Snapshot = HashMap<String, FeedEntry>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
