//! Decode the positional `flights.json` arrays into named records.
//!
//! The feed is a JSON object keyed by transponder code. Every value is an
//! array with a fixed layout:
//!
//! ```text
//! [0] identifier   [1] latitude   [2] longitude   [3] track    [4] altitude
//! [5] speed        [6] squawk     [7..9] unused   [10] updated (epoch s)
//! [11..14] unused  [15] vertical rate             [16] callsign
//! ```
//!
//! A record that doesn't fit the layout is rejected on its own; the rest of
//! the batch still decodes.

use serde_json::Value;

use crate::types::*;

// ---------------------------------------------------------------------------
// Positional layout
// ---------------------------------------------------------------------------

pub const IDX_IDENTIFIER: usize = 0;
pub const IDX_LATITUDE: usize = 1;
pub const IDX_LONGITUDE: usize = 2;
pub const IDX_TRACK: usize = 3;
pub const IDX_ALTITUDE: usize = 4;
pub const IDX_SPEED: usize = 5;
pub const IDX_SQUAWK: usize = 6;
pub const IDX_UPDATED: usize = 10;
pub const IDX_VERTICAL_RATE: usize = 15;
pub const IDX_CALLSIGN: usize = 16;

/// Shortest array that still carries every named position.
pub const MIN_RECORD_LEN: usize = IDX_CALLSIGN + 1;

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Result of decoding a whole feed body.
#[derive(Debug, Default)]
pub struct DecodedFeed {
    /// Records in object key order.
    pub records: Vec<FlightRecord>,
    /// One error per record that could not be decoded.
    pub rejected: Vec<FeedError>,
}

/// Decode a full `flights.json` body.
///
/// Fails only if the body is not a JSON object. Malformed records end up in
/// `rejected`.
pub fn decode_feed(body: &str) -> Result<DecodedFeed> {
    let parsed: Value = serde_json::from_str(body)?;
    let object = parsed.as_object().ok_or(FeedError::NotAnObject)?;

    let mut decoded = DecodedFeed::default();
    for (key, value) in object {
        match decode_record(key, value) {
            Ok(record) => decoded.records.push(record),
            Err(e) => decoded.rejected.push(e),
        }
    }
    Ok(decoded)
}

/// Decode one raw array. `key` is the object key, used only in errors.
pub fn decode_record(key: &str, value: &Value) -> Result<FlightRecord> {
    let raw = value.as_array().ok_or_else(|| FeedError::NotAnArray {
        key: key.to_string(),
    })?;
    if raw.len() < MIN_RECORD_LEN {
        return Err(FeedError::ShortRecord {
            key: key.to_string(),
            len: raw.len(),
        });
    }

    let identifier = text_at(raw, IDX_IDENTIFIER, key)?.ok_or_else(|| FeedError::InvalidField {
        key: key.to_string(),
        index: IDX_IDENTIFIER,
        expected: "a non-empty string",
    })?;

    Ok(FlightRecord {
        identifier,
        latitude: number_at(raw, IDX_LATITUDE, key)?,
        longitude: number_at(raw, IDX_LONGITUDE, key)?,
        track: number_at(raw, IDX_TRACK, key)?,
        altitude: number_at(raw, IDX_ALTITUDE, key)?,
        speed: number_at(raw, IDX_SPEED, key)?,
        squawk: text_at(raw, IDX_SQUAWK, key)?,
        updated: number_at(raw, IDX_UPDATED, key)?.map(|t| t as i64),
        vertical_rate: number_at(raw, IDX_VERTICAL_RATE, key)?,
        callsign: text_at(raw, IDX_CALLSIGN, key)?,
    })
}

/// Numeric position. `null` and blank strings are absent; numeric strings parse.
/// Non-finite values are rejected.
fn number_at(raw: &[Value], index: usize, key: &str) -> Result<Option<f64>> {
    let invalid = || FeedError::InvalidField {
        key: key.to_string(),
        index,
        expected: "a number",
    };
    match &raw[index] {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_f64().map(Some).ok_or_else(invalid),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(invalid()),
        },
        _ => Err(invalid()),
    }
}

/// Text position, trimmed. Empty strings are absent; numbers are stringified.
fn text_at(raw: &[Value], index: usize, key: &str) -> Result<Option<String>> {
    match &raw[index] {
        Value::Null => Ok(None),
        Value::String(s) => {
            let s = s.trim();
            Ok((!s.is_empty()).then(|| s.to_string()))
        }
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(FeedError::InvalidField {
            key: key.to_string(),
            index,
            expected: "a string",
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
