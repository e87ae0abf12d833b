//! A single decoded flight, bound to the home point it is measured from.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::filter::haversine_km;
use crate::types::{Coordinates, FlightRecord};

/// Replacement value for one named field of a [`FeedEntry`].
///
/// The identifier has no variant: it is the snapshot key and must not change.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOverride {
    Latitude(Option<f64>),
    Longitude(Option<f64>),
    Track(Option<f64>),
    Altitude(Option<f64>),
    Speed(Option<f64>),
    Squawk(Option<String>),
    Updated(Option<i64>),
    VerticalRate(Option<f64>),
    Callsign(Option<String>),
}

/// One flight from one poll cycle.
///
/// Distance and timestamp are derived from the record on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    home: Coordinates,
    record: FlightRecord,
}

impl FeedEntry {
    pub fn new(home: Coordinates, record: FlightRecord) -> Self {
        FeedEntry { home, record }
    }

    pub fn record(&self) -> &FlightRecord {
        &self.record
    }

    pub fn home(&self) -> Coordinates {
        self.home
    }

    pub fn identifier(&self) -> &str {
        &self.record.identifier
    }

    /// Position, if the feed reported both latitude and longitude.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.record.latitude, self.record.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
            _ => None,
        }
    }

    /// Great-circle distance in km to the home point.
    pub fn distance_to_home(&self) -> Option<f64> {
        self.distance_to(&self.home)
    }

    /// Great-circle distance in km to `reference`.
    pub fn distance_to(&self, reference: &Coordinates) -> Option<f64> {
        self.coordinates().map(|pos| haversine_km(reference, &pos))
    }

    /// `updated` as a UTC timestamp. Absent or zero yields `None`.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.record
            .updated
            .filter(|&t| t != 0)
            .and_then(|t| DateTime::from_timestamp(t, 0))
    }

    pub fn altitude(&self) -> Option<f64> {
        self.record.altitude
    }

    pub fn speed(&self) -> Option<f64> {
        self.record.speed
    }

    pub fn track(&self) -> Option<f64> {
        self.record.track
    }

    pub fn squawk(&self) -> Option<&str> {
        self.record.squawk.as_deref()
    }

    pub fn vertical_rate(&self) -> Option<f64> {
        self.record.vertical_rate
    }

    /// Callsign, never an empty string.
    pub fn callsign(&self) -> Option<&str> {
        self.record.callsign.as_deref().filter(|c| !c.is_empty())
    }

    pub fn has_callsign(&self) -> bool {
        self.callsign().is_some()
    }

    /// Replace one field in place.
    pub fn override_field(&mut self, value: FieldOverride) {
        let rec = &mut self.record;
        match value {
            FieldOverride::Latitude(v) => rec.latitude = v,
            FieldOverride::Longitude(v) => rec.longitude = v,
            FieldOverride::Track(v) => rec.track = v,
            FieldOverride::Altitude(v) => rec.altitude = v,
            FieldOverride::Speed(v) => rec.speed = v,
            FieldOverride::Squawk(v) => rec.squawk = v,
            FieldOverride::Updated(v) => rec.updated = v,
            FieldOverride::VerticalRate(v) => rec.vertical_rate = v,
            FieldOverride::Callsign(v) => rec.callsign = v.filter(|c| !c.is_empty()),
        }
    }
}

impl fmt::Display for FeedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeedEntry(id={})", self.record.identifier)
    }
}

#[derive(Serialize)]
struct EntryJson<'a> {
    #[serde(flatten)]
    record: &'a FlightRecord,
    distance_km: Option<f64>,
    updated_at: Option<DateTime<Utc>>,
}

impl Serialize for FeedEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EntryJson {
            record: &self.record,
            distance_km: self.distance_to_home(),
            updated_at: self.updated_at(),
        }
        .serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
