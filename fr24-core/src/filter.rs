//! Keep only airborne flights with a known position near home.
//!
//! Checks run in order: position present, altitude above zero, then the
//! optional radius (inclusive).

use crate::entry::FeedEntry;
use crate::types::Coordinates;

// ---------------------------------------------------------------------------
// Haversine
// ---------------------------------------------------------------------------

/// Mean earth radius.
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance in kilometres.
pub fn haversine_km(a: &Coordinates, b: &Coordinates) -> f64 {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (dlon / 2.0).sin().powi(2);
    // Rounding can push h just past 1 for near-antipodal points.
    let h = h.clamp(0.0, 1.0);
    EARTH_RADIUS_KM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Stateless entry filter around a home point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryFilter {
    pub home: Coordinates,
    pub radius_km: Option<f64>,
}

impl EntryFilter {
    pub fn new(home: Coordinates, radius_km: Option<f64>) -> Self {
        EntryFilter { home, radius_km }
    }

    /// Whether `entry` passes every check.
    pub fn retains(&self, entry: &FeedEntry) -> bool {
        let pos = match entry.coordinates() {
            Some(p) => p,
            None => return false,
        };
        // Absent altitude counts as on the ground.
        if !entry.altitude().is_some_and(|a| a > 0.0) {
            return false;
        }
        match self.radius_km {
            Some(radius) => haversine_km(&self.home, &pos) <= radius,
            None => true,
        }
    }

    /// Retained entries, in input order.
    pub fn apply(&self, entries: Vec<FeedEntry>) -> Vec<FeedEntry> {
        entries.into_iter().filter(|e| self.retains(e)).collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
