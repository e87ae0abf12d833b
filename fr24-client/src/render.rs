//! Terminal and JSON output for poll results.

use comfy_table::{Cell, Table};

use fr24_core::{FeedEntry, Snapshot};

/// Entries ordered nearest first; ties broken by identifier.
pub fn sorted_by_distance(snapshot: &Snapshot) -> Vec<&FeedEntry> {
    let mut entries: Vec<&FeedEntry> = snapshot.values().collect();
    entries.sort_by(|a, b| {
        let da = a.distance_to_home().unwrap_or(f64::INFINITY);
        let db = b.distance_to_home().unwrap_or(f64::INFINITY);
        da.total_cmp(&db)
            .then_with(|| a.identifier().cmp(b.identifier()))
    });
    entries
}

/// Aircraft table, nearest first.
pub fn entries_table(snapshot: &Snapshot) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Callsign", "Squawk", "Alt (ft)", "Speed (kts)", "Trk", "VRate", "Lat", "Lon",
        "Dist (km)", "Updated",
    ]);

    for e in sorted_by_distance(snapshot) {
        let (lat, lon) = match e.coordinates() {
            Some(c) => (format!("{:.4}", c.latitude), format!("{:.4}", c.longitude)),
            None => ("-".into(), "-".into()),
        };
        table.add_row(vec![
            Cell::new(e.identifier()),
            Cell::new(e.callsign().unwrap_or("-")),
            Cell::new(e.squawk().unwrap_or("-")),
            Cell::new(e.altitude().map(|a| format!("{a:.0}")).unwrap_or("-".into())),
            Cell::new(e.speed().map(|s| format!("{s:.0}")).unwrap_or("-".into())),
            Cell::new(e.track().map(|t| format!("{t:.0}")).unwrap_or("-".into())),
            Cell::new(
                e.vertical_rate()
                    .map(|v| format!("{v:+.0}"))
                    .unwrap_or("-".into()),
            ),
            Cell::new(lat),
            Cell::new(lon),
            Cell::new(
                e.distance_to_home()
                    .map(|d| format!("{d:.1}"))
                    .unwrap_or("-".into()),
            ),
            Cell::new(
                e.updated_at()
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or("-".into()),
            ),
        ]);
    }

    table
}

/// Pretty JSON array of entries, nearest first.
pub fn entries_json(snapshot: &Snapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&sorted_by_distance(snapshot))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
