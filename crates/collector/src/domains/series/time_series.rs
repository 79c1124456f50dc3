use time::OffsetDateTime;

use crate::StationReading;

/// One persisted observation, flattened for storage.
///
/// Wind speed is kept in km/h regardless of the unit the page reported.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRow {
    pub timestamp: OffsetDateTime,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub rain: Option<f64>,
    pub wind_speed: Option<f64>,
    pub dew_point: Option<f64>,
}

impl From<&StationReading> for SeriesRow {
    fn from(reading: &StationReading) -> Self {
        SeriesRow {
            timestamp: reading.timestamp,
            temperature: reading.temperature_c,
            humidity: reading.humidity_pct,
            rain: reading.rain_mm,
            wind_speed: reading.wind_speed.map(|w| w.as_kmh()),
            dew_point: reading.dew_point_c,
        }
    }
}

/// Rolling window of observations for one station.
///
/// Rows are kept in ascending timestamp order with at most one row per
/// instant. Every mutation goes through methods that preserve both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    rows: Vec<SeriesRow>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a series from rows in any order. Later duplicates of a
    /// timestamp are dropped; the number dropped is returned alongside.
    pub fn from_rows(mut rows: Vec<SeriesRow>) -> (Self, usize) {
        let before = rows.len();
        rows.sort_by_key(|row| row.timestamp);
        rows.dedup_by_key(|row| row.timestamp);
        let dropped = before - rows.len();
        (TimeSeries { rows }, dropped)
    }

    pub fn rows(&self) -> &[SeriesRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn latest(&self) -> Option<&SeriesRow> {
        self.rows.last()
    }

    pub fn contains(&self, timestamp: OffsetDateTime) -> bool {
        self.position(timestamp).is_ok()
    }

    /// Inserts in order. Returns `false`, leaving the series untouched, if a
    /// row with the same timestamp already exists.
    pub fn insert(&mut self, row: SeriesRow) -> bool {
        match self.position(row.timestamp) {
            Ok(_) => false,
            Err(index) => {
                self.rows.insert(index, row);
                true
            }
        }
    }

    /// Drops rows strictly older than `cutoff` and returns how many went.
    pub fn prune_before(&mut self, cutoff: OffsetDateTime) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| row.timestamp >= cutoff);
        before - self.rows.len()
    }

    fn position(&self, timestamp: OffsetDateTime) -> Result<usize, usize> {
        self.rows.binary_search_by_key(&timestamp, |row| row.timestamp)
    }
}
