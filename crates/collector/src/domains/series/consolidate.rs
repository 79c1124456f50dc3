use std::fmt;

use time::{Duration, OffsetDateTime};

use super::{SeriesRow, TimeSeries};
use crate::StationReading;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationStatus {
    Online,
    Offline,
}

impl fmt::Display for StationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationStatus::Online => write!(f, "Online"),
            StationStatus::Offline => write!(f, "Offline"),
        }
    }
}

/// What happened to the new reading during consolidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    /// A row with the same timestamp was already stored.
    Duplicate,
    /// The scrape produced nothing usable.
    NoReading,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Consolidation {
    pub series: TimeSeries,
    pub outcome: AppendOutcome,
    pub pruned: usize,
}

impl Consolidation {
    pub fn status(&self) -> StationStatus {
        match self.outcome {
            AppendOutcome::Appended => StationStatus::Online,
            AppendOutcome::Duplicate | AppendOutcome::NoReading => StationStatus::Offline,
        }
    }

    /// Only a newly appended row is worth writing back.
    pub fn needs_persist(&self) -> bool {
        self.outcome == AppendOutcome::Appended
    }
}

/// Merges `reading` into `prior` and trims the result to the retention horizon.
///
/// `now` is captured once by the caller; rows with a timestamp before
/// `now - retention` are removed whether or not anything was appended.
pub fn consolidate(
    mut prior: TimeSeries,
    reading: &StationReading,
    now: OffsetDateTime,
    retention: Duration,
) -> Consolidation {
    let outcome = if !reading.is_usable() {
        AppendOutcome::NoReading
    } else if prior.insert(SeriesRow::from(reading)) {
        AppendOutcome::Appended
    } else {
        AppendOutcome::Duplicate
    };

    let pruned = prior.prune_before(now - retention);

    Consolidation {
        series: prior,
        outcome,
        pruned,
    }
}
