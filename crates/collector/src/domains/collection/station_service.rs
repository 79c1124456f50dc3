use std::path::PathBuf;
use std::sync::Arc;

use slog::{debug, error, info, o, warn, Logger};
use time::{OffsetDateTime, UtcOffset};

use crate::{
    consolidate, AppendOutcome, FetchError, FieldExtractor, PageFetcher, SeriesStore, Station,
    StationReading, StationStatus, StorageError, TimeSeries,
};

/// Outcome of one station for one run.
#[derive(Debug, Clone)]
pub struct StationRun {
    pub station: Station,
    pub reading: StationReading,
    pub series: TimeSeries,
    pub status: StationStatus,
}

#[derive(Debug, Clone)]
pub struct CollectionSettings {
    pub url_template: String,
    pub data_dir: PathBuf,
    pub retention: time::Duration,
}

/// Wall-clock time in `offset`, without sub-second precision.
pub fn observation_time(offset: UtcOffset) -> OffsetDateTime {
    truncate_to_seconds(OffsetDateTime::now_utc().to_offset(offset))
}

pub fn truncate_to_seconds(timestamp: OffsetDateTime) -> OffsetDateTime {
    timestamp
        .replace_nanosecond(0)
        .unwrap_or(timestamp)
}

pub struct StationService {
    pub logger: Logger,
    pub fetcher: Arc<dyn PageFetcher>,
    extractor: FieldExtractor,
    settings: CollectionSettings,
}

impl StationService {
    pub fn new(
        logger: Logger,
        fetcher: Arc<dyn PageFetcher>,
        extractor: FieldExtractor,
        settings: CollectionSettings,
    ) -> Self {
        StationService {
            logger,
            fetcher,
            extractor,
            settings,
        }
    }

    /// Scrape `station`, fold the reading into its stored series and persist it.
    ///
    /// Only a failure to write the series is an error. Fetch failures produce an
    /// unavailable reading and an unreadable series file starts over empty.
    pub async fn run_station(
        &self,
        station: &Station,
        now: OffsetDateTime,
    ) -> Result<StationRun, StorageError> {
        let logger = self.logger.new(o!("station" => station.id));

        let reading = match self.scrape(&logger, station, now).await {
            Ok(reading) => reading,
            Err(err) => {
                warn!(logger, "no reading this cycle, fetch failed: {}", err);
                StationReading::unavailable(now)
            }
        };

        let store = SeriesStore::for_station(&self.settings.data_dir, station.id);
        let prior = match store.load() {
            Ok(loaded) => {
                if loaded.duplicates_dropped > 0 {
                    warn!(
                        logger,
                        "dropped {} duplicate rows from {}",
                        loaded.duplicates_dropped,
                        store.path().display()
                    );
                }
                loaded.series
            }
            Err(err) => {
                warn!(logger, "starting from an empty series: {}", err);
                TimeSeries::new()
            }
        };

        let consolidation = consolidate(prior, &reading, now, self.settings.retention);
        if consolidation.pruned > 0 {
            debug!(logger, "pruned {} expired rows", consolidation.pruned);
        }
        match consolidation.outcome {
            AppendOutcome::Appended => {}
            AppendOutcome::Duplicate => {
                info!(logger, "reading at {} already recorded", now);
            }
            AppendOutcome::NoReading => {
                debug!(logger, "nothing appended, temperature unavailable");
            }
        }

        if consolidation.needs_persist() {
            if let Err(err) = store.save(&consolidation.series) {
                error!(logger, "{}", err);
                return Err(err);
            }
            debug!(logger, "saved series to {}", store.path().display());
        }

        let status = consolidation.status();
        info!(
            logger,
            "{}: {}, {} rows in window",
            station.name,
            status,
            consolidation.series.len()
        );

        Ok(StationRun {
            station: station.clone(),
            reading,
            series: consolidation.series,
            status,
        })
    }

    /// Stations are handled one after another; the first write failure stops the run.
    pub async fn run_all(
        &self,
        stations: &[Station],
        now: OffsetDateTime,
    ) -> Result<Vec<StationRun>, StorageError> {
        let mut runs = Vec::with_capacity(stations.len());
        for station in stations {
            runs.push(self.run_station(station, now).await?);
        }
        Ok(runs)
    }

    async fn scrape(
        &self,
        logger: &Logger,
        station: &Station,
        now: OffsetDateTime,
    ) -> Result<StationReading, FetchError> {
        let url = station.page_url(&self.settings.url_template);
        info!(logger, "fetching {}", url);
        let html = self.fetcher.fetch_page(&url).await?;

        let extraction = self.extractor.extract(&html);
        for issue in &extraction.issues {
            debug!(logger, "{}", issue);
        }

        let (reading, dew_point_issue) =
            StationReading::from_fields_checked(now, &extraction.fields);
        if let Some(err) = dew_point_issue {
            debug!(logger, "dew point undefined: {}", err);
        }
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn truncation_drops_subseconds() {
        let ts = datetime!(2024-10-01 12:00:00.987654 -3);
        assert_eq!(truncate_to_seconds(ts), datetime!(2024-10-01 12:00:00 -3));
    }

    #[test]
    fn observation_time_uses_offset() {
        let offset = UtcOffset::from_hms(-3, 0, 0).unwrap();
        let now = observation_time(offset);
        assert_eq!(now.offset(), offset);
        assert_eq!(now.nanosecond(), 0);
    }
}
