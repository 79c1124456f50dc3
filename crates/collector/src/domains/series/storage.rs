use std::io;
use std::path::{Path, PathBuf};

use cge_monitor_core::write_atomic;
use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, macros::format_description, OffsetDateTime};

use super::{SeriesRow, TimeSeries};

const COLUMNS: [&str; 6] = [
    "Timestamp",
    "Temperature",
    "Humidity",
    "Rain",
    "WindSpeed",
    "Dew Point",
];

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("failed to read series file '{0}'")]
    Read(PathBuf, #[source] io::Error),
    #[error("series file '{path}' is corrupt at record {record}: {message}")]
    Parse {
        path: PathBuf,
        record: usize,
        message: String,
    },
    #[error("failed to write series file '{0}'")]
    Write(PathBuf, #[source] io::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Temperature")]
    temperature: Option<f64>,
    #[serde(rename = "Humidity")]
    humidity: Option<f64>,
    #[serde(rename = "Rain")]
    rain: Option<f64>,
    #[serde(rename = "WindSpeed")]
    wind_speed: Option<f64>,
    #[serde(rename = "Dew Point")]
    dew_point: Option<f64>,
}

/// A series read back from disk.
#[derive(Debug)]
pub struct LoadedSeries {
    pub series: TimeSeries,
    /// Rows discarded because their timestamp was already present.
    pub duplicates_dropped: usize,
}

/// CSV file holding one station's rolling window.
#[derive(Debug, Clone)]
pub struct SeriesStore {
    path: PathBuf,
}

impl SeriesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SeriesStore { path: path.into() }
    }

    pub fn for_station(data_dir: &Path, station_id: u32) -> Self {
        Self::new(data_dir.join(format!("{}_weather_data.csv", station_id)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A file that does not exist yet is an empty series, not an error.
    pub fn load(&self) -> Result<LoadedSeries, StorageError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(LoadedSeries {
                    series: TimeSeries::new(),
                    duplicates_dropped: 0,
                })
            }
            Err(e) => return Err(StorageError::Read(self.path.clone(), e)),
        };

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let mut rows = Vec::new();
        for (index, record) in reader.deserialize::<CsvRow>().enumerate() {
            let record = record.map_err(|e| self.corrupt(index + 1, e.to_string()))?;
            let timestamp = parse_timestamp(&record.timestamp).map_err(|e| {
                self.corrupt(index + 1, format!("bad timestamp {:?}: {}", record.timestamp, e))
            })?;
            rows.push(SeriesRow {
                timestamp,
                temperature: finite(record.temperature),
                humidity: finite(record.humidity),
                rain: finite(record.rain),
                wind_speed: finite(record.wind_speed),
                dew_point: finite(record.dew_point),
            });
        }

        let (series, duplicates_dropped) = TimeSeries::from_rows(rows);
        Ok(LoadedSeries {
            series,
            duplicates_dropped,
        })
    }

    /// Replaces the file atomically with `series`.
    pub fn save(&self, series: &TimeSeries) -> Result<(), StorageError> {
        let contents = encode(series).map_err(|e| StorageError::Write(self.path.clone(), e))?;
        write_atomic(&self.path, &contents).map_err(|e| StorageError::Write(self.path.clone(), e))
    }

    fn corrupt(&self, record: usize, message: String) -> StorageError {
        StorageError::Parse {
            path: self.path.clone(),
            record,
            message,
        }
    }
}

fn encode(series: &TimeSeries) -> Result<Vec<u8>, io::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(COLUMNS).map_err(io::Error::other)?;
    for row in series.rows() {
        writer
            .serialize(CsvRow {
                timestamp: format_timestamp(row.timestamp).map_err(io::Error::other)?,
                temperature: row.temperature,
                humidity: row.humidity,
                rain: row.rain,
                wind_speed: row.wind_speed,
                dew_point: row.dew_point,
            })
            .map_err(io::Error::other)?;
    }
    writer.into_inner().map_err(|e| io::Error::other(e.to_string()))
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// `2024-10-01 12:00:00-03:00`
pub fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, time::error::Format> {
    timestamp.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
    ))
}

/// Accepts the written format, the same with fractional seconds, and RFC 3339.
pub fn parse_timestamp(text: &str) -> Result<OffsetDateTime, time::error::Parse> {
    let text = text.trim();
    OffsetDateTime::parse(
        text,
        format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second][offset_hour sign:mandatory]:[offset_minute]"
        ),
    )
    .or_else(|_| {
        OffsetDateTime::parse(
            text,
            format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond][offset_hour sign:mandatory]:[offset_minute]"
            ),
        )
    })
    .or_else(|_| OffsetDateTime::parse(text, &Rfc3339))
}
