use std::fmt;

use time::OffsetDateTime;

use super::{try_dew_point, DewPointError, ExtractedFields};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindUnit {
    KilometersPerHour,
    MetersPerSecond,
}

impl WindUnit {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "km/h" => Some(WindUnit::KilometersPerHour),
            "m/s" => Some(WindUnit::MetersPerSecond),
            _ => None,
        }
    }
}

impl fmt::Display for WindUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindUnit::KilometersPerHour => write!(f, "km/h"),
            WindUnit::MetersPerSecond => write!(f, "m/s"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindSpeed {
    pub value: f64,
    pub unit: WindUnit,
}

impl WindSpeed {
    /// Stand-in for a missing or unreadable wind cell.
    pub fn calm() -> Self {
        WindSpeed {
            value: 0.0,
            unit: WindUnit::KilometersPerHour,
        }
    }

    pub fn as_kmh(&self) -> f64 {
        match self.unit {
            WindUnit::KilometersPerHour => self.value,
            WindUnit::MetersPerSecond => self.value * 3.6,
        }
    }
}

impl fmt::Display for WindSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}{}", self.value, self.unit)
    }
}

/// One timestamped scrape of a station page.
///
/// Pages that were fetched always carry `rain_mm` and `wind_speed` (0.0 when
/// the cell was missing). A reading built by [`StationReading::unavailable`]
/// has every measurement absent.
#[derive(Debug, Clone, PartialEq)]
pub struct StationReading {
    pub timestamp: OffsetDateTime,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub rain_mm: Option<f64>,
    pub wind_speed: Option<WindSpeed>,
    /// Present iff temperature and humidity are, and the formula is defined.
    pub dew_point_c: Option<f64>,
}

impl StationReading {
    pub fn from_fields(timestamp: OffsetDateTime, fields: &ExtractedFields) -> Self {
        Self::from_fields_checked(timestamp, fields).0
    }

    /// Like [`StationReading::from_fields`], also returning why the dew point
    /// is absent when both of its inputs were present.
    pub fn from_fields_checked(
        timestamp: OffsetDateTime,
        fields: &ExtractedFields,
    ) -> (Self, Option<DewPointError>) {
        let dew_point = match (fields.temperature_c, fields.humidity_pct) {
            (Some(t), Some(h)) => Some(try_dew_point(t, h)),
            _ => None,
        };
        let reading = StationReading {
            timestamp,
            temperature_c: fields.temperature_c,
            humidity_pct: fields.humidity_pct,
            rain_mm: Some(fields.rain_mm),
            wind_speed: Some(fields.wind_speed),
            dew_point_c: dew_point.and_then(|d| d.ok()),
        };
        (reading, dew_point.and_then(|d| d.err()))
    }

    /// Reading for a page that could not be fetched at all.
    pub fn unavailable(timestamp: OffsetDateTime) -> Self {
        StationReading {
            timestamp,
            temperature_c: None,
            humidity_pct: None,
            rain_mm: None,
            wind_speed: None,
            dew_point_c: None,
        }
    }

    /// Whether the reading can be appended to a series.
    pub fn is_usable(&self) -> bool {
        self.temperature_c.is_some()
    }
}
