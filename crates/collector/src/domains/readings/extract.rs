//! Field extraction from a station observation page.
//!
//! The portal has no stable schema, so nothing here depends on table
//! position. The page goes through an HTML parser, every `<td>`/`<th>` is
//! reduced to its decoded text and classified by the labels it contains:
//!
//! | field       | cell must contain        | value pattern                    |
//! |-------------|--------------------------|----------------------------------|
//! | temperature | `Atual:` and `°`         | `Atual: 23,5 °C`                 |
//! | humidity    | `Atual:` and `%`         | `Atual: 61,2 %`                  |
//! | rain        | `Per. Atual:`            | `Per. Atual: 1,4 mm`             |
//! | wind        | `Velocidade:`            | `Velocidade: 7,2 km/h` (or m/s)  |
//!
//! Decimal commas are normalized to periods before matching. The first
//! candidate cell that yields a number wins. A field that cannot be read
//! degrades on its own: temperature and humidity become absent, rain and
//! wind fall back to 0.0. The reason is reported as a [`FieldIssue`].

use std::fmt;

use regex::Regex;
use scraper::{Html, Selector};

use super::{WindSpeed, WindUnit};

const SNIPPET_LEN: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Temperature,
    Humidity,
    Rain,
    Wind,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Temperature => write!(f, "temperature"),
            Field::Humidity => write!(f, "humidity"),
            Field::Rain => write!(f, "rain"),
            Field::Wind => write!(f, "wind"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IssueKind {
    /// No cell carried the field's label.
    Missing,
    /// A labelled cell was found but held no readable number.
    Unparsable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldIssue {
    pub field: Field,
    pub kind: IssueKind,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::Missing => write!(f, "{} cell not found", self.field),
            IssueKind::Unparsable(text) => {
                write!(f, "{} cell has no readable value: {:?}", self.field, text)
            }
        }
    }
}

/// Measurements read from one page, before a timestamp is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFields {
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub rain_mm: f64,
    pub wind_speed: WindSpeed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub fields: ExtractedFields,
    pub issues: Vec<FieldIssue>,
}

#[derive(thiserror::Error, Debug)]
pub enum ExtractorError {
    #[error("invalid value pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("invalid cell selector: {0}")]
    Selector(String),
}

pub struct FieldExtractor {
    cells: Selector,
    temperature: Regex,
    humidity: Regex,
    rain: Regex,
    wind: Regex,
}

impl FieldExtractor {
    pub fn new() -> Result<Self, ExtractorError> {
        Ok(FieldExtractor {
            cells: Selector::parse("td, th")
                .map_err(|e| ExtractorError::Selector(e.to_string()))?,
            temperature: Regex::new(r"Atual:\s*(-?\d+(?:\.\d+)?)\s*°\s*C")?,
            humidity: Regex::new(r"Atual:\s*(\d+(?:\.\d+)?)\s*%")?,
            rain: Regex::new(r"Per\. Atual:\s*(\d+(?:\.\d+)?)\s*mm")?,
            wind: Regex::new(r"Velocidade:\s*(\d+(?:\.\d+)?)\s*(km/h|m/s)")?,
        })
    }

    /// Never fails: unreadable fields are reported in [`Extraction::issues`].
    pub fn extract(&self, html: &str) -> Extraction {
        let cells = self.cell_texts(html);
        let mut issues = Vec::new();

        let temperature_c = scan(
            &cells,
            |c| c.contains("Atual:") && c.contains('°'),
            &self.temperature,
        )
        .map(|(value, _)| value)
        .map_err(|kind| issues.push(FieldIssue { field: Field::Temperature, kind }))
        .ok();

        let humidity_pct = scan(
            &cells,
            |c| c.contains("Atual:") && c.contains('%'),
            &self.humidity,
        )
        .map(|(value, _)| value)
        .map_err(|kind| issues.push(FieldIssue { field: Field::Humidity, kind }))
        .ok();

        let rain_mm = scan(&cells, |c| c.contains("Per. Atual:"), &self.rain)
            .map(|(value, _)| value)
            .unwrap_or_else(|kind| {
                issues.push(FieldIssue { field: Field::Rain, kind });
                0.0
            });

        let wind_speed = scan(&cells, |c| c.contains("Velocidade:"), &self.wind)
            .and_then(|(value, token)| {
                let token = token.unwrap_or_default();
                WindUnit::from_token(&token)
                    .map(|unit| WindSpeed { value, unit })
                    .ok_or(IssueKind::Unparsable(token))
            })
            .unwrap_or_else(|kind| {
                issues.push(FieldIssue { field: Field::Wind, kind });
                WindSpeed::calm()
            });

        Extraction {
            fields: ExtractedFields {
                temperature_c,
                humidity_pct,
                rain_mm,
                wind_speed,
            },
            issues,
        }
    }

    /// Decoded text of every table cell, in document order, normalized for matching.
    fn cell_texts(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.cells)
            .map(|cell| normalize(&cell.text().collect::<Vec<_>>().join(" ")))
            .collect()
    }
}

fn normalize(text: &str) -> String {
    text.replace('\u{a0}', " ")
        .replace('º', "°")
        .replace(',', ".")
}

/// First labelled cell whose pattern yields a number, with the optional
/// second capture (the unit token).
fn scan(
    cells: &[String],
    is_candidate: impl Fn(&str) -> bool,
    pattern: &Regex,
) -> Result<(f64, Option<String>), IssueKind> {
    let mut first_candidate: Option<&str> = None;

    for cell in cells.iter().filter(|c| is_candidate(c.as_str())) {
        first_candidate.get_or_insert(cell.as_str());
        let Some(caps) = pattern.captures(cell) else {
            continue;
        };
        if let Some(Ok(value)) = caps.get(1).map(|m| m.as_str().parse::<f64>()) {
            return Ok((value, caps.get(2).map(|m| m.as_str().to_string())));
        }
    }

    match first_candidate {
        Some(cell) => Err(IssueKind::Unparsable(snippet(cell))),
        None => Err(IssueKind::Missing),
    }
}

fn snippet(cell: &str) -> String {
    let collapsed = cell.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(SNIPPET_LEN).collect()
}
