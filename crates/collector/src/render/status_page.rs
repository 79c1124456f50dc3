use maud::{html, Markup};
use time::macros::format_description;

use super::{
    charts::{line_chart, rain_range, temperature_range, ChartFrame, Trace},
    layout::page,
    palette::{self, Rgb},
};
use crate::{StationRun, StationStatus};

struct Tile {
    label: &'static str,
    value: Option<f64>,
    decimals: usize,
    unit: &'static str,
    background: Rgb,
    white_text: bool,
    note: Option<String>,
}

impl Tile {
    fn text(&self) -> String {
        match self.value {
            Some(v) => format!("{:.*} {}", self.decimals, v, self.unit),
            None => format!("NaN {}", self.unit),
        }
    }
}

fn tiles(run: &StationRun) -> [Tile; 3] {
    let reading = &run.reading;
    let dew_point = match reading.dew_point_c {
        Some(d) => format!("Ponto de orvalho: {:.1} °C", d),
        None => "Ponto de orvalho: NaN °C".to_string(),
    };

    [
        Tile {
            label: "Temperatura",
            value: reading.temperature_c,
            decimals: 1,
            unit: "°C",
            background: reading
                .temperature_c
                .map_or(palette::NEUTRAL, palette::temperature_color),
            white_text: reading
                .temperature_c
                .is_some_and(palette::temperature_tile_needs_white),
            note: Some(dew_point),
        },
        Tile {
            label: "Umidade",
            value: reading.humidity_pct,
            decimals: 0,
            unit: "%",
            background: reading
                .humidity_pct
                .map_or(palette::NEUTRAL, palette::humidity_color),
            white_text: reading
                .humidity_pct
                .is_some_and(palette::humidity_tile_needs_white),
            note: None,
        },
        Tile {
            label: "Chuva acum.",
            value: reading.rain_mm,
            decimals: 1,
            unit: "mm",
            background: reading.rain_mm.map_or(palette::NEUTRAL, palette::rain_color),
            white_text: reading.rain_mm.is_some_and(palette::rain_tile_needs_white),
            note: None,
        },
    ]
}

fn tile(tile: &Tile) -> Markup {
    let color = if tile.white_text { "white" } else { "black" };
    html! {
        div class="tile" style=(format!("background: {}; color: {}", tile.background.hex(), color)) {
            div class="tile-label" { (tile.label) ":" }
            div class="tile-value" { (tile.text()) }
            @if let Some(note) = &tile.note {
                div class="tile-note" style="color: black" { (note) }
            }
        }
    }
}

fn charts(run: &StationRun) -> Markup {
    let series = &run.series;
    let temperature = Trace::from_series("Temperatura", "red", series, |r| r.temperature);
    let dew_point = Trace::from_series("Ponto de orvalho", "green", series, |r| r.dew_point).dashed();
    let humidity = Trace::from_series("Umidade relativa", "blue", series, |r| r.humidity);
    let rain = Trace::from_series("Chuva", "black", series, |r| r.rain);

    let at = run.reading.timestamp;
    let (t_min, t_max) = temperature_range(&temperature, &dew_point);
    let (r_min, r_max) = rain_range(&rain);
    let temperature_frame = ChartFrame::around(at, t_min, t_max);
    let humidity_frame = ChartFrame::around(at, 0.0, 102.0);
    let rain_frame = ChartFrame::around(at, r_min, r_max);

    html! {
        section class="charts" {
            h2 { "Tempo nas últimas 24 horas" }
            (line_chart("Temperatura", "°C", &temperature_frame, &[temperature, dew_point]))
            (line_chart("Umidade relativa", "%", &humidity_frame, &[humidity]))
            (line_chart("Chuva acumulada", "mm", &rain_frame, &[rain]))
            p class="axis-label" { "Hora local" }
        }
    }
}

/// Current conditions and the last day of observations for one station.
pub fn status_page(run: &StationRun) -> Markup {
    let at = run.reading.timestamp;
    let updated = format!(
        "{} às {}",
        at.format(format_description!("[day]/[month]/[year]"))
            .unwrap_or_default(),
        at.format(format_description!("[hour]:[minute]"))
            .unwrap_or_default()
    );
    let (status_class, status_color) = match run.status {
        StationStatus::Online => ("status-online", "green"),
        StationStatus::Offline => ("status-offline", "red"),
    };
    let title = format!("Condições meteorológicas atuais - {}", run.station.name);

    page(
        &title,
        html! {
            header {
                h1 { (title) }
                p class="updated" { "Atualizado " (updated) }
                p class=(status_class) style=(format!("color: {}", status_color)) { (run.status) }
            }
            div class="tiles" {
                @for t in &tiles(run) {
                    (tile(t))
                }
            }
            (charts(run))
        },
    )
}
