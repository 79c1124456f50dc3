use maud::{html, Markup};
use time::{macros::format_description, OffsetDateTime};

use super::{layout::page, palette};
use crate::{StationRun, StationStatus};

const SVG_WIDTH: f64 = 640.0;
const SVG_HEIGHT: f64 = 700.0;

// Greater São Paulo, with room around the outermost stations
const NORTH: f64 = -23.35;
const SOUTH: f64 = -23.95;
const EAST: f64 = -46.38;
const WEST: f64 = -46.98;

const MARKER_RADIUS: f64 = 16.0;
const BAR_WIDTH: f64 = 5.0;
const BAR_MAX_HEIGHT: f64 = 40.0;
/// Rain at which a bar reaches full height.
const BAR_FULL_SCALE_MM: f64 = 15.0;

/// Mercator projection for latitude
fn mercator_lat(lat: f64) -> f64 {
    (std::f64::consts::PI / 4.0 + lat * std::f64::consts::PI / 360.0)
        .tan()
        .ln()
}

/// Convert lat/lon to SVG coordinates, `None` outside the mapped area.
pub fn project(lat: f64, lon: f64) -> Option<(f64, f64)> {
    if !(SOUTH..=NORTH).contains(&lat) || !(WEST..=EAST).contains(&lon) {
        return None;
    }

    let mercator_top = mercator_lat(NORTH);
    let mercator_bottom = mercator_lat(SOUTH);
    let lat_normalized = (mercator_top - mercator_lat(lat)) / (mercator_top - mercator_bottom);
    let lon_normalized = (lon - WEST) / (EAST - WEST);

    Some((lon_normalized * SVG_WIDTH, lat_normalized * SVG_HEIGHT))
}

pub fn rain_bar_height(mm: f64) -> f64 {
    (mm / BAR_FULL_SCALE_MM).clamp(0.0, 1.0) * BAR_MAX_HEIGHT
}

fn marker(run: &StationRun, x: f64, y: f64) -> Markup {
    let temperature = run.reading.temperature_c;
    let online = run.status == StationStatus::Online;
    let class = if online {
        "station-marker online"
    } else {
        "station-marker offline"
    };
    let fill = match temperature {
        Some(t) if online => palette::temperature_color(t).hex(),
        _ => "none".to_string(),
    };
    let text_color = match temperature {
        Some(t) if online && palette::marker_needs_white(t) => "white",
        _ => "black",
    };
    let bar = run
        .reading
        .rain_mm
        .filter(|mm| *mm > 0.0)
        .map(|mm| (mm, rain_bar_height(mm)));

    html! {
        g class="station" data-station-id=(run.station.id) {
            circle
                class=(class)
                cx=(format!("{:.1}", x))
                cy=(format!("{:.1}", y))
                r=(MARKER_RADIUS)
                fill=(fill)
                fill-opacity="0.8"
                stroke="black" {}
            @if let Some(t) = temperature {
                text x=(format!("{:.1}", x)) y=(format!("{:.1}", y)) text-anchor="middle"
                    dominant-baseline="middle" font-size="10" font-weight="bold" fill=(text_color) {
                    (format!("{:.1}", t))
                }
            }
            @if let Some((mm, height)) = bar {
                @let bar_x = x + MARKER_RADIUS + 4.0;
                rect class="rain-bar"
                    x=(format!("{:.1}", bar_x))
                    y=(format!("{:.1}", y + MARKER_RADIUS - height))
                    width=(BAR_WIDTH)
                    height=(format!("{:.1}", height))
                    fill="blue" stroke="darkblue" {}
                text x=(format!("{:.1}", bar_x)) y=(format!("{:.1}", y + MARKER_RADIUS - height - 3.0))
                    font-size="9" fill="blue" { (format!("{:.1}", mm)) }
            }
            text x=(format!("{:.1}", x)) y=(format!("{:.1}", y + MARKER_RADIUS + 11.0))
                text-anchor="middle" font-size="9" { (run.station.name) }
        }
    }
}

/// All mapped stations coloured by their latest temperature.
pub fn station_map(runs: &[StationRun], updated: OffsetDateTime) -> Markup {
    let caption = updated
        .format(format_description!("[day]/[month]/[year] [hour]:[minute]"))
        .unwrap_or_default();

    page(
        "Estações do CGE-SP - Temperatura e Precipitação",
        html! {
            header {
                h1 { "Estações do CGE-SP - Temperatura e Precipitação" }
            }
            svg xmlns="http://www.w3.org/2000/svg" class="station-map"
                viewBox=(format!("0 0 {} {}", SVG_WIDTH, SVG_HEIGHT)) {
                rect width=(SVG_WIDTH) height=(SVG_HEIGHT) fill="#f2f2ef" {}
                @for run in runs {
                    @if let Some((x, y)) = run.station.coordinates().and_then(|(lat, lon)| project(lat, lon)) {
                        (marker(run, x, y))
                    }
                }
            }
            p class="caption" { "Última atualização: " (caption) }
            p class="caption" { "Chuva contabilizada desde as 07:00" }
        },
    )
}
