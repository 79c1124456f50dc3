use maud::{html, Markup};
use time::{macros::format_description, Duration, OffsetDateTime};

use crate::TimeSeries;

const WIDTH: f64 = 720.0;
const HEIGHT: f64 = 220.0;
const MARGIN_LEFT: f64 = 48.0;
const MARGIN_RIGHT: f64 = 12.0;
const MARGIN_TOP: f64 = 12.0;
const MARGIN_BOTTOM: f64 = 28.0;
const TICK_EVERY: Duration = Duration::hours(2);

/// Visible time range and value range of one chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartFrame {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
    pub y_min: f64,
    pub y_max: f64,
}

impl ChartFrame {
    /// The day before `latest` plus an hour either side.
    pub fn around(latest: OffsetDateTime, y_min: f64, y_max: f64) -> Self {
        let (y_min, y_max) = if y_max > y_min {
            (y_min, y_max)
        } else {
            (y_min - 1.0, y_min + 1.0)
        };
        ChartFrame {
            start: latest - Duration::hours(25),
            end: latest + Duration::hours(1),
            y_min,
            y_max,
        }
    }

    fn x(&self, at: OffsetDateTime) -> f64 {
        let span = (self.end - self.start).as_seconds_f64();
        let offset = (at - self.start).as_seconds_f64();
        MARGIN_LEFT + offset / span * (WIDTH - MARGIN_LEFT - MARGIN_RIGHT)
    }

    fn y(&self, value: f64) -> f64 {
        let plot = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        MARGIN_TOP + (self.y_max - value) / (self.y_max - self.y_min) * plot
    }

    fn contains(&self, at: OffsetDateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

pub struct Trace<'a> {
    pub label: &'a str,
    pub color: &'a str,
    pub dashed: bool,
    pub points: Vec<(OffsetDateTime, f64)>,
}

impl<'a> Trace<'a> {
    pub fn from_series(
        label: &'a str,
        color: &'a str,
        series: &TimeSeries,
        value: impl Fn(&crate::SeriesRow) -> Option<f64>,
    ) -> Self {
        Trace {
            label,
            color,
            dashed: false,
            points: series
                .rows()
                .iter()
                .filter_map(|row| value(row).map(|v| (row.timestamp, v)))
                .collect(),
        }
    }

    pub fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }

    fn min(&self) -> Option<f64> {
        self.points.iter().map(|&(_, v)| v).reduce(f64::min)
    }

    fn max(&self) -> Option<f64> {
        self.points.iter().map(|&(_, v)| v).reduce(f64::max)
    }
}

/// Temperature chart bounds: two degrees below the lowest dew point and above the highest temperature.
pub fn temperature_range(temperature: &Trace, dew_point: &Trace) -> (f64, f64) {
    let low = dew_point.min().or(temperature.min()).unwrap_or(0.0);
    let high = temperature.max().or(dew_point.max()).unwrap_or(30.0);
    (low - 2.0, high + 2.0)
}

pub fn rain_range(rain: &Trace) -> (f64, f64) {
    (0.0, rain.max().unwrap_or(0.0).max(0.0) + 5.0)
}

/// Instants on even local hours inside the frame.
pub fn hour_ticks(frame: &ChartFrame) -> Vec<OffsetDateTime> {
    let step = TICK_EVERY.whole_seconds();
    let local = frame.start.unix_timestamp() + frame.start.offset().whole_seconds() as i64;
    let mut aligned = local.div_euclid(step) * step;
    if aligned < local {
        aligned += step;
    }

    let mut tick = frame.start + Duration::seconds(aligned - local);
    let mut ticks = Vec::new();
    while tick <= frame.end {
        ticks.push(tick);
        tick += TICK_EVERY;
    }
    ticks
}

fn tick_label(at: OffsetDateTime) -> String {
    at.format(format_description!("[hour]:[minute]"))
        .unwrap_or_default()
}

pub fn line_chart(title: &str, unit: &str, frame: &ChartFrame, traces: &[Trace]) -> Markup {
    let value_ticks: Vec<f64> = (0..=4)
        .map(|i| frame.y_min + (frame.y_max - frame.y_min) * i as f64 / 4.0)
        .collect();
    let bottom = HEIGHT - MARGIN_BOTTOM;

    html! {
        figure class="chart" {
            figcaption { (title) " (" (unit) ")" }
            svg xmlns="http://www.w3.org/2000/svg"
                viewBox=(format!("0 0 {} {}", WIDTH, HEIGHT))
                class="line-chart" {
                rect x=(MARGIN_LEFT) y=(MARGIN_TOP)
                    width=(WIDTH - MARGIN_LEFT - MARGIN_RIGHT)
                    height=(bottom - MARGIN_TOP)
                    fill="white" stroke="#bbbbbb" {}

                @for value in &value_ticks {
                    @let y = format!("{:.1}", frame.y(*value));
                    line class="grid" x1=(MARGIN_LEFT) x2=(WIDTH - MARGIN_RIGHT) y1=(y) y2=(y)
                        stroke="#e5e5e5" {}
                    text x=(MARGIN_LEFT - 6.0) y=(y) text-anchor="end" dominant-baseline="middle"
                        font-size="11" { (format!("{:.0}", value)) }
                }

                @for tick in hour_ticks(frame) {
                    @let x = format!("{:.1}", frame.x(tick));
                    line class="grid" x1=(x) x2=(x) y1=(MARGIN_TOP) y2=(bottom) stroke="#e5e5e5" {}
                    text class="tick" x=(x) y=(HEIGHT - 8.0) text-anchor="middle" font-size="11" {
                        (tick_label(tick))
                    }
                }

                @for trace in traces {
                    @let visible: Vec<(f64, f64)> = trace.points.iter()
                        .filter(|(at, _)| frame.contains(*at))
                        .map(|&(at, v)| (frame.x(at), frame.y(v)))
                        .collect();
                    polyline class="trace" fill="none" stroke=(trace.color) stroke-width="2"
                        stroke-dasharray=[trace.dashed.then_some("6 4")]
                        points=(visible.iter().map(|(x, y)| format!("{:.1},{:.1}", x, y)).collect::<Vec<_>>().join(" ")) {}
                    @for (x, y) in &visible {
                        circle cx=(format!("{:.1}", x)) cy=(format!("{:.1}", y)) r="2.5" fill=(trace.color) {}
                    }
                }
            }
            @if traces.len() > 1 {
                ul class="legend" {
                    @for trace in traces {
                        li style=(format!("color: {}", trace.color)) { (trace.label) }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn frame_spans_a_day_and_two_hours() {
        let frame = ChartFrame::around(datetime!(2024-10-01 12:30:00 -3), 0.0, 10.0);
        assert_eq!(frame.start, datetime!(2024-09-30 11:30:00 -3));
        assert_eq!(frame.end, datetime!(2024-10-01 13:30:00 -3));
    }

    #[test]
    fn ticks_fall_on_even_local_hours() {
        let frame = ChartFrame::around(datetime!(2024-10-01 12:30:00 -3), 0.0, 10.0);
        let ticks = hour_ticks(&frame);

        assert_eq!(ticks.first(), Some(&datetime!(2024-09-30 12:00:00 -3)));
        assert_eq!(ticks.last(), Some(&datetime!(2024-10-01 12:00:00 -3)));
        assert_eq!(ticks.len(), 13);
        assert_eq!(tick_label(ticks[1]), "14:00");
    }

    #[test]
    fn degenerate_range_is_widened() {
        let frame = ChartFrame::around(datetime!(2024-10-01 12:00:00 -3), 5.0, 5.0);
        assert_eq!((frame.y_min, frame.y_max), (4.0, 6.0));
    }

    #[test]
    fn ranges_pad_the_data() {
        let at = datetime!(2024-10-01 12:00:00 -3);
        let temperature = Trace {
            label: "t",
            color: "red",
            dashed: false,
            points: vec![(at, 20.0), (at, 25.0)],
        };
        let dew = Trace {
            label: "d",
            color: "green",
            dashed: true,
            points: vec![(at, 9.3)],
        };
        assert_eq!(temperature_range(&temperature, &dew), (9.3 - 2.0, 27.0));
        assert_eq!(rain_range(&dew), (0.0, 9.3 + 5.0));
    }
}
