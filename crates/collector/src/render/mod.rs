mod charts;
mod layout;
mod palette;
mod station_map;
mod status_page;

use std::io;
use std::path::{Path, PathBuf};

use cge_monitor_core::write_atomic;
use maud::Markup;
use time::OffsetDateTime;

pub use station_map::{project, station_map};
pub use status_page::status_page;

use crate::StationRun;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("failed to write page '{0}'")]
    Write(PathBuf, #[source] io::Error),
}

fn write_page(path: PathBuf, markup: Markup) -> Result<PathBuf, RenderError> {
    write_atomic(&path, markup.into_string().as_bytes())
        .map_err(|e| RenderError::Write(path.clone(), e))?;
    Ok(path)
}

pub fn write_status_page(output_dir: &Path, run: &StationRun) -> Result<PathBuf, RenderError> {
    write_page(
        output_dir.join(format!("station_{}.html", run.station.id)),
        status_page(run),
    )
}

pub fn write_station_map(
    output_dir: &Path,
    runs: &[StationRun],
    updated: OffsetDateTime,
) -> Result<PathBuf, RenderError> {
    write_page(output_dir.join("map.html"), station_map(runs, updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Station, StationReading, StationStatus, TimeSeries};
    use time::macros::datetime;

    #[test]
    fn pages_are_written_per_station_and_for_the_map() {
        let dir = tempfile::tempdir().unwrap();
        let at = datetime!(2024-10-01 14:00:00 -3);
        let run = StationRun {
            station: Station::unlisted(504),
            reading: StationReading::unavailable(at),
            series: TimeSeries::new(),
            status: StationStatus::Offline,
        };

        let page = write_status_page(dir.path(), &run).unwrap();
        let map = write_station_map(dir.path(), &[run], at).unwrap();

        assert!(page.ends_with("station_504.html"));
        assert!(std::fs::read_to_string(page).unwrap().contains("Offline"));
        assert!(map.ends_with("map.html"));
    }
}
