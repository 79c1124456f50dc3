use crate::helpers::{service, serving, station_page, MockFetcher};
use collector::{
    FetchError, SeriesRow, SeriesStore, Station, StationStatus, StorageError, TimeSeries,
};
use time::macros::datetime;
use time::Duration;

const BUTANTA: u32 = 1000842;

fn station() -> Station {
    collector::lookup(BUTANTA).expect("registered station")
}

fn row(timestamp: time::OffsetDateTime, temperature: f64) -> SeriesRow {
    SeriesRow {
        timestamp,
        temperature: Some(temperature),
        humidity: Some(60.0),
        rain: Some(0.0),
        wind_speed: Some(0.0),
        dew_point: None,
    }
}

/// Reading with temperature and humidity only lands as one Online row.
#[tokio::test]
async fn first_reading_into_an_empty_series() {
    let dir = tempfile::tempdir().unwrap();
    let now = datetime!(2024-10-01 12:00:00 -3);
    let service = service(serving(station_page("20,0", "50,0")), dir.path());

    let run = service.run_station(&station(), now).await.unwrap();

    assert_eq!(run.status, StationStatus::Online);
    assert_eq!(run.series.len(), 1);
    let latest = run.series.latest().unwrap();
    assert_eq!(latest.timestamp, now);
    assert_eq!(latest.temperature, Some(20.0));
    assert_eq!(latest.rain, Some(0.0));
    assert_eq!(latest.wind_speed, Some(0.0));
    let dew_point = latest.dew_point.unwrap();
    assert!((dew_point - 9.3).abs() < 0.05, "dew point {dew_point}");

    let stored = SeriesStore::for_station(dir.path(), BUTANTA).load().unwrap();
    assert_eq!(stored.series, run.series);
}

/// The request goes to the configured page of the station.
#[tokio::test]
async fn fetches_the_station_page() {
    let dir = tempfile::tempdir().unwrap();
    let mut fetcher = MockFetcher::new();
    fetcher
        .expect_fetch_page()
        .withf(|url| url == "http://cge.test/estacao.jsp?POSTO=1000842")
        .times(1)
        .returning(|_| Ok(station_page("18,5", "77,0")));

    let run = service(fetcher, dir.path())
        .run_station(&station(), datetime!(2024-10-01 12:00:00 -3))
        .await
        .unwrap();
    assert_eq!(run.reading.temperature_c, Some(18.5));
}

/// A transport error leaves every field absent and the stored series untouched.
#[tokio::test]
async fn transport_failure_goes_offline_and_prunes() {
    let dir = tempfile::tempdir().unwrap();
    let now = datetime!(2024-10-01 12:00:00 -3);
    let store = SeriesStore::for_station(dir.path(), BUTANTA);
    let (prior, _) = TimeSeries::from_rows(vec![
        row(now - Duration::hours(30), 14.0),
        row(now - Duration::hours(1), 21.0),
    ]);
    store.save(&prior).unwrap();
    let before = std::fs::read_to_string(store.path()).unwrap();

    let mut fetcher = MockFetcher::new();
    fetcher.expect_fetch_page().times(1).returning(|_| {
        Err(FetchError::Request(reqwest_middleware::Error::Middleware(
            anyhow::anyhow!("connection refused"),
        )))
    });

    let run = service(fetcher, dir.path())
        .run_station(&station(), now)
        .await
        .unwrap();

    assert_eq!(run.status, StationStatus::Offline);
    assert_eq!(run.reading.temperature_c, None);
    assert_eq!(run.reading.humidity_pct, None);
    assert_eq!(run.reading.rain_mm, None);
    assert_eq!(run.reading.wind_speed, None);
    assert_eq!(run.reading.dew_point_c, None);
    assert_eq!(run.series.len(), 1);
    assert_eq!(run.series.latest().unwrap().temperature, Some(21.0));
    assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
}

#[tokio::test]
async fn http_error_status_goes_offline() {
    let dir = tempfile::tempdir().unwrap();
    let mut fetcher = MockFetcher::new();
    fetcher
        .expect_fetch_page()
        .returning(|_| Err(FetchError::Status(503)));

    let run = service(fetcher, dir.path())
        .run_station(&station(), datetime!(2024-10-01 12:00:00 -3))
        .await
        .unwrap();

    assert_eq!(run.status, StationStatus::Offline);
    assert!(run.series.is_empty());
    assert!(!SeriesStore::for_station(dir.path(), BUTANTA).path().exists());
}

/// A page without a temperature appends nothing.
#[tokio::test]
async fn page_without_temperature_goes_offline() {
    let dir = tempfile::tempdir().unwrap();
    let html = "<table><tr><td>Umidade</td><td>Atual: 70,0%</td></tr></table>".to_string();

    let run = service(serving(html), dir.path())
        .run_station(&station(), datetime!(2024-10-01 12:00:00 -3))
        .await
        .unwrap();

    assert_eq!(run.status, StationStatus::Offline);
    assert_eq!(run.reading.humidity_pct, Some(70.0));
    assert_eq!(run.reading.rain_mm, Some(0.0));
    assert!(run.series.is_empty());
}

/// Running twice for the same instant records one row.
#[tokio::test]
async fn repeated_instant_is_a_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    let now = datetime!(2024-10-01 12:00:00 -3);
    let service = service(serving(station_page("20,0", "50,0")), dir.path());

    let first = service.run_station(&station(), now).await.unwrap();
    let second = service.run_station(&station(), now).await.unwrap();

    assert_eq!(first.status, StationStatus::Online);
    assert_eq!(second.status, StationStatus::Offline);
    assert_eq!(second.series, first.series);
}

#[tokio::test]
async fn corrupt_series_file_starts_over() {
    let dir = tempfile::tempdir().unwrap();
    let store = SeriesStore::for_station(dir.path(), BUTANTA);
    std::fs::write(store.path(), "Timestamp,Temperature\nnot a date,hot\n").unwrap();

    let run = service(serving(station_page("22,0", "55,0")), dir.path())
        .run_station(&station(), datetime!(2024-10-01 12:00:00 -3))
        .await
        .unwrap();

    assert_eq!(run.status, StationStatus::Online);
    assert_eq!(run.series.len(), 1);
    assert_eq!(store.load().unwrap().series, run.series);
}

#[tokio::test]
async fn unwritable_data_dir_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("data");
    std::fs::write(&blocker, "not a directory").unwrap();

    let result = service(serving(station_page("20,0", "50,0")), &blocker)
        .run_station(&station(), datetime!(2024-10-01 12:00:00 -3))
        .await;

    assert!(matches!(result, Err(StorageError::Write(_, _))));
}

/// Every station shares the instant; readings accumulate hour by hour.
#[tokio::test]
async fn hourly_runs_keep_a_rolling_window() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(serving(station_page("20,0", "50,0")), dir.path());
    let stations = collector::resolve(&[BUTANTA, 504], false);
    let start = datetime!(2024-10-01 00:00:00 -3);

    let mut runs = Vec::new();
    for hour in 0..30 {
        runs = service
            .run_all(&stations, start + Duration::hours(hour))
            .await
            .unwrap();
    }

    assert_eq!(runs.len(), 2);
    for run in &runs {
        assert_eq!(run.status, StationStatus::Online);
        // 24h window inclusive of both ends
        assert_eq!(run.series.len(), 25);
        assert_eq!(run.series.latest().unwrap().timestamp, start + Duration::hours(29));
    }
}
