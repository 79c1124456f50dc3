use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use collector::{CollectionSettings, FetchError, FieldExtractor, PageFetcher, StationService};
use mockall::mock;
use slog::{o, Discard, Logger};

pub const URL_TEMPLATE: &str = "http://cge.test/estacao.jsp?POSTO={station}";

mock! {
    pub Fetcher {}

    #[async_trait]
    impl PageFetcher for Fetcher {
        async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
    }
}

pub fn test_logger() -> Logger {
    Logger::root(Discard, o!())
}

/// Station page carrying only the temperature and humidity cells.
pub fn station_page(temperature: &str, humidity: &str) -> String {
    format!(
        r#"<html><body><table>
            <tr><td>Temperatura</td><td>Máx: 31,0 &deg;C<br>Atual: {temperature} &deg;C</td></tr>
            <tr><td>Umidade</td><td>Máx: 90,0%<br>Atual: {humidity}%</td></tr>
        </table></body></html>"#
    )
}

pub fn service(fetcher: MockFetcher, data_dir: &Path) -> StationService {
    StationService::new(
        test_logger(),
        Arc::new(fetcher),
        FieldExtractor::new().expect("patterns compile"),
        CollectionSettings {
            url_template: URL_TEMPLATE.to_string(),
            data_dir: data_dir.to_path_buf(),
            retention: time::Duration::hours(24),
        },
    )
}

pub fn serving(html: String) -> MockFetcher {
    let mut fetcher = MockFetcher::new();
    fetcher
        .expect_fetch_page()
        .returning(move |_| Ok(html.clone()));
    fetcher
}
