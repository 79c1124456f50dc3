use std::sync::Arc;

use anyhow::{anyhow, Context};
use cge_monitor_core::ensure_dir_exists;
use collector::{
    get_config_info, observation_time,
    render::{write_station_map, write_status_page},
    resolve, setup_logger, CollectionSettings, FieldExtractor, HtmlFetcher, RateLimiter,
    StationService,
};
use slog::{error, info};
use tokio::sync::Mutex;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let (cli, source) = get_config_info()?;
    let logger = setup_logger(&cli);

    info!(logger, "CGE collector starting...");
    info!(logger, "  Config: {}", source);
    info!(logger, "  Data dir: {}", cli.data_dir().display());
    info!(logger, "  Output dir: {}", cli.output_dir().display());

    let offset = cli.utc_offset()?;
    let stations = resolve(&cli.stations(), cli.all_stations());
    info!(logger, "  Stations: {}", stations.len());

    let rate_limiter = Arc::new(Mutex::new(RateLimiter::new(
        cli.token_capacity(),
        cli.refill_rate(),
    )));
    let fetcher = Arc::new(HtmlFetcher::new(
        logger.clone(),
        &cli.user_agent(),
        cli.fetch_timeout(),
        cli.max_retries(),
        rate_limiter,
    )?);

    let data_dir = cli.data_dir();
    ensure_dir_exists(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;

    let service = StationService::new(
        logger.clone(),
        fetcher,
        FieldExtractor::new()?,
        CollectionSettings {
            url_template: cli.url_template(),
            data_dir,
            retention: cli.retention(),
        },
    );

    // one instant for every station of this run
    let now = observation_time(offset);
    let runs = service.run_all(&stations, now).await?;

    let output_dir = cli.output_dir();
    let mut failed = 0;
    for run in &runs {
        match write_status_page(&output_dir, run) {
            Ok(path) => info!(logger, "wrote {}", path.display()),
            Err(err) => {
                error!(logger, "{}", err);
                failed += 1;
            }
        }
    }
    match write_station_map(&output_dir, &runs, now) {
        Ok(path) => info!(logger, "wrote {}", path.display()),
        Err(err) => {
            error!(logger, "{}", err);
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(anyhow!("{} page(s) could not be written", failed));
    }
    info!(logger, "Finished processing {} station(s)", runs.len());
    Ok(())
}
