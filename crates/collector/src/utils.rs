use std::{
    env,
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use cge_monitor_core::{
    find_config_file, load_config, ConfigSource, DEFAULT_FETCH_TIMEOUT, DEFAULT_RETENTION_HOURS,
    DEFAULT_STATION, DEFAULT_URL_TEMPLATE, DEFAULT_UTC_OFFSET,
};
use clap::Parser;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use slog::{debug, o, Drain, Level, Logger};
use time::{macros::format_description, UtcOffset};
use tokio::sync::Mutex;

#[derive(Parser, Clone, Debug, serde::Deserialize, Default)]
#[command(
    author,
    version,
    about = "CGE station collector - scrapes station pages, keeps a rolling series per station and renders status pages"
)]
pub struct Cli {
    /// Path to config file (TOML format)
    /// Searched in order: this flag, $CGE_MONITOR_CONFIG, ./collector.toml,
    /// $XDG_CONFIG_HOME/cge-monitor/collector.toml, /etc/cge-monitor/collector.toml
    #[arg(short, long)]
    #[serde(skip)]
    pub config: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long, env = "CGE_MONITOR_LEVEL")]
    pub level: Option<String>,

    /// Directory holding one series file per station
    #[arg(short, long, env = "CGE_MONITOR_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Directory rendered pages are written to
    #[arg(short, long, env = "CGE_MONITOR_OUTPUT_DIR")]
    pub output_dir: Option<String>,

    /// Station ids to process, comma separated
    #[arg(short, long, env = "CGE_MONITOR_STATIONS", value_delimiter = ',')]
    pub stations: Option<Vec<u32>>,

    /// Process every station of the built-in registry
    #[arg(long, env = "CGE_MONITOR_ALL_STATIONS", num_args = 0..=1, default_missing_value = "true")]
    pub all_stations: Option<bool>,

    /// Station page URL, `{station}` is replaced by the station id
    #[arg(long, env = "CGE_MONITOR_URL_TEMPLATE")]
    pub url_template: Option<String>,

    /// Hours of observations kept in each series
    #[arg(long, env = "CGE_MONITOR_RETENTION_HOURS")]
    pub retention_hours: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, env = "CGE_MONITOR_FETCH_TIMEOUT")]
    pub fetch_timeout: Option<u64>,

    /// Retries for transient HTTP failures
    #[arg(long, env = "CGE_MONITOR_MAX_RETRIES")]
    pub max_retries: Option<u32>,

    /// Rate limiter refill rate in requests per second
    #[arg(long, env = "CGE_MONITOR_REFILL_RATE")]
    pub refill_rate: Option<f64>,

    /// Rate limiter burst capacity
    #[arg(long, env = "CGE_MONITOR_TOKEN_CAPACITY")]
    pub token_capacity: Option<usize>,

    /// HTTP User-Agent header
    #[arg(long, env = "CGE_MONITOR_USER_AGENT")]
    pub user_agent: Option<String>,

    /// UTC offset readings are stamped with, e.g. -03:00
    #[arg(long, env = "CGE_MONITOR_UTC_OFFSET")]
    pub utc_offset: Option<String>,
}

impl Cli {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(self.data_dir.as_deref().unwrap_or("./data"))
    }

    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(self.output_dir.as_deref().unwrap_or("./output"))
    }

    pub fn stations(&self) -> Vec<u32> {
        self.stations
            .clone()
            .unwrap_or_else(|| vec![DEFAULT_STATION])
    }

    pub fn all_stations(&self) -> bool {
        self.all_stations.unwrap_or(false)
    }

    pub fn url_template(&self) -> String {
        self.url_template
            .clone()
            .unwrap_or_else(|| DEFAULT_URL_TEMPLATE.to_string())
    }

    pub fn retention(&self) -> time::Duration {
        // capped at ten years so `now - retention` stays representable
        let hours = self
            .retention_hours
            .unwrap_or(DEFAULT_RETENTION_HOURS)
            .min(24 * 365 * 10);
        time::Duration::hours(hours as i64)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout.unwrap_or(DEFAULT_FETCH_TIMEOUT).clamp(1, 60))
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(2)
    }

    pub fn refill_rate(&self) -> f64 {
        self.refill_rate.unwrap_or(1.0)
    }

    pub fn token_capacity(&self) -> usize {
        self.token_capacity.unwrap_or(3)
    }

    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("cge-monitor-collector/{}", env!("CARGO_PKG_VERSION")))
    }

    pub fn utc_offset(&self) -> Result<UtcOffset, anyhow::Error> {
        let text = self.utc_offset.as_deref().unwrap_or(DEFAULT_UTC_OFFSET);
        UtcOffset::parse(
            text,
            format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
        )
        .map_err(|e| anyhow!("invalid utc_offset {:?}: {}", text, e))
    }

    /// Values set here win over those in `file`.
    pub fn merge(self, file: Cli) -> Cli {
        Cli {
            config: self.config,
            level: self.level.or(file.level),
            data_dir: self.data_dir.or(file.data_dir),
            output_dir: self.output_dir.or(file.output_dir),
            stations: self.stations.or(file.stations),
            all_stations: self.all_stations.or(file.all_stations),
            url_template: self.url_template.or(file.url_template),
            retention_hours: self.retention_hours.or(file.retention_hours),
            fetch_timeout: self.fetch_timeout.or(file.fetch_timeout),
            max_retries: self.max_retries.or(file.max_retries),
            refill_rate: self.refill_rate.or(file.refill_rate),
            token_capacity: self.token_capacity.or(file.token_capacity),
            user_agent: self.user_agent.or(file.user_agent),
            utc_offset: self.utc_offset.or(file.utc_offset),
        }
    }
}

/// Load configuration from CLI args, config file, and environment
pub fn get_config_info() -> Result<(Cli, ConfigSource), anyhow::Error> {
    let cli_args = Cli::parse();

    let source = if let Some(ref path) = cli_args.config {
        ConfigSource::Explicit(path.into())
    } else {
        find_config_file("CGE_MONITOR_CONFIG", "collector.toml")
    };

    let file_config: Cli =
        load_config(&source).with_context(|| format!("loading config from {}", source))?;

    // env vars are handled by clap, so they already sit in cli_args
    Ok((cli_args.merge(file_config), source))
}

pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::Trace,
        "debug" => Level::Debug,
        "warn" | "warning" => Level::Warning,
        "error" => Level::Error,
        _ => Level::Info,
    }
}

pub fn setup_logger(cli: &Cli) -> Logger {
    let log_level = match cli.level.as_ref() {
        Some(level) => parse_level(level),
        None => parse_level(&env::var("RUST_LOG").unwrap_or_default()),
    };

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(log_level).fuse();
    slog::Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}

/// Token bucket shared by every request of a run.
pub struct RateLimiter {
    capacity: f64,
    tokens: f64,
    last_refill: Instant,
    /// tokens per second; zero or less disables waiting
    refill_rate: f64,
}

impl RateLimiter {
    pub fn new(capacity: usize, refill_rate: f64) -> Self {
        let capacity = capacity.max(1) as f64;
        RateLimiter {
            capacity,
            tokens: capacity,
            last_refill: Instant::now(),
            refill_rate,
        }
    }

    fn refill_tokens(&mut self) {
        let now = Instant::now();
        if self.refill_rate > 0.0 {
            let elapsed = now.duration_since(self.last_refill).as_secs_f64();
            self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        }
        self.last_refill = now;
    }

    pub fn try_acquire(&mut self) -> bool {
        self.refill_tokens();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    pub async fn acquire(&mut self) {
        while !self.try_acquire() {
            if self.refill_rate <= 0.0 {
                return;
            }
            let wait = ((1.0 - self.tokens) / self.refill_rate).clamp(0.01, 60.0);
            tokio::time::sleep(Duration::from_secs_f64(wait)).await;
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("error sending request: {0}")]
    Request(#[from] reqwest_middleware::Error),
    #[error("error response from request: HTTP {0}")]
    Status(u16),
    #[error("error reading body of request: {0}")]
    Body(#[source] reqwest::Error),
}

/// Source of raw station pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}

pub struct HtmlFetcher {
    logger: Logger,
    client: ClientWithMiddleware,
    rate_limiter: Arc<Mutex<RateLimiter>>,
}

impl HtmlFetcher {
    pub fn new(
        logger: Logger,
        user_agent: &str,
        timeout: Duration,
        max_retries: u32,
        rate_limiter: Arc<Mutex<RateLimiter>>,
    ) -> Result<HtmlFetcher, anyhow::Error> {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);
        let client = ClientBuilder::new(
            Client::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .build()?,
        )
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

        Ok(Self {
            logger,
            client,
            rate_limiter,
        })
    }
}

#[async_trait]
impl PageFetcher for HtmlFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.rate_limiter.lock().await.acquire().await;

        debug!(self.logger, "requesting: {}", url);
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }
        response.text().await.map_err(FetchError::Body)
    }
}
