use std::{env, sync::Arc};

use migration::Migrator;
use tokio::sync::Mutex;

use crate::{bgg::BggClient, prelude::*, sv};

/// One lock per user id. Scans serialize per user, never across users.
pub type ScanLocks = DashMap<i32, Arc<Mutex<()>>>;

#[derive(Debug, Clone)]
pub struct Config {
  pub bgg_token: String,
  /// Uppercased; play locations compare case-insensitively against it.
  pub location: String,
  /// Plays before this date never enter the store.
  pub start_date: NaiveDate,
  pub rescan_days: i64,
  pub api_base: String,
  pub request_timeout: Duration,
  pub not_ready_delay: Duration,
  pub not_ready_retries: u32,
  pub sync_interval: Duration,
  pub database_url: String,
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let bgg_token = required("BGG_TOKEN")?;
    let location = required("GAME_LOCATION")?.to_uppercase();

    let start_year = required("START_YEAR")?
      .parse()
      .context("START_YEAR must be a four digit year")?;
    let start_date = NaiveDate::from_ymd_opt(start_year, 1, 1)
      .context("START_YEAR is out of range")?;

    Ok(Self {
      bgg_token,
      location,
      start_date,
      rescan_days: parsed("RESCAN_DAYS", 14)?,
      api_base: env::var("BGG_API_BASE")
        .unwrap_or_else(|_| "https://boardgamegeek.com/xmlapi2".into()),
      request_timeout: Duration::from_secs(parsed("REQUEST_TIMEOUT_SECS", 20)?),
      not_ready_delay: Duration::from_millis(parsed(
        "NOT_READY_DELAY_MS",
        2000,
      )?),
      not_ready_retries: parsed("NOT_READY_RETRIES", 6)?,
      sync_interval: Duration::from_secs(parsed("SYNC_INTERVAL_SECS", 21600)?),
      database_url: env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:tabletrack.db?mode=rwc".into()),
    })
  }
}

fn required(key: &str) -> anyhow::Result<String> {
  env::var(key).with_context(|| format!("{key} is not set"))
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
  T::Err: std::error::Error + Send + Sync + 'static,
{
  match env::var(key) {
    Ok(raw) => raw
      .parse()
      .with_context(|| format!("{key} must be a number, got `{raw}`")),
    Err(_) => Ok(default),
  }
}

pub struct Services<'a> {
  pub user: sv::User<'a>,
  pub game: sv::Game<'a>,
  pub sync: sv::Sync<'a>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub bgg: BggClient,
  pub config: Config,
  scan_locks: ScanLocks,
}

impl AppState {
  pub async fn new(config: Config) -> Self {
    info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
      .await
      .expect("Failed to connect to database");

    info!("Running migrations...");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    let bgg = BggClient::new(&config).expect("Failed to build HTTP client");

    Self { db, bgg, config, scan_locks: ScanLocks::new() }
  }

  pub fn sv(&self) -> Services<'_> {
    Services {
      user: sv::User::new(&self.db),
      game: sv::Game::new(&self.db, &self.bgg),
      sync: sv::Sync::new(&self.db, &self.bgg, &self.config, &self.scan_locks),
    }
  }
}
