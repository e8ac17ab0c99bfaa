//! Play tracker - keeps a local store of board-game plays in sync
//! with the BGG play history API.
//!
//! Architecture:
//! - SeaORM for database access (SQLite)
//! - Axum for the HTTP trigger API
//! - Plugin supervisor running the server and the sync sweeper
//! - Tokio for async runtime

mod bgg;
mod entity;
mod error;
mod plugins;
mod prelude;
mod state;
mod sv;

use std::sync::Arc;

use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{
  prelude::*,
  state::{AppState, Config},
};

#[tokio::main]
async fn main() {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "tabletrack=debug,tower_http=debug,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::from_env().expect("Invalid configuration");

  info!("Starting play tracker v{}", env!("CARGO_PKG_VERSION"));
  info!("Tracking plays at `{}`", config.location);

  let app = Arc::new(AppState::new(config).await);

  plugins::App::new()
    .register(plugins::server::Plugin)
    .register(plugins::cron::SyncSweep)
    .run(app)
    .await;

  tokio::signal::ctrl_c().await.expect("Failed to listen for shutdown");
  info!("Shutting down");
}
