use std::{sync::Arc, time::Instant};

use async_trait::async_trait;

use crate::{plugins::Plugin, prelude::*, state::AppState};

/// Periodic sweep over every active user, full or incremental per
/// user. Runs forever; the supervisor restarts it if it dies.
pub struct SyncSweep;

#[async_trait]
impl Plugin for SyncSweep {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    time::sleep(Duration::from_secs(10)).await;

    loop {
      info!("Starting scheduled play sync...");
      let started = Instant::now();

      match app.sv().sync.sweep().await {
        Ok(summary) => {
          let took = Duration::from_secs(started.elapsed().as_secs());
          info!(
            "Sweep finished in {}: {} synced, {} failed",
            humantime::format_duration(took),
            summary.synced,
            summary.failed
          );
        }
        Err(err) => error!("Sweep failed: {err}"),
      }

      time::sleep(app.config.sync_interval).await;
    }
  }
}
