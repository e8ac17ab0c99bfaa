pub mod cron;
pub mod server;

use std::{sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::state::AppState;

const RESTART_DELAY: Duration = Duration::from_secs(5);

#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
  fn name(&self) -> &'static str {
    std::any::type_name::<Self>()
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()>;
}

/// Keeps every registered plugin alive: one that returns or crashes
/// comes back after a short pause, a cancelled one stays down.
pub struct App {
  plugins: Vec<Arc<dyn Plugin>>,
}

impl App {
  pub fn new() -> Self {
    Self { plugins: Vec::new() }
  }

  pub fn register<P: Plugin + 'static>(mut self, plugin: P) -> Self {
    self.plugins.push(Arc::new(plugin));
    self
  }

  pub async fn run(self, app: Arc<AppState>) {
    for plugin in self.plugins {
      let app = app.clone();

      tokio::spawn(async move {
        let name = plugin.name();
        info!("Service `{name}` starting");

        loop {
          let handle = tokio::spawn({
            let app = app.clone();
            let plugin = plugin.clone();
            async move { plugin.start(app).await }
          });

          match handle.await {
            Ok(Ok(())) => warn!("Service `{name}` returned unexpectedly"),
            Ok(Err(err)) => error!("Service `{name}` failed: {err:#}"),
            Err(join) if join.is_cancelled() => {
              info!("Service `{name}` shut down");
              break;
            }
            Err(_) => error!("Service `{name}` panicked"),
          }

          sleep(RESTART_DELAY).await;
          info!("Restarting service `{name}`");
        }
      });
    }
  }
}
