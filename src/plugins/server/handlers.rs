use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};

use crate::{prelude::*, state::AppState};

pub async fn health() -> &'static str {
  "OK"
}

/// Runs a sweep over every active user and reports the tally.
pub async fn sync_all(
  State(app): State<Arc<AppState>>,
) -> Result<Json<json::Value>> {
  let summary = app.sv().sync.sweep().await?;

  Ok(Json(json::json!({
    "status": "sync complete",
    "synced": summary.synced,
    "failed": summary.failed,
  })))
}

/// Forces a from-scratch rebuild of one user's history.
pub async fn full_scan(
  State(app): State<Arc<AppState>>,
  Path(username): Path<String>,
) -> Result<Json<json::Value>> {
  let user = app
    .sv()
    .user
    .by_username(&username)
    .await?
    .filter(|user| user.is_active)
    .ok_or(Error::UserNotFound)?;

  let stats = app.sv().sync.full_scan(&user).await?;

  Ok(Json(json::json!({
    "status": "full scan complete",
    "user": username,
    "plays": stats.added,
  })))
}

pub async fn fix_images(
  State(app): State<Arc<AppState>>,
) -> Result<Json<json::Value>> {
  let fixed = app.sv().game.backfill_images().await?;
  Ok(Json(json::json!({ "fixed": fixed })))
}
