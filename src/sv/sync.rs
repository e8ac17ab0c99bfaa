//! Pulls play history from BGG and reconciles it into the local store.
//!
//! Only plays logged at the configured location are kept. The remote
//! history is the source of truth: plays that moved away or vanished
//! upstream are deleted here, bounded by the scan window so ancient
//! history is never touched by an incremental pass.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
  bgg::{BggClient, PlayRow},
  entity::{play, user},
  prelude::*,
  state::{Config, ScanLocks},
  sv,
};

/// Full replays history back to the epoch start and replaces the
/// stored set wholesale. Incremental only reconciles the recent
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
  Full,
  Incremental,
}

impl ScanMode {
  pub fn for_user(user: &user::Model) -> Self {
    match user.last_full_scan {
      Some(_) => Self::Incremental,
      None => Self::Full,
    }
  }

  /// Oldest play date this scan still cares about.
  pub fn cutoff(self, config: &Config) -> NaiveDate {
    match self {
      Self::Full => config.start_date,
      Self::Incremental => {
        Utc::now().date_naive() - TimeDelta::days(config.rescan_days)
      }
    }
  }
}

#[derive(Debug, Default, PartialEq)]
pub struct Reconciled {
  pub added: u64,
  pub updated: u64,
  pub deleted: u64,
}

#[derive(Debug)]
pub struct SweepSummary {
  pub synced: u64,
  pub failed: u64,
}

pub struct Sync<'a> {
  db: &'a DatabaseConnection,
  bgg: &'a BggClient,
  config: &'a Config,
  locks: &'a ScanLocks,
}

impl<'a> Sync<'a> {
  pub fn new(
    db: &'a DatabaseConnection,
    bgg: &'a BggClient,
    config: &'a Config,
    locks: &'a ScanLocks,
  ) -> Self {
    Self { db, bgg, config, locks }
  }

  /// Walks `username`'s history newest first and returns every play
  /// dated on or after `cutoff`. Remote failures end the walk early
  /// and whatever accumulated so far is returned, so one bad page
  /// degrades a scan instead of aborting it.
  pub async fn fetch_plays(
    &self,
    username: &str,
    cutoff: NaiveDate,
  ) -> Vec<PlayRow> {
    let mut plays = Vec::new();

    for page in 1u32.. {
      let rows = match self.bgg.plays_page(username, page).await {
        Ok(rows) => rows,
        Err(err) => {
          warn!("Fetch for {username} stopped on page {page}: {err}");
          break;
        }
      };

      let Some(newest) = rows.first() else { break };
      if newest.date < self.config.start_date {
        break;
      }

      for row in rows {
        if row.date < cutoff {
          return plays;
        }
        plays.push(row);
      }
    }

    plays
  }

  /// One reconciliation pass for `user_id`. Runs in a single
  /// transaction: either the whole batch lands or none of it.
  pub async fn reconcile(
    &self,
    user_id: i32,
    records: &[PlayRow],
    cutoff: NaiveDate,
  ) -> Result<Reconciled> {
    let txn = self.db.begin().await?;
    let stats = self.apply_records(&txn, user_id, records, cutoff).await?;
    txn.commit().await?;
    Ok(stats)
  }

  async fn apply_records<C: ConnectionTrait>(
    &self,
    conn: &C,
    user_id: i32,
    records: &[PlayRow],
    cutoff: NaiveDate,
  ) -> Result<Reconciled> {
    let mut stats = Reconciled::default();
    let mut seen = HashSet::new();

    for row in records {
      seen.insert(row.id);

      let stored = play::Entity::find_by_id(row.id).one(conn).await?;
      let at_target = row.location == self.config.location;

      match stored {
        // moved away from the tracked location
        Some(model) if !at_target => {
          model.delete(conn).await?;
          stats.deleted += 1;
        }
        Some(model)
          if model.game_id != row.game_id
            || model.play_date != row.date
            || model.user_id != user_id =>
        {
          if model.game_id != row.game_id {
            sv::game::ensure(conn, self.bgg, row.game_id).await?;
          }
          play::ActiveModel {
            game_id: Set(row.game_id),
            play_date: Set(row.date),
            user_id: Set(user_id),
            ..model.into()
          }
          .update(conn)
          .await?;
          stats.updated += 1;
        }
        Some(_) => {}
        None if at_target => {
          sv::game::ensure(conn, self.bgg, row.game_id).await?;
          play::ActiveModel {
            id: Set(row.id),
            game_id: Set(row.game_id),
            play_date: Set(row.date),
            user_id: Set(user_id),
          }
          .insert(conn)
          .await?;
          stats.added += 1;
        }
        None => {}
      }
    }

    // An empty batch is indistinguishable from a failed fetch, so it
    // never triggers deletions.
    if records.is_empty() {
      return Ok(stats);
    }

    let stored = play::Entity::find()
      .filter(play::Column::UserId.eq(user_id))
      .filter(play::Column::PlayDate.gte(cutoff))
      .all(conn)
      .await?;

    for model in stored {
      if !seen.contains(&model.id) {
        model.delete(conn).await?;
        stats.deleted += 1;
      }
    }

    Ok(stats)
  }

  async fn replace_history(
    &self,
    user_id: i32,
    records: &[PlayRow],
  ) -> Result<Reconciled> {
    let txn = self.db.begin().await?;

    play::Entity::delete_many()
      .filter(play::Column::UserId.eq(user_id))
      .exec(&txn)
      .await?;

    let stats = self
      .apply_records(&txn, user_id, records, self.config.start_date)
      .await?;

    txn.commit().await?;
    Ok(stats)
  }

  /// Rebuilds one user's history from scratch and moves the full-scan
  /// watermark.
  pub async fn full_scan(&self, user: &user::Model) -> Result<Reconciled> {
    let lock = self.lock_for(user.id);
    let _guard = lock.lock().await;

    info!("Full scan for {}", user.username);
    let records =
      self.fetch_plays(&user.username, self.config.start_date).await;
    let stats = self.replace_history(user.id, &records).await?;

    sv::User::new(self.db).stamp_full_scan(user.id).await?;

    info!(
      "Full scan for {} done: {} added, {} updated, {} deleted",
      user.username, stats.added, stats.updated, stats.deleted
    );
    Ok(stats)
  }

  /// Scheduled entry point: full scan until the user has completed
  /// one, incremental afterwards.
  pub async fn sync_user(&self, user: &user::Model) -> Result<Reconciled> {
    match ScanMode::for_user(user) {
      ScanMode::Full => self.full_scan(user).await,
      ScanMode::Incremental => {
        let lock = self.lock_for(user.id);
        let _guard = lock.lock().await;

        let cutoff = ScanMode::Incremental.cutoff(self.config);
        let records = self.fetch_plays(&user.username, cutoff).await;
        let stats = self.reconcile(user.id, &records, cutoff).await?;

        info!(
          "Incremental scan for {}: {} added, {} updated, {} deleted",
          user.username, stats.added, stats.updated, stats.deleted
        );
        Ok(stats)
      }
    }
  }

  /// One pass over every active user. Per-user failures are logged
  /// and counted, never propagated, so one broken account cannot
  /// stall the rest of the sweep.
  pub async fn sweep(&self) -> Result<SweepSummary> {
    let users = sv::User::new(self.db).active().await?;
    let mut summary = SweepSummary { synced: 0, failed: 0 };

    for user in users {
      match self.sync_user(&user).await {
        Ok(_) => summary.synced += 1,
        Err(err) => {
          error!("Sync failed for {}: {err}", user.username);
          summary.failed += 1;
        }
      }
    }

    Ok(summary)
  }

  fn lock_for(&self, user_id: i32) -> Arc<Mutex<()>> {
    self.locks.entry(user_id).or_default().clone()
  }
}
