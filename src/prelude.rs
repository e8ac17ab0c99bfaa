pub use std::{collections::HashSet, time::Duration};

pub use anyhow::Context;
pub use chrono::{NaiveDate, TimeDelta, Utc};
pub use dashmap::DashMap;
pub use migration::MigratorTrait;
pub use sea_orm::{
  ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection,
  EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
  TransactionTrait,
};
pub use tokio::time;
pub use tracing::{error, info, warn};

pub use crate::error::{Error, Result};
