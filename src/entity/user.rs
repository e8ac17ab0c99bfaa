//! User entity - a tracked BGG account

use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub username: String,
  pub is_active: bool,
  /// Null until the first full scan has completed.
  pub last_full_scan: Option<NaiveDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::play::Entity")]
  Plays,
}

impl Related<super::play::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Plays.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
