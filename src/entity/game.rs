//! Game entity - catalog metadata resolved lazily from BGG

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "games")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: i64,
  pub name: Option<String>,
  pub image_url: Option<String>,
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
