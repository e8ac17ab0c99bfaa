//! Database fixtures shared by the service tests.

use sea_orm::{DbBackend, Schema};

use crate::{
  bgg::PlayRow,
  entity::{game, play, user},
  prelude::*,
};

pub async fn setup_test_db() -> DatabaseConnection {
  let db = Database::connect("sqlite::memory:").await.unwrap();

  let schema = Schema::new(DbBackend::Sqlite);

  let stmt = schema.create_table_from_entity(user::Entity);
  db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

  let stmt = schema.create_table_from_entity(game::Entity);
  db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

  let stmt = schema.create_table_from_entity(play::Entity);
  db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

  db
}

pub async fn seed_user(
  db: &DatabaseConnection,
  username: &str,
  active: bool,
) -> user::Model {
  user::ActiveModel {
    username: Set(username.to_owned()),
    is_active: Set(active),
    ..Default::default()
  }
  .insert(db)
  .await
  .unwrap()
}

pub async fn seed_game(
  db: &DatabaseConnection,
  id: i64,
  name: &str,
  image: Option<&str>,
) -> game::Model {
  game::ActiveModel {
    id: Set(id),
    name: Set(Some(name.to_owned())),
    image_url: Set(image.map(Into::into)),
  }
  .insert(db)
  .await
  .unwrap()
}

pub async fn seed_play(
  db: &DatabaseConnection,
  id: i64,
  game_id: i64,
  date: NaiveDate,
  user_id: i32,
) -> play::Model {
  play::ActiveModel {
    id: Set(id),
    game_id: Set(game_id),
    play_date: Set(date),
    user_id: Set(user_id),
  }
  .insert(db)
  .await
  .unwrap()
}

pub fn row(id: i64, game_id: i64, date: NaiveDate, location: &str) -> PlayRow {
  PlayRow { id, game_id, date, location: location.to_owned() }
}

pub fn d(s: &str) -> NaiveDate {
  s.parse().unwrap()
}

pub fn days_ago(n: i64) -> NaiveDate {
  Utc::now().date_naive() - TimeDelta::days(n)
}
