use sea_orm::Condition;

use crate::{bgg::BggClient, entity::game, prelude::*};

pub struct Game<'a> {
  db: &'a DatabaseConnection,
  bgg: &'a BggClient,
}

impl<'a> Game<'a> {
  pub fn new(db: &'a DatabaseConnection, bgg: &'a BggClient) -> Self {
    Self { db, bgg }
  }

  /// Re-resolves games whose image never came back. Returns how many
  /// were fixed.
  pub async fn backfill_images(&self) -> Result<u64> {
    let missing = game::Entity::find()
      .filter(
        Condition::any()
          .add(game::Column::ImageUrl.is_null())
          .add(game::Column::ImageUrl.eq("")),
      )
      .all(self.db)
      .await?;

    let mut fixed = 0;
    for model in missing {
      let id = model.id;
      let info = self.bgg.game_info(id).await;
      let Some(image_url) = info.image_url else { continue };

      game::ActiveModel { image_url: Set(Some(image_url)), ..model.into() }
        .update(self.db)
        .await?;

      info!("Backfilled image for game {id}");
      fixed += 1;
    }

    Ok(fixed)
  }
}

/// Inserts the game row if it is not stored yet, resolving metadata
/// remotely. Generic over the connection so reconciliation can run it
/// inside its transaction, before the play that references the game.
pub async fn ensure<C: ConnectionTrait>(
  conn: &C,
  bgg: &BggClient,
  game_id: i64,
) -> Result<()> {
  if game::Entity::find_by_id(game_id).one(conn).await?.is_some() {
    return Ok(());
  }

  info!("Fetching metadata for new game {game_id}");
  let info = bgg.game_info(game_id).await;

  game::ActiveModel {
    id: Set(game_id),
    name: Set(info.name),
    image_url: Set(info.image_url),
  }
  .insert(conn)
  .await?;

  Ok(())
}
