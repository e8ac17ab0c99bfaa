use sea_orm_migration::prelude::*;

use super::m20260810_000001_create_users::Users;
use super::m20260810_000002_create_games::Games;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Plays::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Plays::Id).big_integer().not_null().primary_key(),
          )
          .col(ColumnDef::new(Plays::GameId).big_integer().not_null())
          .col(ColumnDef::new(Plays::PlayDate).date().not_null())
          .col(ColumnDef::new(Plays::UserId).integer().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_plays_game")
              .from(Plays::Table, Plays::GameId)
              .to(Games::Table, Games::Id),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_plays_user")
              .from(Plays::Table, Plays::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    // The reconciler's deletion pass range-scans (user_id, play_date).
    manager
      .create_index(
        Index::create()
          .name("idx_plays_user_date")
          .table(Plays::Table)
          .col(Plays::UserId)
          .col(Plays::PlayDate)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Plays::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Plays {
  Table,
  Id,
  GameId,
  PlayDate,
  UserId,
}
