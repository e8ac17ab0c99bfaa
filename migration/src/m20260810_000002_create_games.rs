use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Games::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Games::Id).big_integer().not_null().primary_key(),
          )
          .col(ColumnDef::new(Games::Name).string().null())
          .col(ColumnDef::new(Games::ImageUrl).string().null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Games::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Games {
  Table,
  Id,
  Name,
  ImageUrl,
}
