use crate::{entity::user, prelude::*};

pub struct User<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> User<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn active(&self) -> Result<Vec<user::Model>> {
    let users = user::Entity::find()
      .filter(user::Column::IsActive.eq(true))
      .order_by_asc(user::Column::Username)
      .all(self.db)
      .await?;
    Ok(users)
  }

  pub async fn by_username(
    &self,
    username: &str,
  ) -> Result<Option<user::Model>> {
    let user = user::Entity::find()
      .filter(user::Column::Username.eq(username))
      .one(self.db)
      .await?;
    Ok(user)
  }

  /// Moves the full-scan watermark to now.
  pub async fn stamp_full_scan(&self, id: i32) -> Result<()> {
    let user = user::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;

    user::ActiveModel {
      last_full_scan: Set(Some(Utc::now().naive_utc())),
      ..user.into()
    }
    .update(self.db)
    .await?;

    Ok(())
  }
}
