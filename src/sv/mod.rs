pub mod game;
pub mod sync;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

pub use game::Game;
pub use sync::Sync;
pub use user::User;
