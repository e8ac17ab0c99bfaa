pub mod game;
pub mod play;
pub mod user;
