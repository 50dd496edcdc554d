pub mod center_card;
pub mod config;
pub mod game;
pub mod player;
pub mod role;
pub mod roster;
