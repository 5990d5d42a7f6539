pub mod achievements;
pub mod assets;
pub mod catalog;
pub mod clock;
pub mod economy;
pub mod game;
pub mod leaderboard;
pub mod market;
pub mod news;
pub mod player;
pub mod property;
