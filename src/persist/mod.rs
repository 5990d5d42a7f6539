mod load;
mod queue;
mod save;
mod storage;

pub use load::load_game;
pub use queue::SaveQueue;
pub use save::{encode, save_game};
pub use storage::Storage;

pub const PLAYER_KEY: &str = "player";
pub const SYSTEM_KEY: &str = "system";
