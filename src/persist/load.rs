use crate::config::Config;
use crate::sim::game::{Game, PlayerSave, SystemSave};
use anyhow::Result;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use super::{PLAYER_KEY, SYSTEM_KEY, Storage};

/// Loads whatever save exists. Unreadable or corrupt data is logged and
/// treated as absent, so the worst case is a fresh game.
pub fn load_game(storage: &Storage, config: Config) -> (Game, bool) {
    let player: Option<PlayerSave> = read_key(storage, PLAYER_KEY);
    let system: Option<SystemSave> = read_key(storage, SYSTEM_KEY);
    if player.is_none() && system.is_none() {
        info!("no save found, starting fresh");
        return (Game::fresh(config), false);
    }
    (Game::restore(config, player, system), true)
}

fn read_key<T: DeserializeOwned>(storage: &Storage, key: &str) -> Option<T> {
    match decode(storage, key) {
        Ok(value) => value,
        Err(err) => {
            warn!(key, "discarding unreadable save data: {err:#}");
            None
        }
    }
}

fn decode<T: DeserializeOwned>(storage: &Storage, key: &str) -> Result<Option<T>> {
    match storage.read(key)? {
        Some(content) => Ok(Some(ron::from_str(&content)?)),
        None => Ok(None),
    }
}
