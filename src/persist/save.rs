use crate::sim::game::Game;
use anyhow::Result;
use ron::ser::PrettyConfig;
use serde::Serialize;
use tracing::{error, info};

use super::{PLAYER_KEY, SYSTEM_KEY, Storage};

pub fn encode<T: Serialize>(value: &T) -> Result<String> {
    let pretty = PrettyConfig::new();
    Ok(ron::ser::to_string_pretty(value, pretty)?)
}

/// Writes both halves of the save immediately. Failures are logged and
/// reported through the return value, never raised.
pub fn save_game(storage: &Storage, game: &Game) -> bool {
    let result = encode(&game.player_save())
        .and_then(|player| storage.write(PLAYER_KEY, &player))
        .and_then(|_| encode(&game.system_save()))
        .and_then(|system| storage.write(SYSTEM_KEY, &system));
    match result {
        Ok(()) => {
            info!(dir = %storage.dir().display(), "game saved");
            true
        }
        Err(err) => {
            error!("saving game failed: {err:#}");
            false
        }
    }
}
