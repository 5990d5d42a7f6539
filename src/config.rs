use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.ron";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub price_update_interval_ms: u64,
    pub listing_refresh_interval_ms: u64,
    pub news_interval_ms: u64,
    pub trade_lock_ms: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            price_update_interval_ms: 60 * 1000,
            listing_refresh_interval_ms: 5 * 60 * 1000,
            news_interval_ms: 8 * 60 * 1000,
            trade_lock_ms: 5 * 60 * 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub player_name: String,
    pub starting_cash: u64,
    pub snapshot_interval_ms: u64,
    pub save_dir: PathBuf,
    /// Minimum wall-clock gap between two writes of the save files.
    pub save_debounce_ms: u64,
    pub autosave_interval_ms: u64,
    pub log_file: PathBuf,
    pub market: MarketConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            player_name: "You".to_string(),
            starting_cash: 10_000_000_000,
            snapshot_interval_ms: 60 * 1000,
            save_dir: PathBuf::from("save"),
            save_debounce_ms: 5 * 1000,
            autosave_interval_ms: 30 * 1000,
            log_file: PathBuf::from("tycoon.log"),
            market: MarketConfig::default(),
        }
    }
}

pub fn load_config() -> Result<Config> {
    load_config_from(Path::new(CONFIG_FILE))
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(ron::from_str(&content)?),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(Config::default()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("spend-ten-billion-no-such-config.ron");
        let config = load_config_from(&path).expect("defaults");
        assert_eq!(config.starting_cash, 10_000_000_000);
        assert_eq!(config.market.trade_lock_ms, 300_000);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: Config =
            ron::from_str("(starting_cash: 500, market: (news_interval_ms: 1000))").expect("parse");
        assert_eq!(config.starting_cash, 500);
        assert_eq!(config.market.news_interval_ms, 1_000);
        assert_eq!(config.market.price_update_interval_ms, 60_000);
        assert_eq!(config.save_dir, PathBuf::from("save"));
    }
}
