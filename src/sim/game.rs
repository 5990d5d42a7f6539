use super::achievements::{AchievementContext, AchievementTracker};
use super::assets::AssetTracker;
use super::clock::GameClock;
use super::economy;
use super::leaderboard::{self, RankEntry};
use super::market::{Market, MarketSave, PurchaseReceipt, RentReceipt, SaleReceipt, TradeError};
use super::player::Player;
use super::property::{Ownership, Property};
use crate::config::Config;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{info, warn};

const MAX_MESSAGES: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnedSave {
    pub id: String,
    pub purchase_price: u64,
    pub purchase_time: u64,
    pub last_rent_collection: u64,
    /// Display value at save time; recomputed on load.
    #[serde(default)]
    pub rent_progress: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSave {
    pub player: Player,
    #[serde(default)]
    pub owned: Vec<OwnedSave>,
    #[serde(default)]
    pub assets: AssetTracker,
    #[serde(default)]
    pub achievements: AchievementTracker,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemSave {
    pub clock: GameClock,
    pub market: MarketSave,
}

pub struct Game {
    pub config: Config,
    pub clock: GameClock,
    pub market: Market,
    pub player: Player,
    pub assets: AssetTracker,
    pub achievements: AchievementTracker,
    rng: StdRng,
    messages: VecDeque<String>,
    dirty: bool,
}

impl Game {
    pub fn fresh(config: Config) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_rng(config: Config, mut rng: StdRng) -> Self {
        let clock = GameClock::default();
        let market = Market::new(config.market.clone(), clock.now(), &mut rng);
        let player = Player::new(config.starting_cash);
        let mut game = Self {
            config,
            clock,
            market,
            player,
            assets: AssetTracker::default(),
            achievements: AchievementTracker::default(),
            rng,
            messages: VecDeque::with_capacity(MAX_MESSAGES),
            dirty: false,
        };
        game.sample_assets();
        game
    }

    /// Rebuilds a game from whatever halves of the save survived. Owned
    /// entries are re-linked to the pooled instance by id; unknown or
    /// duplicate ids are dropped.
    pub fn restore(config: Config, player: Option<PlayerSave>, system: Option<SystemSave>) -> Self {
        let mut rng = StdRng::from_entropy();
        let latest_player_time = player
            .as_ref()
            .and_then(|save| {
                save.owned
                    .iter()
                    .map(|owned| owned.purchase_time.max(owned.last_rent_collection))
                    .max()
            })
            .unwrap_or(0);

        let (clock, market) = match system {
            Some(system) => {
                let now = system.clock.now();
                let market = Market::restore(config.market.clone(), system.market, now, &mut rng);
                (system.clock, market)
            }
            None => {
                let clock = GameClock::starting_at(latest_player_time);
                let market = Market::new(config.market.clone(), clock.now(), &mut rng);
                (clock, market)
            }
        };
        let clock = if clock.now() < latest_player_time {
            GameClock::starting_at(latest_player_time)
        } else {
            clock
        };

        let mut game = Self {
            player: Player::new(config.starting_cash),
            config,
            clock,
            market,
            assets: AssetTracker::default(),
            achievements: AchievementTracker::default(),
            rng,
            messages: VecDeque::with_capacity(MAX_MESSAGES),
            dirty: false,
        };

        if let Some(save) = player {
            game.player = save.player;
            game.assets = save.assets;
            game.achievements = save.achievements;
            for owned in save.owned {
                let ownership = Ownership {
                    purchase_price: owned.purchase_price,
                    purchase_time: owned.purchase_time,
                    last_rent_collection: owned.last_rent_collection,
                };
                if !game.market.adopt(&owned.id, ownership) {
                    warn!(id = %owned.id, "saved property could not be re-linked");
                }
            }
        }
        game
    }

    pub fn player_save(&self) -> PlayerSave {
        let now = self.now();
        PlayerSave {
            player: self.player.clone(),
            owned: self
                .market
                .owned()
                .into_iter()
                .filter_map(|property| {
                    let ownership = property.ownership()?;
                    Some(OwnedSave {
                        id: property.id.clone(),
                        purchase_price: ownership.purchase_price,
                        purchase_time: ownership.purchase_time,
                        last_rent_collection: ownership.last_rent_collection,
                        rent_progress: economy::rent_progress(
                            property.monthly_rent,
                            ownership.last_rent_collection,
                            now,
                        ),
                    })
                })
                .collect(),
            assets: self.assets.clone(),
            achievements: self.achievements.clone(),
        }
    }

    pub fn system_save(&self) -> SystemSave {
        SystemSave {
            clock: self.clock.clone(),
            market: self.market.snapshot(),
        }
    }

    pub fn update(&mut self, delta: Duration) {
        if !self.clock.is_active() {
            return;
        }
        self.clock.advance(delta);
        let now = self.clock.now();

        let report = self.market.tick(now, &mut self.rng);
        for event in &report.published {
            self.push_message(format!("NEWS [{}] {}", event.district.code(), event.headline));
        }
        if report.listing_refreshed {
            self.push_message("Trading floor refreshed with new listings.".to_string());
        }
        if report.price_updates > 0 || report.listing_refreshed || !report.published.is_empty() {
            self.dirty = true;
        }

        self.sample_assets();
        self.check_achievements();
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    pub fn is_active(&self) -> bool {
        self.clock.is_active()
    }

    pub fn set_active(&mut self, active: bool) {
        self.clock.set_active(active);
        if active {
            self.push_message("Back in the game; the market is moving again.".to_string());
        } else {
            self.push_message("Game paused; prices and rent are frozen.".to_string());
        }
    }

    pub fn buy(&mut self, id: &str) -> Result<PurchaseReceipt, TradeError> {
        let now = self.now();
        let receipt = self.market.purchase(id, &mut self.player, now)?;
        self.player.record_purchase(&receipt);
        self.push_message(format!("Bought {} for {}.", receipt.id, receipt.price));
        self.after_trade();
        Ok(receipt)
    }

    pub fn sell(&mut self, id: &str) -> Result<SaleReceipt, TradeError> {
        let now = self.now();
        let receipt = self.market.sell(id, &mut self.player, now)?;
        self.player.record_sale(&receipt);
        self.push_message(format!(
            "Sold {} for {} ({:+}).",
            receipt.id, receipt.price, receipt.profit
        ));
        self.after_trade();
        Ok(receipt)
    }

    pub fn collect_rent(&mut self, id: &str) -> Result<RentReceipt, TradeError> {
        let now = self.now();
        let receipt = self.market.collect_rent(id, &mut self.player, now)?;
        self.player.record_rent(&receipt);
        self.push_message(format!("Collected {} rent from {}.", receipt.amount, receipt.id));
        self.after_trade();
        Ok(receipt)
    }

    /// Collects from every owned property with rent waiting.
    pub fn collect_all_rent(&mut self) -> u64 {
        let now = self.now();
        let ids: Vec<String> = self
            .market
            .owned()
            .iter()
            .map(|property| property.id.clone())
            .collect();
        let mut total = 0;
        for id in ids {
            if let Ok(receipt) = self.market.collect_rent(&id, &mut self.player, now) {
                self.player.record_rent(&receipt);
                total += receipt.amount;
            }
        }
        if total > 0 {
            self.push_message(format!("Collected {total} rent across the portfolio."));
            self.after_trade();
        } else {
            self.push_message("No rent waiting anywhere.".to_string());
        }
        total
    }

    pub fn property_value(&self) -> u64 {
        self.market.portfolio_value()
    }

    pub fn total_assets(&self) -> u64 {
        self.player.cash.saturating_add(self.property_value())
    }

    pub fn standings(&self) -> Vec<RankEntry> {
        leaderboard::standings(self.now(), &self.config.player_name, self.total_assets())
    }

    pub fn messages(&self) -> impl Iterator<Item = &String> {
        self.messages.iter()
    }

    pub fn add_message<S: Into<String>>(&mut self, message: S) {
        self.push_message(message.into());
    }

    /// True once per batch of unsaved changes.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn after_trade(&mut self) {
        self.dirty = true;
        let now = self.now();
        self.assets
            .record(now, self.player.cash, self.market.portfolio_value());
        self.check_achievements();
    }

    fn sample_assets(&mut self) {
        let now = self.now();
        let property_value = self.market.portfolio_value();
        self.assets.maybe_sample(
            now,
            self.config.snapshot_interval_ms,
            self.player.cash,
            property_value,
        );
    }

    fn check_achievements(&mut self) {
        let total_assets = self.total_assets();
        let unlocked = {
            let owned: Vec<&Property> = self.market.owned();
            let ctx = AchievementContext {
                stats: &self.player.stats,
                owned: &owned,
                total_assets,
            };
            self.achievements.evaluate(&ctx)
        };
        let now = self.now();
        for achievement in unlocked {
            info!(id = achievement.id, "achievement unlocked");
            if achievement.reward > 0 {
                self.player.grant_reward(achievement.id, achievement.reward, now);
                self.push_message(format!(
                    "Achievement: {} (+{} reward)",
                    achievement.name, achievement.reward
                ));
            } else {
                self.push_message(format!("Achievement: {}", achievement.name));
            }
            self.dirty = true;
        }
    }

    fn push_message(&mut self, message: String) {
        if self.messages.len() == MAX_MESSAGES {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }
}
