use crate::sim::catalog::District;
use crate::sim::player::PlayerStats;
use crate::sim::property::Property;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    OwnProperties(u64),
    TotalAssets(u64),
    TotalSpent(u64),
    RentCollected(u64),
    TradesCompleted(u64),
    ProfitableSale(u64),
    OwnStarRating(u8),
    OwnInEveryDistrict,
}

pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub condition: Condition,
    pub reward: u64,
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: "first_keys",
        name: "First Keys",
        description: "Own your first property.",
        condition: Condition::OwnProperties(1),
        reward: 1_000_000,
    },
    Achievement {
        id: "landlord",
        name: "Landlord",
        description: "Own ten properties at once.",
        condition: Condition::OwnProperties(10),
        reward: 20_000_000,
    },
    Achievement {
        id: "flipper",
        name: "Flipper",
        description: "Complete five sales.",
        condition: Condition::TradesCompleted(5),
        reward: 5_000_000,
    },
    Achievement {
        id: "buy_low",
        name: "Buy Low, Sell High",
        description: "Make a single sale with a profit of 1M or more.",
        condition: Condition::ProfitableSale(1_000_000),
        reward: 2_000_000,
    },
    Achievement {
        id: "rent_day",
        name: "Rent Day",
        description: "Collect 10M in rent.",
        condition: Condition::RentCollected(10_000_000),
        reward: 5_000_000,
    },
    Achievement {
        id: "six_stars",
        name: "Six Stars",
        description: "Own a six-star property.",
        condition: Condition::OwnStarRating(6),
        reward: 10_000_000,
    },
    Achievement {
        id: "city_map",
        name: "On Every Map",
        description: "Own property in every district.",
        condition: Condition::OwnInEveryDistrict,
        reward: 30_000_000,
    },
    Achievement {
        id: "big_spender",
        name: "Big Spender",
        description: "Spend 1B on property.",
        condition: Condition::TotalSpent(1_000_000_000),
        reward: 0,
    },
    Achievement {
        id: "ten_billion",
        name: "Spent It All",
        description: "Spend 10B on property.",
        condition: Condition::TotalSpent(10_000_000_000),
        reward: 0,
    },
    Achievement {
        id: "tycoon",
        name: "Tycoon",
        description: "Reach 12B in total assets.",
        condition: Condition::TotalAssets(12_000_000_000),
        reward: 0,
    },
];

/// What the player has right now, as seen by achievement conditions.
pub struct AchievementContext<'a> {
    pub stats: &'a PlayerStats,
    pub owned: &'a [&'a Property],
    pub total_assets: u64,
}

impl Condition {
    /// `(current, target)`, with `current` clamped to `target`.
    pub fn progress(&self, ctx: &AchievementContext) -> (u64, u64) {
        let (current, target) = match *self {
            Condition::OwnProperties(target) => (ctx.owned.len() as u64, target),
            Condition::TotalAssets(target) => (ctx.total_assets, target),
            Condition::TotalSpent(target) => (ctx.stats.total_spent, target),
            Condition::RentCollected(target) => (ctx.stats.rent_collected, target),
            Condition::TradesCompleted(target) => (ctx.stats.trades_completed as u64, target),
            Condition::ProfitableSale(target) => (ctx.stats.best_sale_profit.max(0) as u64, target),
            Condition::OwnStarRating(stars) => {
                let best = ctx
                    .owned
                    .iter()
                    .map(|property| property.star_rating)
                    .max()
                    .unwrap_or(0);
                (u64::from(best), u64::from(stars))
            }
            Condition::OwnInEveryDistrict => {
                let districts: HashSet<District> =
                    ctx.owned.iter().map(|property| property.district).collect();
                (districts.len() as u64, District::ALL.len() as u64)
            }
        };
        (current.min(target), target)
    }

    pub fn is_met(&self, ctx: &AchievementContext) -> bool {
        let (current, target) = self.progress(ctx);
        current >= target
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AchievementTracker {
    unlocked: BTreeSet<String>,
}

impl AchievementTracker {
    /// Unlocks every newly satisfied achievement and returns them.
    pub fn evaluate(&mut self, ctx: &AchievementContext) -> Vec<&'static Achievement> {
        let mut unlocked = Vec::new();
        for achievement in ACHIEVEMENTS {
            if self.is_unlocked(achievement.id) || !achievement.condition.is_met(ctx) {
                continue;
            }
            self.unlocked.insert(achievement.id.to_string());
            unlocked.push(achievement);
        }
        unlocked
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }

    pub fn unlocked_count(&self) -> usize {
        self.unlocked.len()
    }
}
