use crate::config::MarketConfig;
use crate::sim::catalog::{self, HouseType};
use crate::sim::economy;
use crate::sim::news::{NewsBoard, NewsEvent};
use crate::sim::property::{Holding, Ownership, PricePoint, Property};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const LISTING_SIZE: usize = 12;
/// Tiers sampled for the trading floor; bungalows fill whatever is left.
const LISTING_QUOTAS: [(HouseType, usize); 3] = [
    (HouseType::Villa, 1),
    (HouseType::Tower, 2),
    (HouseType::HighRise, 5),
];

/// Source and sink of the player's cash.
pub trait Wallet {
    fn balance(&self) -> u64;
    fn debit(&mut self, amount: u64);
    fn credit(&mut self, amount: u64);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeError {
    #[error("property {0} does not exist")]
    NotFound(String),
    #[error("{0} is not on the trading floor")]
    NotListed(String),
    #[error("{0} is not in your portfolio")]
    NotOwned(String),
    #[error("insufficient funds for {id}: costs {price}, you have {available}")]
    InsufficientFunds {
        id: String,
        price: u64,
        available: u64,
    },
    #[error("{id} is trade-locked for another {}s", secs_left(.remaining_ms))]
    TradeLocked { id: String, remaining_ms: u64 },
    #[error("no rent available on {0}")]
    NoRentAvailable(String),
}

fn secs_left(ms: &u64) -> u64 {
    ms.div_ceil(1000)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub id: String,
    pub price: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleReceipt {
    pub id: String,
    pub price: u64,
    pub purchase_price: u64,
    pub profit: i64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RentReceipt {
    pub id: String,
    pub amount: u64,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RentStatus {
    pub owed: u64,
    pub cap: u64,
    pub progress: f64,
}

#[derive(Debug, Default)]
pub struct TickReport {
    pub price_updates: u32,
    pub listing_refreshed: bool,
    pub published: Vec<NewsEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSave {
    pub id: String,
    pub current_price: u64,
    pub highest_price: u64,
    pub lowest_price: u64,
    #[serde(default)]
    pub history: Vec<PricePoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSave {
    pub prices: Vec<PriceSave>,
    #[serde(default)]
    pub news: NewsBoard,
    #[serde(default)]
    pub listing: Vec<String>,
    pub next_price_update: u64,
    pub next_listing_refresh: u64,
    pub next_news: u64,
}

/// The instance pool plus everything that mutates it. Every view of a
/// property (trading floor, portfolio, charts) reads the single entry held
/// here by id.
pub struct Market {
    config: MarketConfig,
    pool: BTreeMap<String, Property>,
    listing: Vec<String>,
    news: NewsBoard,
    next_price_update: u64,
    next_listing_refresh: u64,
    next_news: u64,
}

impl Market {
    pub fn new(config: MarketConfig, now: u64, rng: &mut impl Rng) -> Self {
        let pool = catalog::catalog()
            .iter()
            .map(|entry| (entry.id.clone(), Property::from_entry(entry, now)))
            .collect();
        let mut market = Self {
            next_price_update: now + config.price_update_interval_ms,
            next_listing_refresh: now + config.listing_refresh_interval_ms,
            next_news: now + config.news_interval_ms,
            config,
            pool,
            listing: Vec::new(),
            news: NewsBoard::default(),
        };
        market.refresh_listing(rng);
        market
    }

    /// Rebuilds a market from saved system data. Unknown ids in the save are
    /// ignored; catalog entries missing from the save keep catalog prices.
    pub fn restore(config: MarketConfig, save: MarketSave, now: u64, rng: &mut impl Rng) -> Self {
        let mut market = Self::new(config, now, rng);
        for price in save.prices {
            let Some(property) = market.pool.get_mut(&price.id) else {
                warn!(id = %price.id, "saved price for unknown property dropped");
                continue;
            };
            let floor = property.price_floor();
            property.current_price = price.current_price.max(floor);
            property.highest_price = price.highest_price.max(property.current_price);
            property.lowest_price = price.lowest_price.clamp(floor, property.current_price);
            if !price.history.is_empty() {
                property.price_history = price.history;
            }
        }
        market.news = save.news;
        let listing: Vec<String> = save
            .listing
            .into_iter()
            .filter(|id| market.pool.contains_key(id))
            .collect();
        if !listing.is_empty() {
            market.listing = listing;
        }
        market.next_price_update = save.next_price_update;
        market.next_listing_refresh = save.next_listing_refresh;
        market.next_news = save.next_news;
        market
    }

    pub fn snapshot(&self) -> MarketSave {
        MarketSave {
            prices: self
                .pool
                .values()
                .map(|property| PriceSave {
                    id: property.id.clone(),
                    current_price: property.current_price,
                    highest_price: property.highest_price,
                    lowest_price: property.lowest_price,
                    history: property.price_history.clone(),
                })
                .collect(),
            news: self.news.clone(),
            listing: self.listing.clone(),
            next_price_update: self.next_price_update,
            next_listing_refresh: self.next_listing_refresh,
            next_news: self.next_news,
        }
    }

    /// Advances every interval-driven loop up to `now`.
    pub fn tick(&mut self, now: u64, rng: &mut impl Rng) -> TickReport {
        let mut report = TickReport::default();

        while now >= self.next_news {
            let published_at = self.next_news;
            self.next_news += self.config.news_interval_ms.max(1);
            if let Some(event) = self.news.publish_random(published_at, rng) {
                info!(district = ?event.district, real = event.is_real_news, "{}", event.headline);
                report.published.push(event.clone());
            }
        }

        while now >= self.next_price_update {
            let tick_at = self.next_price_update;
            self.next_price_update += self.config.price_update_interval_ms.max(1);
            self.update_prices(tick_at, rng);
            report.price_updates += 1;
        }

        if now >= self.next_listing_refresh {
            let interval = self.config.listing_refresh_interval_ms.max(1);
            while now >= self.next_listing_refresh {
                self.next_listing_refresh += interval;
            }
            self.refresh_listing(rng);
            report.listing_refreshed = true;
        }

        report
    }

    pub fn update_prices(&mut self, now: u64, rng: &mut impl Rng) {
        for property in self.pool.values_mut() {
            let change_percent = match self.news.active_for(property.district, now) {
                Some(event) => event.change_percent(),
                None => economy::random_drift(rng),
            };
            property.apply_change(change_percent, now);
        }
        debug!(now, "prices updated");
    }

    pub fn refresh_listing(&mut self, rng: &mut impl Rng) {
        let mut listing = Vec::with_capacity(LISTING_SIZE);
        for (house_type, quota) in LISTING_QUOTAS {
            listing.extend(self.sample_tradeable(house_type, quota, rng));
        }
        let remaining = LISTING_SIZE.saturating_sub(listing.len());
        listing.extend(self.sample_tradeable(HouseType::Bungalow, remaining, rng));
        debug!(size = listing.len(), "trading floor refreshed");
        self.listing = listing;
    }

    fn sample_tradeable(
        &self,
        house_type: HouseType,
        amount: usize,
        rng: &mut impl Rng,
    ) -> Vec<String> {
        let candidates: Vec<&String> = self
            .pool
            .values()
            .filter(|property| !property.is_owned() && property.house_type == house_type)
            .map(|property| &property.id)
            .collect();
        candidates
            .choose_multiple(rng, amount)
            .map(|id| (*id).clone())
            .collect()
    }

    pub fn purchase(
        &mut self,
        id: &str,
        wallet: &mut impl Wallet,
        now: u64,
    ) -> Result<PurchaseReceipt, TradeError> {
        let property = self
            .pool
            .get_mut(id)
            .ok_or_else(|| TradeError::NotFound(id.to_string()))?;
        let Some(position) = self.listing.iter().position(|listed| listed == id) else {
            return Err(TradeError::NotListed(id.to_string()));
        };
        if property.is_owned() {
            return Err(TradeError::NotListed(id.to_string()));
        }
        let price = property.current_price;
        let available = wallet.balance();
        if available < price {
            return Err(TradeError::InsufficientFunds {
                id: id.to_string(),
                price,
                available,
            });
        }

        wallet.debit(price);
        property.holding = Holding::Owned(Ownership {
            purchase_price: price,
            purchase_time: now,
            last_rent_collection: now,
        });
        self.listing.remove(position);
        info!(id, price, "property purchased");
        Ok(PurchaseReceipt {
            id: id.to_string(),
            price,
            timestamp: now,
        })
    }

    pub fn sell(
        &mut self,
        id: &str,
        wallet: &mut impl Wallet,
        now: u64,
    ) -> Result<SaleReceipt, TradeError> {
        let property = self
            .pool
            .get_mut(id)
            .ok_or_else(|| TradeError::NotFound(id.to_string()))?;
        let ownership = *property
            .ownership()
            .ok_or_else(|| TradeError::NotOwned(id.to_string()))?;
        let held_ms = now.saturating_sub(ownership.purchase_time);
        if held_ms < self.config.trade_lock_ms {
            return Err(TradeError::TradeLocked {
                id: id.to_string(),
                remaining_ms: self.config.trade_lock_ms - held_ms,
            });
        }

        let price = property.current_price;
        wallet.credit(price);
        property.holding = Holding::Tradeable;
        if !self.listing.iter().any(|listed| listed == id) {
            self.listing.push(id.to_string());
        }
        let profit = price as i64 - ownership.purchase_price as i64;
        info!(id, price, profit, "property sold");
        Ok(SaleReceipt {
            id: id.to_string(),
            price,
            purchase_price: ownership.purchase_price,
            profit,
            timestamp: now,
        })
    }

    pub fn collect_rent(
        &mut self,
        id: &str,
        wallet: &mut impl Wallet,
        now: u64,
    ) -> Result<RentReceipt, TradeError> {
        let property = self
            .pool
            .get_mut(id)
            .ok_or_else(|| TradeError::NotFound(id.to_string()))?;
        let monthly_rent = property.monthly_rent;
        let ownership = property
            .ownership_mut()
            .ok_or_else(|| TradeError::NotOwned(id.to_string()))?;
        let owed = economy::rent_owed(monthly_rent, ownership.last_rent_collection, now);
        if owed == 0 {
            return Err(TradeError::NoRentAvailable(id.to_string()));
        }
        ownership.last_rent_collection = now;
        wallet.credit(owed);
        debug!(id, owed, "rent collected");
        Ok(RentReceipt {
            id: id.to_string(),
            amount: owed,
            timestamp: now,
        })
    }

    pub fn rent_status(&self, id: &str, now: u64) -> Option<RentStatus> {
        let property = self.pool.get(id)?;
        let ownership = property.ownership()?;
        Some(RentStatus {
            owed: economy::rent_owed(property.monthly_rent, ownership.last_rent_collection, now),
            cap: economy::rent_pool_cap(property.monthly_rent),
            progress: economy::rent_progress(
                property.monthly_rent,
                ownership.last_rent_collection,
                now,
            ),
        })
    }

    /// Milliseconds until `id` may be sold; `None` when not owned.
    pub fn lock_remaining(&self, id: &str, now: u64) -> Option<u64> {
        let ownership = self.pool.get(id)?.ownership()?;
        let held_ms = now.saturating_sub(ownership.purchase_time);
        Some(self.config.trade_lock_ms.saturating_sub(held_ms))
    }

    /// Re-links saved ownership to the pooled instance. Returns false when
    /// the id is unknown or already owned.
    pub fn adopt(&mut self, id: &str, ownership: Ownership) -> bool {
        let Some(property) = self.pool.get_mut(id) else {
            return false;
        };
        if property.is_owned() {
            return false;
        }
        property.holding = Holding::Owned(ownership);
        self.listing.retain(|listed| listed != id);
        true
    }

    pub fn property(&self, id: &str) -> Option<&Property> {
        self.pool.get(id)
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.pool.values()
    }

    pub fn listing(&self) -> Vec<&Property> {
        self.listing
            .iter()
            .filter_map(|id| self.pool.get(id))
            .collect()
    }

    /// Owned properties in purchase order.
    pub fn owned(&self) -> Vec<&Property> {
        let mut owned: Vec<&Property> = self
            .pool
            .values()
            .filter(|property| property.is_owned())
            .collect();
        owned.sort_by_key(|property| {
            property
                .ownership()
                .map(|ownership| ownership.purchase_time)
                .unwrap_or_default()
        });
        owned
    }

    pub fn portfolio_value(&self) -> u64 {
        self.properties()
            .filter(|property| property.is_owned())
            .map(|property| property.current_price)
            .sum()
    }

    pub fn news(&self) -> &NewsBoard {
        &self.news
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::District;
    use crate::sim::news::{NewsDraft, PriceEffect};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct TestWallet(u64);

    impl Wallet for TestWallet {
        fn balance(&self) -> u64 {
            self.0
        }

        fn debit(&mut self, amount: u64) {
            self.0 -= amount;
        }

        fn credit(&mut self, amount: u64) {
            self.0 += amount;
        }
    }

    fn market() -> (Market, StdRng) {
        let mut rng = StdRng::seed_from_u64(42);
        let market = Market::new(MarketConfig::default(), 0, &mut rng);
        (market, rng)
    }

    fn first_listed(market: &Market) -> String {
        market.listing()[0].id.clone()
    }

    #[test]
    fn listing_respects_tier_quotas() {
        let (market, _) = market();
        let listing = market.listing();
        assert_eq!(listing.len(), LISTING_SIZE);
        let count = |house_type| {
            listing
                .iter()
                .filter(|property| property.house_type == house_type)
                .count()
        };
        assert_eq!(count(HouseType::Villa), 1);
        assert_eq!(count(HouseType::Tower), 2);
        assert_eq!(count(HouseType::HighRise), 5);
        assert_eq!(count(HouseType::Bungalow), 4);
    }

    #[test]
    fn refreshed_listing_excludes_owned() {
        let (mut market, mut rng) = market();
        let mut wallet = TestWallet(u64::MAX / 2);
        let ids: Vec<String> = market.listing().iter().map(|p| p.id.clone()).collect();
        for id in &ids {
            market.purchase(id, &mut wallet, 0).expect("purchase");
        }
        for _ in 0..20 {
            market.refresh_listing(&mut rng);
            assert!(market.listing().iter().all(|property| !property.is_owned()));
        }
    }

    #[test]
    fn purchase_moves_property_into_portfolio() {
        let (mut market, _) = market();
        let id = first_listed(&market);
        let price = market.property(&id).unwrap().current_price;
        let mut wallet = TestWallet(price + 5);

        let receipt = market.purchase(&id, &mut wallet, 1_000).expect("purchase");
        assert_eq!(receipt.price, price);
        assert_eq!(wallet.0, 5);
        assert!(market.listing().iter().all(|property| property.id != id));
        assert_eq!(market.owned().len(), 1);
        let ownership = market.property(&id).unwrap().ownership().copied().unwrap();
        assert_eq!(ownership.purchase_price, price);
        assert_eq!(ownership.purchase_time, 1_000);
        assert_eq!(ownership.last_rent_collection, 1_000);
    }

    #[test]
    fn purchase_without_funds_changes_nothing() {
        let (mut market, _) = market();
        let id = first_listed(&market);
        let price = market.property(&id).unwrap().current_price;
        let mut wallet = TestWallet(price - 1);

        let result = market.purchase(&id, &mut wallet, 0);
        assert_eq!(
            result,
            Err(TradeError::InsufficientFunds {
                id: id.clone(),
                price,
                available: price - 1,
            })
        );
        assert_eq!(wallet.0, price - 1);
        assert!(market.listing().iter().any(|property| property.id == id));
        assert!(!market.property(&id).unwrap().is_owned());
    }

    #[test]
    fn unknown_and_unlisted_purchases_fail() {
        let (mut market, _) = market();
        let mut wallet = TestWallet(u64::MAX / 2);
        assert_eq!(
            market.purchase("NOPE-1", &mut wallet, 0),
            Err(TradeError::NotFound("NOPE-1".to_string()))
        );
        let unlisted = market
            .properties()
            .find(|property| !market.listing.contains(&property.id))
            .map(|property| property.id.clone())
            .expect("catalog larger than listing");
        assert_eq!(
            market.purchase(&unlisted, &mut wallet, 0),
            Err(TradeError::NotListed(unlisted.clone()))
        );
    }

    #[test]
    fn trade_lock_blocks_early_sale() {
        let (mut market, _) = market();
        let id = first_listed(&market);
        let mut wallet = TestWallet(u64::MAX / 2);
        market.purchase(&id, &mut wallet, 10_000).expect("purchase");

        let early = market.sell(&id, &mut wallet, 10_000 + 299_999);
        assert_eq!(
            early,
            Err(TradeError::TradeLocked {
                id: id.clone(),
                remaining_ms: 1,
            })
        );
        assert!(market.property(&id).unwrap().is_owned());

        let receipt = market.sell(&id, &mut wallet, 10_000 + 300_000).expect("sale");
        assert_eq!(receipt.profit, 0);
        assert!(!market.property(&id).unwrap().is_owned());
        assert!(market.listing().iter().any(|property| property.id == id));
    }

    #[test]
    fn sale_keeps_price_state() {
        let (mut market, mut rng) = market();
        let id = first_listed(&market);
        let mut wallet = TestWallet(u64::MAX / 2);
        market.purchase(&id, &mut wallet, 0).expect("purchase");
        for minute in 1..=10 {
            market.update_prices(minute * 60_000, &mut rng);
        }
        let before = market.property(&id).unwrap().clone();
        let receipt = market.sell(&id, &mut wallet, 600_000).expect("sale");
        let after = market.property(&id).unwrap();
        assert_eq!(receipt.price, before.current_price);
        assert_eq!(after.current_price, before.current_price);
        assert_eq!(after.price_history.len(), before.price_history.len());
        assert_eq!(after.ownership(), None);
    }

    #[test]
    fn selling_unowned_property_fails() {
        let (mut market, _) = market();
        let id = first_listed(&market);
        let mut wallet = TestWallet(0);
        assert_eq!(
            market.sell(&id, &mut wallet, 0),
            Err(TradeError::NotOwned(id.clone()))
        );
    }

    #[test]
    fn rent_collection_is_idempotent_within_an_instant() {
        let (mut market, _) = market();
        let id = first_listed(&market);
        let mut wallet = TestWallet(u64::MAX / 2);
        market.purchase(&id, &mut wallet, 0).expect("purchase");
        let monthly_rent = market.property(&id).unwrap().monthly_rent;

        let balance = wallet.0;
        let receipt = market.collect_rent(&id, &mut wallet, 60_000).expect("rent");
        assert_eq!(receipt.amount, economy::rent_owed(monthly_rent, 0, 60_000));
        assert!(receipt.amount > 0);
        assert_eq!(wallet.0, balance + receipt.amount);
        assert_eq!(
            market.collect_rent(&id, &mut wallet, 60_000),
            Err(TradeError::NoRentAvailable(id.clone()))
        );
        let status = market.rent_status(&id, 60_000).unwrap();
        assert_eq!(status.owed, 0);
        assert_eq!(status.progress, 0.0);
    }

    #[test]
    fn rent_is_capped_after_long_absence() {
        let (mut market, _) = market();
        let id = first_listed(&market);
        let mut wallet = TestWallet(u64::MAX / 2);
        market.purchase(&id, &mut wallet, 0).expect("purchase");
        let monthly_rent = market.property(&id).unwrap().monthly_rent;

        let status = market.rent_status(&id, 365 * 24 * 3_600_000).unwrap();
        assert_eq!(status.owed, economy::rent_pool_cap(monthly_rent));
        assert_eq!(status.owed, status.cap);
        assert!((status.progress - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fake_good_news_pushes_prices_down() {
        let (mut market, mut rng) = market();
        market.news.publish(
            NewsDraft {
                headline: "Rumoured stadium".to_string(),
                district: District::Riverside,
                price_effect: PriceEffect::Increase,
                effect_value: 0.06,
                is_real_news: false,
            },
            0,
            600_000,
        );
        let before: BTreeMap<String, u64> = market
            .properties()
            .map(|property| (property.id.clone(), property.current_price))
            .collect();

        market.update_prices(60_000, &mut rng);

        for property in market
            .properties()
            .filter(|property| property.district == District::Riverside)
        {
            assert!(property.current_price < before[&property.id]);
            let last = property.price_history.last().unwrap();
            assert!(last.change < 0);
        }
    }

    #[test]
    fn prices_respect_floor_over_many_ticks() {
        let (mut market, mut rng) = market();
        market.news.publish(
            NewsDraft {
                headline: "Sinkhole".to_string(),
                district: District::OldTown,
                price_effect: PriceEffect::Decrease,
                effect_value: 0.5,
                is_real_news: true,
            },
            0,
            u64::MAX / 2,
        );
        for minute in 1..=300 {
            market.update_prices(minute * 60_000, &mut rng);
            for property in market.properties() {
                assert!(property.current_price as f64 >= property.initial_price as f64 * 0.2);
            }
        }
        assert!(
            market
                .properties()
                .filter(|property| property.district == District::OldTown)
                .all(|property| property.current_price == property.price_floor())
        );
    }

    #[test]
    fn tick_runs_each_loop_on_its_interval() {
        let (mut market, mut rng) = market();
        let report = market.tick(59_999, &mut rng);
        assert_eq!(report.price_updates, 0);
        assert!(!report.listing_refreshed);

        let report = market.tick(300_000, &mut rng);
        assert_eq!(report.price_updates, 5);
        assert!(report.listing_refreshed);
        assert!(report.published.is_empty());

        let report = market.tick(480_000, &mut rng);
        assert_eq!(report.published.len(), 1);
        assert_eq!(report.price_updates, 3);
    }

    #[test]
    fn snapshot_restores_prices_and_listing() {
        let (mut market, mut rng) = market();
        market.tick(600_000, &mut rng);
        let save = market.snapshot();
        let restored = Market::restore(MarketConfig::default(), save, 600_000, &mut rng);
        for property in market.properties() {
            let other = restored.property(&property.id).unwrap();
            assert_eq!(other.current_price, property.current_price);
            assert_eq!(other.price_history, property.price_history);
        }
        assert_eq!(restored.listing, market.listing);
    }

    #[test]
    fn adopt_relinks_once() {
        let (mut market, _) = market();
        let id = first_listed(&market);
        let ownership = Ownership {
            purchase_price: 1,
            purchase_time: 0,
            last_rent_collection: 0,
        };
        assert!(market.adopt(&id, ownership));
        assert!(!market.adopt(&id, ownership));
        assert!(!market.adopt("NOPE-1", ownership));
        assert_eq!(market.owned().len(), 1);
        assert!(market.listing().iter().all(|property| property.id != id));
    }
}
