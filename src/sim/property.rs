use crate::sim::catalog::{CatalogEntry, Decoration, District, HouseType};
use crate::sim::economy;
use serde::{Deserialize, Serialize};

pub const HISTORY_RETENTION_MS: u64 = 24 * 60 * 60 * 1000;
pub const HISTORY_MAX_POINTS: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: u64,
    pub price: u64,
    pub change: i64,
    pub change_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    pub purchase_price: u64,
    pub purchase_time: u64,
    pub last_rent_collection: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Holding {
    #[default]
    Tradeable,
    Owned(Ownership),
}

#[derive(Debug, Clone)]
pub struct Property {
    pub id: String,
    pub district: District,
    pub house_type: HouseType,
    pub decoration: Decoration,
    pub star_rating: u8,
    pub monthly_rent: u64,
    pub initial_price: u64,
    pub current_price: u64,
    pub highest_price: u64,
    pub lowest_price: u64,
    pub price_history: Vec<PricePoint>,
    pub holding: Holding,
}

impl Property {
    pub fn from_entry(entry: &CatalogEntry, now: u64) -> Self {
        Self {
            id: entry.id.clone(),
            district: entry.district,
            house_type: entry.house_type,
            decoration: entry.decoration,
            star_rating: economy::star_rating(entry.initial_price),
            monthly_rent: entry.monthly_rent,
            initial_price: entry.initial_price,
            current_price: entry.initial_price,
            highest_price: entry.initial_price,
            lowest_price: entry.initial_price,
            price_history: vec![PricePoint {
                timestamp: now,
                price: entry.initial_price,
                change: 0,
                change_percent: 0.0,
            }],
            holding: Holding::Tradeable,
        }
    }

    pub fn title(&self) -> String {
        format!(
            "{} {} {}",
            self.district.code(),
            self.decoration.label(),
            self.house_type.label()
        )
    }

    pub fn is_owned(&self) -> bool {
        matches!(self.holding, Holding::Owned(_))
    }

    pub fn ownership(&self) -> Option<&Ownership> {
        match &self.holding {
            Holding::Owned(ownership) => Some(ownership),
            Holding::Tradeable => None,
        }
    }

    pub fn ownership_mut(&mut self) -> Option<&mut Ownership> {
        match &mut self.holding {
            Holding::Owned(ownership) => Some(ownership),
            Holding::Tradeable => None,
        }
    }

    pub fn price_floor(&self) -> u64 {
        economy::price_floor(self.initial_price)
    }

    /// Moves the price by `change_percent`, clamped to the floor, and
    /// records the move in the history.
    pub fn apply_change(&mut self, change_percent: f64, now: u64) -> PricePoint {
        let previous = self.current_price;
        let next = economy::next_price(previous, change_percent, self.initial_price);
        self.current_price = next;
        self.highest_price = self.highest_price.max(next);
        self.lowest_price = self.lowest_price.min(next);

        let change = next as i64 - previous as i64;
        let point = PricePoint {
            timestamp: now,
            price: next,
            change,
            change_percent: if previous == 0 {
                0.0
            } else {
                change as f64 / previous as f64
            },
        };
        self.price_history.push(point);
        self.prune_history(now);
        point
    }

    fn prune_history(&mut self, now: u64) {
        let cutoff = now.saturating_sub(HISTORY_RETENTION_MS);
        self.price_history.retain(|point| point.timestamp >= cutoff);
        if self.price_history.len() > HISTORY_MAX_POINTS {
            let excess = self.price_history.len() - HISTORY_MAX_POINTS;
            self.price_history.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::catalog;

    fn sample() -> Property {
        Property::from_entry(&catalog()[0], 0)
    }

    #[test]
    fn extrema_follow_price() {
        let mut property = sample();
        let start = property.current_price;
        property.apply_change(0.05, 60_000);
        property.apply_change(-0.10, 120_000);
        assert!(property.highest_price > start);
        assert!(property.lowest_price < start);
        assert_eq!(property.price_history.len(), 3);
        assert!(property.price_history[2].change < 0);
    }

    #[test]
    fn crash_stops_at_floor() {
        let mut property = sample();
        for minute in 1..=100 {
            property.apply_change(-0.5, minute * 60_000);
        }
        assert_eq!(property.current_price, property.price_floor());
        assert_eq!(property.lowest_price, property.price_floor());
    }

    #[test]
    fn history_is_bounded() {
        let mut property = sample();
        for minute in 1..=500u64 {
            property.apply_change(0.01, minute * 60_000);
        }
        assert_eq!(property.price_history.len(), HISTORY_MAX_POINTS);
        assert_eq!(property.price_history.last().unwrap().timestamp, 500 * 60_000);

        property.apply_change(0.01, 500 * 60_000 + HISTORY_RETENTION_MS);
        assert_eq!(property.price_history.len(), 2);
    }
}
