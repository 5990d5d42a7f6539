use crate::sim::market::{PurchaseReceipt, RentReceipt, SaleReceipt, Wallet};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const MAX_TRANSACTIONS: usize = 200;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerStats {
    pub total_spent: u64,
    pub total_earned: u64,
    pub rent_collected: u64,
    pub trades_completed: u32,
    pub best_sale_profit: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Purchase,
    Sale,
    Rent,
    Reward,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub timestamp: u64,
    pub kind: TransactionKind,
    pub subject: String,
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub cash: u64,
    #[serde(default)]
    pub stats: PlayerStats,
    #[serde(default)]
    pub transactions: VecDeque<Transaction>,
}

impl Player {
    pub fn new(cash: u64) -> Self {
        Self {
            cash,
            stats: PlayerStats::default(),
            transactions: VecDeque::new(),
        }
    }

    pub fn record_purchase(&mut self, receipt: &PurchaseReceipt) {
        self.stats.total_spent += receipt.price;
        self.log(TransactionKind::Purchase, &receipt.id, receipt.price, receipt.timestamp);
    }

    pub fn record_sale(&mut self, receipt: &SaleReceipt) {
        self.stats.total_earned += receipt.price;
        self.stats.trades_completed += 1;
        self.stats.best_sale_profit = self.stats.best_sale_profit.max(receipt.profit);
        self.log(TransactionKind::Sale, &receipt.id, receipt.price, receipt.timestamp);
    }

    pub fn record_rent(&mut self, receipt: &RentReceipt) {
        self.stats.total_earned += receipt.amount;
        self.stats.rent_collected += receipt.amount;
        self.log(TransactionKind::Rent, &receipt.id, receipt.amount, receipt.timestamp);
    }

    pub fn grant_reward(&mut self, subject: &str, amount: u64, now: u64) {
        self.credit(amount);
        self.log(TransactionKind::Reward, subject, amount, now);
    }

    fn log(&mut self, kind: TransactionKind, subject: &str, amount: u64, timestamp: u64) {
        self.transactions.push_back(Transaction {
            timestamp,
            kind,
            subject: subject.to_string(),
            amount,
        });
        while self.transactions.len() > MAX_TRANSACTIONS {
            self.transactions.pop_front();
        }
    }
}

impl Wallet for Player {
    fn balance(&self) -> u64 {
        self.cash
    }

    fn debit(&mut self, amount: u64) {
        self.cash = self.cash.saturating_sub(amount);
    }

    fn credit(&mut self, amount: u64) {
        self.cash = self.cash.saturating_add(amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sale_updates_stats() {
        let mut player = Player::new(0);
        player.record_sale(&SaleReceipt {
            id: "CBD-001".to_string(),
            price: 1_200,
            purchase_price: 1_000,
            profit: 200,
            timestamp: 10,
        });
        assert_eq!(player.stats.trades_completed, 1);
        assert_eq!(player.stats.best_sale_profit, 200);
        assert_eq!(player.stats.total_earned, 1_200);
        assert_eq!(player.transactions.len(), 1);
    }

    #[test]
    fn transaction_log_is_capped() {
        let mut player = Player::new(0);
        for n in 0..(MAX_TRANSACTIONS as u64 + 25) {
            player.grant_reward("bonus", 1, n);
        }
        assert_eq!(player.transactions.len(), MAX_TRANSACTIONS);
        assert_eq!(player.transactions.front().map(|t| t.timestamp), Some(25));
        assert_eq!(player.cash, MAX_TRANSACTIONS as u64 + 25);
    }
}
