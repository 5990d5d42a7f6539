use serde::{Deserialize, Serialize};

pub const SNAPSHOT_RETENTION_MS: u64 = 24 * 60 * 60 * 1000;
pub const MAX_SNAPSHOTS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    pub timestamp: u64,
    pub cash: u64,
    pub property_value: u64,
    pub total_asset_value: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetTracker {
    snapshots: Vec<AssetSnapshot>,
    #[serde(default)]
    next_sample: u64,
}

impl AssetTracker {
    /// Appends a snapshot when the sampling interval has elapsed.
    pub fn maybe_sample(
        &mut self,
        now: u64,
        interval_ms: u64,
        cash: u64,
        property_value: u64,
    ) -> bool {
        if now < self.next_sample {
            return false;
        }
        self.next_sample = now + interval_ms.max(1);
        self.record(now, cash, property_value);
        true
    }

    pub fn record(&mut self, now: u64, cash: u64, property_value: u64) {
        self.snapshots.push(AssetSnapshot {
            timestamp: now,
            cash,
            property_value,
            total_asset_value: cash.saturating_add(property_value),
        });
        let cutoff = now.saturating_sub(SNAPSHOT_RETENTION_MS);
        self.snapshots.retain(|snapshot| snapshot.timestamp >= cutoff);
        if self.snapshots.len() > MAX_SNAPSHOTS {
            let excess = self.snapshots.len() - MAX_SNAPSHOTS;
            self.snapshots.drain(..excess);
        }
    }

    pub fn snapshots(&self) -> &[AssetSnapshot] {
        &self.snapshots
    }

    pub fn latest(&self) -> Option<&AssetSnapshot> {
        self.snapshots.last()
    }
}
