use std::collections::BTreeMap;

/// Debounced, coalescing save requests. Only the newest payload per key is
/// kept; a batch is released at most once per `min_interval_ms`, and never
/// while the previous batch is still being written.
#[derive(Debug)]
pub struct SaveQueue {
    min_interval_ms: u64,
    pending: BTreeMap<String, String>,
    in_flight: bool,
    last_release: Option<u64>,
}

impl SaveQueue {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            min_interval_ms,
            pending: BTreeMap::new(),
            in_flight: false,
            last_release: None,
        }
    }

    pub fn request(&mut self, key: &str, payload: String) {
        self.pending.insert(key.to_string(), payload);
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Hands out the pending batch if a write may start at `now_ms`.
    pub fn take_due(&mut self, now_ms: u64) -> Option<Vec<(String, String)>> {
        if self.in_flight || self.pending.is_empty() {
            return None;
        }
        if let Some(last) = self.last_release {
            if now_ms.saturating_sub(last) < self.min_interval_ms {
                return None;
            }
        }
        self.in_flight = true;
        self.last_release = Some(now_ms);
        Some(std::mem::take(&mut self.pending).into_iter().collect())
    }

    /// Marks the in-flight batch as done. Failed entries are retried later
    /// unless a newer payload for the same key arrived meanwhile.
    pub fn finish(&mut self, failed: Vec<(String, String)>) {
        self.in_flight = false;
        for (key, payload) in failed {
            self.pending.entry(key).or_insert(payload);
        }
    }

    /// Everything still pending, ignoring the debounce. Used on shutdown.
    pub fn drain(&mut self) -> Vec<(String, String)> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }
}
