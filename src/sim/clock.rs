use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Game-time source. Time only accumulates while the game is in the
/// foreground; every engine reads `now()` instead of the wall clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameClock {
    elapsed_ms: u64,
    #[serde(skip, default = "foreground")]
    active: bool,
}

fn foreground() -> bool {
    true
}

impl Default for GameClock {
    fn default() -> Self {
        Self::starting_at(0)
    }
}

impl GameClock {
    pub fn starting_at(elapsed_ms: u64) -> Self {
        Self {
            elapsed_ms,
            active: true,
        }
    }

    pub fn now(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Returns the number of milliseconds actually added.
    pub fn advance(&mut self, delta: Duration) -> u64 {
        if !self.active {
            return 0;
        }
        let delta_ms = delta.as_millis() as u64;
        self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
        delta_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_clock_does_not_advance() {
        let mut clock = GameClock::starting_at(1_000);
        assert_eq!(clock.advance(Duration::from_millis(250)), 250);
        clock.set_active(false);
        assert_eq!(clock.advance(Duration::from_secs(60)), 0);
        assert_eq!(clock.now(), 1_250);
        clock.set_active(true);
        clock.advance(Duration::from_millis(750));
        assert_eq!(clock.now(), 2_000);
    }
}
