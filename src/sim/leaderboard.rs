const HOUR_MS: f64 = 3_600_000.0;

pub struct SystemPlayer {
    pub name: &'static str,
    pub base_assets: u64,
    /// Compound growth per game hour.
    pub hourly_growth: f64,
}

pub const SYSTEM_PLAYERS: &[SystemPlayer] = &[
    SystemPlayer {
        name: "Old Money Wang",
        base_assets: 14_000_000_000,
        hourly_growth: 0.002,
    },
    SystemPlayer {
        name: "Harbor Queen",
        base_assets: 11_500_000_000,
        hourly_growth: 0.006,
    },
    SystemPlayer {
        name: "Chip Baron",
        base_assets: 9_000_000_000,
        hourly_growth: 0.012,
    },
    SystemPlayer {
        name: "Riverside Li",
        base_assets: 7_200_000_000,
        hourly_growth: 0.015,
    },
    SystemPlayer {
        name: "Tower Twins",
        base_assets: 5_500_000_000,
        hourly_growth: 0.02,
    },
    SystemPlayer {
        name: "Bungalow Bob",
        base_assets: 1_200_000_000,
        hourly_growth: 0.035,
    },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankEntry {
    pub rank: usize,
    pub name: String,
    pub assets: u64,
    pub is_player: bool,
}

pub fn system_player_assets(player: &SystemPlayer, now: u64) -> u64 {
    let hours = now as f64 / HOUR_MS;
    (player.base_assets as f64 * (1.0 + player.hourly_growth).powf(hours)).round() as u64
}

/// Everyone ranked by total assets, richest first. Ties go to the player.
pub fn standings(now: u64, player_name: &str, player_assets: u64) -> Vec<RankEntry> {
    let mut entries: Vec<RankEntry> = SYSTEM_PLAYERS
        .iter()
        .map(|npc| RankEntry {
            rank: 0,
            name: npc.name.to_string(),
            assets: system_player_assets(npc, now),
            is_player: false,
        })
        .collect();
    entries.push(RankEntry {
        rank: 0,
        name: player_name.to_string(),
        assets: player_assets,
        is_player: true,
    });
    entries.sort_by(|a, b| {
        b.assets
            .cmp(&a.assets)
            .then_with(|| b.is_player.cmp(&a.is_player))
    });
    for (index, entry) in entries.iter_mut().enumerate() {
        entry.rank = index + 1;
    }
    entries
}

pub fn player_rank(now: u64, player_assets: u64) -> usize {
    1 + SYSTEM_PLAYERS
        .iter()
        .filter(|npc| system_player_assets(npc, now) > player_assets)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standings_are_sorted_and_ranked() {
        let entries = standings(0, "You", 10_000_000_000);
        assert_eq!(entries.len(), SYSTEM_PLAYERS.len() + 1);
        assert!(entries.windows(2).all(|pair| pair[0].assets >= pair[1].assets));
        assert!(entries.iter().enumerate().all(|(i, e)| e.rank == i + 1));
        let you = entries.iter().find(|entry| entry.is_player).unwrap();
        assert_eq!(you.rank, 3);
        assert_eq!(player_rank(0, 10_000_000_000), 3);
    }

    #[test]
    fn rivals_grow_with_game_time() {
        let npc = &SYSTEM_PLAYERS[0];
        assert_eq!(system_player_assets(npc, 0), npc.base_assets);
        assert!(system_player_assets(npc, 10 * 3_600_000) > npc.base_assets);
    }

    #[test]
    fn ties_favour_the_player() {
        let entries = standings(0, "You", SYSTEM_PLAYERS[0].base_assets);
        assert!(entries[0].is_player);
    }
}
