use crate::sim::catalog::District;
use crate::sim::economy;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const NEWS_MIN_DURATION_MS: u64 = 5 * 60 * 1000;
pub const NEWS_MAX_DURATION_MS: u64 = 15 * 60 * 1000;
pub const REAL_NEWS_PROBABILITY: f64 = 0.75;
const MAX_NEWS_FEED: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceEffect {
    Increase,
    Decrease,
}

pub struct NewsTemplate {
    pub headline: &'static str,
    pub district: &'static str,
    pub effect: PriceEffect,
    pub value: f64,
}

pub const NEWS_TEMPLATES: &[NewsTemplate] = &[
    NewsTemplate {
        headline: "Metro line 9 extension approved through the CBD",
        district: "cbd",
        effect: PriceEffect::Increase,
        value: 0.06,
    },
    NewsTemplate {
        headline: "Downtown office vacancies hit a ten-year high",
        district: "downtown",
        effect: PriceEffect::Decrease,
        value: 0.05,
    },
    NewsTemplate {
        headline: "Riverside promenade wins national design award",
        district: "riverside",
        effect: PriceEffect::Increase,
        value: 0.04,
    },
    NewsTemplate {
        headline: "Flood warning issued for low-lying river blocks",
        district: "river",
        effect: PriceEffect::Decrease,
        value: 0.07,
    },
    NewsTemplate {
        headline: "Chip giant announces headquarters in Tech Park",
        district: "tech",
        effect: PriceEffect::Increase,
        value: 0.08,
    },
    NewsTemplate {
        headline: "Start-up layoffs ripple through the tech-park",
        district: "tech-park",
        effect: PriceEffect::Decrease,
        value: 0.05,
    },
    NewsTemplate {
        headline: "Old Town named protected heritage quarter",
        district: "heritage",
        effect: PriceEffect::Increase,
        value: 0.05,
    },
    NewsTemplate {
        headline: "Demolition freeze stalls old-town renovations",
        district: "old-town",
        effect: PriceEffect::Decrease,
        value: 0.04,
    },
    NewsTemplate {
        headline: "Cruise terminal opens at the Harbor Front",
        district: "harbor",
        effect: PriceEffect::Increase,
        value: 0.06,
    },
    NewsTemplate {
        headline: "Port expansion brings round-the-clock freight noise",
        district: "port",
        effect: PriceEffect::Decrease,
        value: 0.06,
    },
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsEvent {
    pub id: u64,
    pub headline: String,
    pub district: District,
    pub price_effect: PriceEffect,
    pub effect_value: f64,
    pub is_real_news: bool,
    pub created_at: u64,
    pub effect_start: u64,
    pub effect_end: u64,
}

impl NewsEvent {
    pub fn is_active(&self, now: u64) -> bool {
        now >= self.effect_start && now < self.effect_end
    }

    pub fn change_percent(&self) -> f64 {
        economy::news_change_percent(self.price_effect, self.effect_value, self.is_real_news)
    }
}

#[derive(Debug, Clone)]
pub struct NewsDraft {
    pub headline: String,
    pub district: District,
    pub price_effect: PriceEffect,
    pub effect_value: f64,
    pub is_real_news: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsBoard {
    events: Vec<NewsEvent>,
    next_id: u64,
}

impl NewsBoard {
    pub fn publish(&mut self, draft: NewsDraft, now: u64, duration_ms: u64) -> &NewsEvent {
        self.next_id += 1;
        self.events.push(NewsEvent {
            id: self.next_id,
            headline: draft.headline,
            district: draft.district,
            price_effect: draft.price_effect,
            effect_value: draft.effect_value,
            is_real_news: draft.is_real_news,
            created_at: now,
            effect_start: now,
            effect_end: now.saturating_add(duration_ms),
        });
        if self.events.len() > MAX_NEWS_FEED {
            let excess = self.events.len() - MAX_NEWS_FEED;
            self.events.drain(..excess);
        }
        &self.events[self.events.len() - 1]
    }

    pub fn publish_random(&mut self, now: u64, rng: &mut impl Rng) -> Option<&NewsEvent> {
        let template = NEWS_TEMPLATES.choose(rng)?;
        let Some(district) = District::from_news_name(template.district) else {
            warn!(district = template.district, "news template names an unknown district");
            return None;
        };
        let draft = NewsDraft {
            headline: template.headline.to_string(),
            district,
            price_effect: template.effect,
            effect_value: template.value,
            is_real_news: rng.gen_bool(REAL_NEWS_PROBABILITY),
        };
        let duration_ms = rng.gen_range(NEWS_MIN_DURATION_MS..=NEWS_MAX_DURATION_MS);
        Some(self.publish(draft, now, duration_ms))
    }

    /// The effect steering `district` at `now`: the most recently created
    /// active event, never a blend of several.
    pub fn active_for(&self, district: District, now: u64) -> Option<&NewsEvent> {
        self.events
            .iter()
            .filter(|event| event.district == district && event.is_active(now))
            .max_by_key(|event| (event.created_at, event.id))
    }

    /// Newest first.
    pub fn feed(&self) -> impl Iterator<Item = &NewsEvent> {
        self.events.iter().rev()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn draft(district: District, effect: PriceEffect, value: f64) -> NewsDraft {
        NewsDraft {
            headline: "test".to_string(),
            district,
            price_effect: effect,
            effect_value: value,
            is_real_news: true,
        }
    }

    #[test]
    fn templates_resolve_to_districts() {
        for template in NEWS_TEMPLATES {
            assert!(
                District::from_news_name(template.district).is_some(),
                "{} has no district",
                template.headline
            );
        }
    }

    #[test]
    fn latest_active_event_wins() {
        let mut board = NewsBoard::default();
        board.publish(draft(District::Harbor, PriceEffect::Increase, 0.05), 0, 600_000);
        board.publish(draft(District::Harbor, PriceEffect::Decrease, 0.03), 1_000, 600_000);

        let active = board.active_for(District::Harbor, 2_000).expect("active news");
        assert_eq!(active.price_effect, PriceEffect::Decrease);
        assert!(board.active_for(District::Central, 2_000).is_none());
    }

    #[test]
    fn expired_event_no_longer_applies() {
        let mut board = NewsBoard::default();
        board.publish(draft(District::Harbor, PriceEffect::Increase, 0.05), 0, 600_000);
        board.publish(draft(District::Harbor, PriceEffect::Decrease, 0.03), 1_000, 60_000);

        let active = board.active_for(District::Harbor, 61_000).expect("older news still running");
        assert_eq!(active.price_effect, PriceEffect::Increase);
        assert!(board.active_for(District::Harbor, 600_000).is_none());
    }

    #[test]
    fn random_news_has_bounded_duration() {
        let mut board = NewsBoard::default();
        let mut rng = StdRng::seed_from_u64(3);
        for round in 0..50u64 {
            let event = board.publish_random(round, &mut rng).expect("template available");
            let duration = event.effect_end - event.effect_start;
            assert!((NEWS_MIN_DURATION_MS..=NEWS_MAX_DURATION_MS).contains(&duration));
        }
        assert_eq!(board.feed().count(), MAX_NEWS_FEED);
        assert_eq!(board.feed().next().map(|event| event.id), Some(50));
    }
}
