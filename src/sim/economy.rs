use crate::sim::news::PriceEffect;
use rand::Rng;

pub const PRICE_FLOOR_RATIO: f64 = 0.2;
pub const DRIFT_MIN: f64 = 0.02;
pub const DRIFT_MAX: f64 = 0.08;
const DAYS_PER_MONTH: f64 = 30.0;
/// Seconds of accrual the rent pool holds before it has to be emptied.
const RENT_POOL_SECONDS: f64 = 3600.0;
const STAR_BANDS: [u64; 5] = [3_000_000, 8_000_000, 20_000_000, 50_000_000, 100_000_000];

pub fn price_floor(initial_price: u64) -> u64 {
    (initial_price as f64 * PRICE_FLOOR_RATIO).ceil() as u64
}

pub fn next_price(current: u64, change_percent: f64, initial_price: u64) -> u64 {
    let floor = price_floor(initial_price);
    let raw = (current as f64 * (1.0 + change_percent)).round();
    if raw > floor as f64 { raw as u64 } else { floor }
}

pub fn random_drift(rng: &mut impl Rng) -> f64 {
    let magnitude = rng.gen_range(DRIFT_MIN..=DRIFT_MAX);
    if rng.gen_bool(0.5) { magnitude } else { -magnitude }
}

/// Fake news moves the market against its own headline.
pub fn news_change_percent(effect: PriceEffect, value: f64, is_real_news: bool) -> f64 {
    let signed = match effect {
        PriceEffect::Increase => value.abs(),
        PriceEffect::Decrease => -value.abs(),
    };
    if is_real_news { signed } else { -signed }
}

pub fn star_rating(price: u64) -> u8 {
    1 + STAR_BANDS.iter().filter(|band| price >= **band).count() as u8
}

pub fn rent_pool_cap(monthly_rent: u64) -> u64 {
    (monthly_rent as f64 / DAYS_PER_MONTH * RENT_POOL_SECONDS).floor() as u64
}

fn raw_accrual(monthly_rent: u64, last_collection: u64, now: u64) -> f64 {
    let elapsed_secs = now.saturating_sub(last_collection) as f64 / 1000.0;
    elapsed_secs * monthly_rent as f64 / DAYS_PER_MONTH
}

pub fn rent_owed(monthly_rent: u64, last_collection: u64, now: u64) -> u64 {
    let accrued = raw_accrual(monthly_rent, last_collection, now).floor() as u64;
    accrued.min(rent_pool_cap(monthly_rent))
}

/// Fill level of the rent pool, derived from the same accrual as
/// [`rent_owed`] so the bar is full exactly when the pool saturates.
pub fn rent_progress(monthly_rent: u64, last_collection: u64, now: u64) -> f64 {
    let cap = rent_pool_cap(monthly_rent);
    if cap == 0 {
        return 0.0;
    }
    (raw_accrual(monthly_rent, last_collection, now) / cap as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn sixty_seconds_of_rent() {
        let now = 1_000_000;
        assert_eq!(rent_owed(30_000, now - 60_000, now), 60_000);
        assert_eq!(rent_pool_cap(30_000), 3_600_000);
    }

    #[test]
    fn rent_saturates_at_pool_cap() {
        let cap = rent_pool_cap(30_000);
        assert_eq!(rent_owed(30_000, 0, 3_600_000), cap);
        assert_eq!(rent_owed(30_000, 0, 90_000_000), cap);
        assert!((rent_progress(30_000, 0, 3_600_000) - 1.0).abs() < f64::EPSILON);
        assert!((rent_progress(30_000, 0, 1_800_000) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn clock_skew_owes_nothing() {
        assert_eq!(rent_owed(30_000, 5_000, 1_000), 0);
        assert_eq!(rent_progress(30_000, 5_000, 1_000), 0.0);
    }

    #[test]
    fn fake_news_inverts_direction() {
        assert!(news_change_percent(PriceEffect::Increase, 0.06, false) < 0.0);
        assert!(news_change_percent(PriceEffect::Decrease, 0.06, false) > 0.0);
        assert_eq!(news_change_percent(PriceEffect::Decrease, 0.04, true), -0.04);
    }

    #[test]
    fn drift_stays_in_band() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let drift = random_drift(&mut rng).abs();
            assert!((DRIFT_MIN..=DRIFT_MAX).contains(&drift));
        }
    }

    #[test]
    fn star_bands() {
        assert_eq!(star_rating(1_000_000), 1);
        assert_eq!(star_rating(8_000_000), 3);
        assert_eq!(star_rating(250_000_000), 6);
    }

    proptest! {
        #[test]
        fn prop_price_never_breaks_floor(
            initial in 1_000u64..500_000_000,
            steps in proptest::collection::vec(-0.95f64..0.95, 1..200),
        ) {
            let mut price = initial;
            for step in steps {
                price = next_price(price, step, initial);
                prop_assert!(price as f64 >= initial as f64 * PRICE_FLOOR_RATIO);
            }
        }

        #[test]
        fn prop_rent_never_exceeds_cap(
            monthly_rent in 0u64..10_000_000,
            last in 0u64..1_000_000_000,
            elapsed in 0u64..1_000_000_000,
        ) {
            let owed = rent_owed(monthly_rent, last, last + elapsed);
            prop_assert!(owed <= rent_pool_cap(monthly_rent));
        }
    }
}
