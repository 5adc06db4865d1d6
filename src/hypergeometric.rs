//! Closed-form draw probabilities.

/// Probability of seeing at least one of `successes` marked cards when
/// drawing `draws` cards without replacement from `population`.
///
/// Computes `1 - C(N-K, n) / C(N, n)` as the running product
/// `prod (N-K-i) / (N-i)`, which stays exact at deck-sized inputs.
/// `successes` and `draws` are clamped to the population.
pub fn at_least_one(population: u32, successes: u32, draws: u32) -> f64 {
    if population == 0 {
        return 0.0;
    }
    let k = successes.min(population);
    let n = draws.min(population);
    if k == 0 || n == 0 {
        return 0.0;
    }
    if n > population - k {
        return 1.0;
    }

    let mut miss = 1.0;
    for i in 0..n {
        miss *= f64::from(population - k - i) / f64::from(population - i);
    }
    1.0 - miss
}

/// Cards seen by the given turn: the opening hand plus one draw per turn,
/// skipping the first draw when on the play.
pub fn cards_seen(hand_size: u32, turn: u32, on_the_play: bool) -> u32 {
    let draws = if on_the_play { turn.saturating_sub(1) } else { turn };
    hand_size.saturating_add(draws)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_commander_reference_values() {
        assert!(close(at_least_one(99, 37, 7), 0.96696));
        assert!(close(at_least_one(99, 37, 9), 0.98828));
        assert!(close(at_least_one(99, 37, 11), 0.99597));
        assert!(close(at_least_one(99, 40, 9), 0.99274));
        assert!(close(at_least_one(99, 10, 9), 0.63280));
    }

    #[test]
    fn test_single_copy_is_draws_over_population() {
        assert!((at_least_one(99, 1, 7) - 7.0 / 99.0).abs() < 1e-12);
    }

    #[test]
    fn test_edges() {
        assert_eq!(at_least_one(0, 0, 7), 0.0);
        assert_eq!(at_least_one(99, 0, 7), 0.0);
        assert_eq!(at_least_one(99, 37, 0), 0.0);
        assert_eq!(at_least_one(99, 99, 1), 1.0);
        // more draws than non-sources guarantees a hit
        assert_eq!(at_least_one(10, 5, 6), 1.0);
        // clamped draws
        assert_eq!(at_least_one(10, 1, 50), 1.0);
    }

    #[test]
    fn test_monotone_in_sources_and_draws() {
        for n in [7, 9, 11] {
            let mut last = 0.0;
            for k in 0..=99 {
                let p = at_least_one(99, k, n);
                assert!(p >= last, "K={} n={} decreased", k, n);
                last = p;
            }
        }
        for k in [1, 10, 37] {
            let mut last = 0.0;
            for n in 0..=99 {
                let p = at_least_one(99, k, n);
                assert!(p >= last, "K={} n={} decreased", k, n);
                last = p;
            }
        }
    }

    #[test]
    fn test_cards_seen() {
        assert_eq!(cards_seen(7, 1, true), 7);
        assert_eq!(cards_seen(7, 3, true), 9);
        assert_eq!(cards_seen(7, 5, true), 11);
        assert_eq!(cards_seen(7, 1, false), 8);
    }
}
