//! Coin selection
//!
//! Pure selection logic: given the ordered unspent set and a target amount,
//! decide which coins to spend. No I/O, which keeps the algorithm trivially
//! testable and deterministic.
//!
//! # Algorithm
//!
//! Greedy oldest-first accumulation: walk the ordered sequence, accumulate
//! amounts, stop as soon as the running total reaches the target. Oldest-first
//! trades optimal fragmentation for predictability and auditability, which is
//! the right trade at the coin counts this ledger sees.

use crate::types::CoinRecord;
use rust_decimal::Decimal;

/// Result of a selection pass
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// The coins to spend, in selection order
    ///
    /// Meaningless when `covered` is false; callers must discard it.
    pub chosen: Vec<CoinRecord>,

    /// Sum of the chosen amounts
    pub total: Decimal,

    /// Whether the running total reached the target
    pub covered: bool,
}

impl Selection {
    /// Surplus over the target, i.e. the change a transfer would produce
    ///
    /// Zero when the selection lands exactly on the target. Only meaningful
    /// when `covered` is true.
    pub fn surplus(&self, target: Decimal) -> Decimal {
        self.total - target
    }
}

/// Select coins covering `target` from an oldest-first unspent set
///
/// Walks `coins` in order, accumulating amounts until the running total
/// reaches `target`. Given the same ordered input and target, the result is
/// always identical.
///
/// # Arguments
///
/// * `coins` - Unspent coins sorted by `created_at` ascending
/// * `target` - Positive native-unit amount to cover
///
/// # Returns
///
/// A `Selection` with `covered == true` and the chosen subset, or
/// `covered == false` if the whole sequence sums to less than `target`.
pub fn select_coins(coins: &[CoinRecord], target: Decimal) -> Selection {
    let mut chosen = Vec::new();
    let mut total = Decimal::ZERO;

    for coin in coins {
        total += coin.amount;
        chosen.push(coin.clone());

        if total >= target {
            return Selection {
                chosen,
                total,
                covered: true,
            };
        }
    }

    Selection {
        chosen,
        total,
        covered: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rstest::rstest;
    use rust_decimal::Decimal;

    /// Build an oldest-first unspent set from native-unit amounts
    fn coin_set(amounts: &[i64]) -> Vec<CoinRecord> {
        let base = Utc::now();
        amounts
            .iter()
            .enumerate()
            .map(|(i, &a)| {
                CoinRecord::with_parts(
                    format!("coin-{}", i),
                    Decimal::new(a, 4),
                    false,
                    base + Duration::seconds(i as i64),
                )
            })
            .collect()
    }

    #[rstest]
    #[case::first_coin_exact(&[50000, 30000], 50000, &["coin-0"], 50000)]
    #[case::first_coin_covers(&[50000, 30000], 40000, &["coin-0"], 50000)]
    #[case::two_coins_needed(&[50000, 30000], 60000, &["coin-0", "coin-1"], 80000)]
    #[case::all_coins_exact(&[50000, 30000], 80000, &["coin-0", "coin-1"], 80000)]
    #[case::single_tiny_target(&[10, 10, 10], 5, &["coin-0"], 10)]
    fn test_select_covers_target(
        #[case] amounts: &[i64],
        #[case] target: i64,
        #[case] expected_ids: &[&str],
        #[case] expected_total: i64,
    ) {
        let coins = coin_set(amounts);
        let selection = select_coins(&coins, Decimal::new(target, 4));

        assert!(selection.covered);
        let ids: Vec<&str> = selection.chosen.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, expected_ids);
        assert_eq!(selection.total, Decimal::new(expected_total, 4));
    }

    #[rstest]
    #[case::empty_set(&[], 10000)]
    #[case::single_short(&[50000], 60000)]
    #[case::all_short(&[10000, 20000, 30000], 70000)]
    fn test_select_insufficient(#[case] amounts: &[i64], #[case] target: i64) {
        let coins = coin_set(amounts);
        let selection = select_coins(&coins, Decimal::new(target, 4));

        assert!(!selection.covered);
        // The partial accumulation sums the whole set
        let set_total: Decimal = coins.iter().map(|c| c.amount).sum();
        assert_eq!(selection.total, set_total);
    }

    #[test]
    fn test_selection_is_deterministic() {
        let coins = coin_set(&[12345, 6789, 424242, 99]);
        let target = Decimal::new(400000, 4);

        let first = select_coins(&coins, target);
        for _ in 0..10 {
            assert_eq!(select_coins(&coins, target), first);
        }
    }

    #[test]
    fn test_surplus_is_change_amount() {
        let coins = coin_set(&[50000, 30000]);
        let target = Decimal::new(40000, 4);

        let selection = select_coins(&coins, target);
        assert_eq!(selection.surplus(target), Decimal::new(10000, 4));
    }

    #[test]
    fn test_exact_match_has_zero_surplus() {
        let coins = coin_set(&[50000]);
        let target = Decimal::new(50000, 4);

        let selection = select_coins(&coins, target);
        assert!(selection.covered);
        assert_eq!(selection.surplus(target), Decimal::ZERO);
    }
}
