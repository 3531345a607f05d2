//! Payout multiplier math.
//!
//! The multiplier only depends on the board size, the mine count and how many
//! gems have been revealed so far, never on which tiles were picked.

use crate::{Coins, DEFAULT_HOUSE_EDGE, TileCount};

/// Number of decimal digits a multiplier is rounded to before it is shown or paid.
pub const MULTIPLIER_DECIMALS: i32 = 4;

/// Binomial coefficient `C(n, k)` using the multiplicative method.
///
/// Evaluated in `f64` one factor at a time so large boards never overflow an
/// intermediate factorial.
pub fn binomial(n: TileCount, k: TileCount) -> f64 {
    if k > n {
        return 0.0;
    }
    if k == 0 || k == n {
        return 1.0;
    }
    let k = if k > n / 2 { n - k } else { k };
    let n = f64::from(n);

    let mut result = 1.0;
    for i in 1..=k {
        let i = f64::from(i);
        result = result * (n - i + 1.0) / i;
    }
    result
}

/// Rounds to [`MULTIPLIER_DECIMALS`] places using the exact binary value of
/// `value`, with exact ties going away from zero.
///
/// Scaling the float first would round twice: `359.74125` is stored slightly
/// below the tie and must come out as `359.7412`.
pub fn round_multiplier(value: f64) -> f64 {
    if !value.is_finite() || value == 0.0 {
        return value;
    }
    let scale = 10u64.pow(MULTIPLIER_DECIMALS as u32);

    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let fraction = bits & ((1 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), biased - 1075)
    };
    if exponent >= 0 {
        // already an integer
        return value;
    }

    // |value| * scale == scaled / 2^shift exactly
    let scaled = u128::from(mantissa) * u128::from(scale);
    let shift = exponent.unsigned_abs();
    let units = if shift >= 128 {
        0
    } else {
        let half = 1u128 << (shift - 1);
        let remainder = scaled & ((1u128 << shift) - 1);
        (scaled >> shift) + u128::from(remainder >= half)
    };

    // parsing the decimal string rounds once, even past 2^53 units
    format!("{units}e-{MULTIPLIER_DECIMALS}")
        .parse::<f64>()
        .map_or(value, |rounded| rounded.copysign(value))
}

/// Multiplier with the default house edge.
pub fn multiplier(total_tiles: TileCount, mines: TileCount, revealed_safe: TileCount) -> f64 {
    multiplier_with_edge(DEFAULT_HOUSE_EDGE, total_tiles, mines, revealed_safe)
}

/// Payout multiplier after `revealed_safe` gems were found in a row.
///
/// Returns exactly `1.0` before any reveal and `0.0` when more gems are claimed
/// than the board holds.
pub fn multiplier_with_edge(
    house_edge: f64,
    total_tiles: TileCount,
    mines: TileCount,
    revealed_safe: TileCount,
) -> f64 {
    if revealed_safe == 0 {
        return 1.0;
    }
    let safe_tiles = total_tiles.saturating_sub(mines);
    if revealed_safe > safe_tiles {
        log::trace!(
            "{} reveals exceed {} safe tiles, multiplier is zero",
            revealed_safe,
            safe_tiles
        );
        return 0.0;
    }

    let probability = binomial(safe_tiles, revealed_safe) / binomial(total_tiles, revealed_safe);
    let multiplier = house_edge / probability;
    if !multiplier.is_finite() {
        log::warn!(
            "Multiplier for {} of {} safe tiles on {} overflowed, paying nothing",
            revealed_safe,
            safe_tiles,
            total_tiles
        );
        return 0.0;
    }
    round_multiplier(multiplier)
}

/// Coins returned for `bet` at `multiplier`. Not rounded.
pub fn payout(bet: Coins, multiplier: f64) -> Coins {
    bet * multiplier
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn binomial_small_values() {
        assert_eq!(binomial(5, 0), 1.0);
        assert_eq!(binomial(5, 5), 1.0);
        assert_eq!(binomial(5, 2), 10.0);
        assert_eq!(binomial(25, 3), 2300.0);
        assert_eq!(binomial(4, 7), 0.0);
    }

    #[test]
    fn binomial_stays_finite_for_large_boards() {
        let value = binomial(400, 200);
        assert!(value.is_finite());
        assert!(value > 1e100);
    }

    #[test]
    fn no_reveal_keeps_the_stake() {
        for mines in 1..25 {
            assert_eq!(multiplier(25, mines, 0), 1.0);
        }
    }

    #[test]
    fn first_gem_with_three_mines() {
        // 0.99 / (22 / 25)
        assert_eq!(multiplier(25, 3, 1), 1.125);
    }

    #[test]
    fn single_mine_first_gem_is_rounded() {
        // 0.99 * 25 / 24 = 1.03125
        assert_eq!(multiplier(25, 1, 1), 1.0313);
        assert_eq!(multiplier(25, 1, 2), 1.0761);
    }

    #[test]
    fn full_clear_is_finite() {
        // C(22, 22) / C(25, 22) = 1 / 2300
        assert_eq!(multiplier(25, 3, 22), 2277.0);
        assert_eq!(multiplier(25, 24, 1), 24.75);
    }

    #[test]
    fn overshooting_safe_tiles_returns_zero() {
        assert_eq!(multiplier(25, 3, 23), 0.0);
        assert_eq!(multiplier(25, 25, 1), 0.0);
    }

    #[test]
    fn house_edge_scales_linearly() {
        assert_eq!(multiplier_with_edge(1.0, 25, 3, 1), 1.1364);
        assert_eq!(multiplier_with_edge(0.5, 25, 3, 1), 0.5682);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        // 1.03125 is exact in binary, so this is a true tie
        assert_eq!(round_multiplier(1.03125), 1.0313);
        assert_eq!(round_multiplier(-1.03125), -1.0313);
        assert_eq!(round_multiplier(2.00004), 2.0);
        assert_eq!(round_multiplier(1.23456), 1.2346);
    }

    #[test]
    fn near_ties_round_on_the_stored_value() {
        // raw values print as 359.74125 and 1.85625 but sit just below the tie
        for (total, mines, revealed, expected) in [
            (21, 5, 13, 359.7412),
            (15, 1, 7, 1.8562),
            (25, 1, 1, 1.0313),
            (25, 3, 1, 1.125),
        ] {
            assert_eq!(
                multiplier(total, mines, revealed),
                expected,
                "{total} tiles, {mines} mines, {revealed} revealed"
            );
        }
    }

    #[test]
    fn overflowing_binomials_pay_nothing() {
        assert_eq!(multiplier_with_edge(0.99, 2000, 1, 1000), 0.0);
    }

    #[test]
    fn payout_is_bet_times_multiplier() {
        assert_eq!(payout(10.0, 1.125), 11.25);
        assert_eq!(payout(10.0, 0.0), 0.0);
    }

    proptest! {
        #[test]
        // Past ~100 tiles a single mine makes the first edged step dip below 1.0.
        fn multiplier_strictly_increases(total in 2u16..=64, mines_seed in 0u16..64) {
            let mines = 1 + mines_seed % (total - 1);
            let safe = total - mines;
            let mut previous = multiplier(total, mines, 0);
            for revealed in 1..=safe {
                let current = multiplier(total, mines, revealed);
                prop_assert!(current.is_finite());
                prop_assert!(
                    current > previous,
                    "total={} mines={} revealed={} {} <= {}",
                    total, mines, revealed, current, previous
                );
                previous = current;
            }
        }
    }
}
