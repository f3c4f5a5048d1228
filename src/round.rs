use crate::types::{RoundInput, RoundResult};

/// Numerator of the payout multiplier.
const MULTIPLIER_NUMERATOR: u32 = 99;

/// Upper bound (inclusive) of the server's drawn number.
pub const DRAW_MAX: u8 = 100;

/// Payout multiplier for a chosen number: `99 / (100 - chosen)`, truncated.
///
/// `chosen` must be in `1..=99`; `RoundInput` guarantees this for every
/// evaluated round.
pub fn multiplier(chosen: u8) -> u32 {
    debug_assert!((1..DRAW_MAX).contains(&chosen));
    MULTIPLIER_NUMERATOR / (u32::from(DRAW_MAX) - u32::from(chosen))
}

/// Evaluate one round against the server's drawn number.
///
/// - chosen > drawn: the player wins twice the multiplied bet
/// - chosen == drawn: the stake is returned
/// - chosen < drawn: the stake is lost
pub fn evaluate(input: &RoundInput, drawn: u8) -> RoundResult {
    let bet = input.bet();
    let chosen = input.chosen_number();
    let raw_win = bet * f64::from(multiplier(chosen));

    let payout = match chosen.cmp(&drawn) {
        std::cmp::Ordering::Greater => raw_win * 2.0,
        std::cmp::Ordering::Equal => bet,
        std::cmp::Ordering::Less => 0.0,
    };
    RoundResult { payout }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn payout(bet: f64, chosen: i64, drawn: u8) -> f64 {
        let input = RoundInput::new(bet, chosen).expect("valid test input");
        evaluate(&input, drawn).payout
    }

    // ── multiplier ─────────────────────────────────────────────────

    #[test]
    fn multiplier_bounds() {
        assert_eq!(multiplier(1), 1);
        assert_eq!(multiplier(99), 99);
    }

    #[test]
    fn multiplier_truncates() {
        // 99 / 50 = 1.98
        assert_eq!(multiplier(50), 1);
        // 99 / 34 = 2.91
        assert_eq!(multiplier(66), 2);
        assert_eq!(multiplier(67), 3);
        assert_eq!(multiplier(98), 49);
    }

    #[test]
    fn multiplier_non_decreasing() {
        for c in 1..98u8 {
            assert!(
                multiplier(c) <= multiplier(c + 1),
                "multiplier({c}) > multiplier({})",
                c + 1
            );
        }
        assert!(multiplier(1) < multiplier(99));
    }

    // ── evaluate ───────────────────────────────────────────────────

    #[test]
    fn win_doubles_multiplied_bet() {
        assert!(approx_eq(payout(1.0, 50, 10), 2.0));
        assert!(approx_eq(payout(1.0, 99, 98), 198.0));
        assert!(approx_eq(payout(3.0, 67, 1), 18.0));
    }

    #[test]
    fn tie_returns_stake() {
        assert!(approx_eq(payout(1.0, 50, 50), 1.0));
        assert!(approx_eq(payout(2.5, 1, 1), 2.5));
        assert!(approx_eq(payout(7.25, 99, 99), 7.25));
    }

    #[test]
    fn loss_pays_nothing() {
        assert_eq!(payout(1.0, 50, 90), 0.0);
        assert_eq!(payout(1.0, 99, 100), 0.0);
        assert_eq!(payout(10.0, 1, 2), 0.0);
    }

    #[test]
    fn chosen_one_never_wins() {
        // No draw is below 1, so the best outcome is a tie.
        for drawn in 1..=DRAW_MAX {
            assert!(payout(1.0, 1, drawn) <= 1.0);
        }
    }

    #[test]
    fn matches_formula_for_every_pair() {
        let bet = 1.5;
        for chosen in 1..=99u8 {
            let m = f64::from(99 / (100 - u32::from(chosen)));
            for drawn in 1..=DRAW_MAX {
                let expected = if drawn < chosen {
                    2.0 * bet * m
                } else if drawn == chosen {
                    bet
                } else {
                    0.0
                };
                let got = payout(bet, i64::from(chosen), drawn);
                assert!(approx_eq(got, expected), "chosen={chosen} drawn={drawn}");
            }
        }
    }

    #[test]
    fn evaluate_is_deterministic() {
        let input = RoundInput::new(4.2, 73).unwrap();
        let first = evaluate(&input, 12);
        for _ in 0..10 {
            assert_eq!(evaluate(&input, 12), first);
        }
    }

    #[test]
    fn win_probability_shrinks_with_lower_chosen() {
        let winning_draws =
            |chosen: u8| (1..=DRAW_MAX).filter(|&d| d < chosen).count();
        for c in 2..=99u8 {
            assert!(winning_draws(c - 1) < winning_draws(c));
        }
    }
}
