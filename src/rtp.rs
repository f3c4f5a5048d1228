use std::thread;

use anyhow::{Result, anyhow};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::round::{DRAW_MAX, evaluate};
use crate::types::{MAX_CHOSEN, MIN_CHOSEN, RoundInput, RtpReport, RtpSource};

/// Parameters for a Monte-Carlo RTP run.
#[derive(Debug, Clone, Copy)]
pub struct SimulationParams {
    pub rounds: u64,
    pub workers: usize,
    pub bet: f64,
    pub seed: u64,
}

/// Stake and payout accumulated by one worker.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct Totals {
    rounds: u64,
    staked: f64,
    payout: f64,
}

impl Totals {
    fn merge(self, other: Totals) -> Totals {
        Totals {
            rounds: self.rounds + other.rounds,
            staked: self.staked + other.staked,
            payout: self.payout + other.payout,
        }
    }
}

/// Exact RTP of the payout formula when the chosen number is uniform over
/// `1..=99` and the drawn number uniform over `1..=100`.
///
/// The ratio does not depend on the bet size.
pub fn expected_rtp() -> f64 {
    let mut total = 0.0;
    let mut outcomes = 0u32;
    for chosen in MIN_CHOSEN..=MAX_CHOSEN {
        let Ok(input) = RoundInput::new(1.0, chosen) else {
            continue;
        };
        for drawn in 1..=DRAW_MAX {
            total += evaluate(&input, drawn).payout;
            outcomes += 1;
        }
    }
    total / f64::from(outcomes)
}

/// Seed for one worker, spread so neighbouring workers get unrelated streams.
fn worker_seed(seed: u64, worker: usize) -> u64 {
    seed ^ (worker as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

fn run_worker(rounds: u64, bet: f64, seed: u64) -> Result<Totals> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut totals = Totals::default();
    for _ in 0..rounds {
        let chosen = rng.gen_range(MIN_CHOSEN..=MAX_CHOSEN);
        let drawn = rng.gen_range(1..=DRAW_MAX);
        let input = RoundInput::new(bet, chosen)?;
        totals.staked += bet;
        totals.payout += evaluate(&input, drawn).payout;
        totals.rounds += 1;
    }
    Ok(totals)
}

/// Play `rounds` independent rounds split across `workers` threads.
///
/// Each worker owns its generator and returns its own totals; the caller's
/// thread sums them once every worker has finished.
pub fn simulate(params: SimulationParams) -> Result<RtpReport> {
    // Surface an invalid bet before spawning anything.
    RoundInput::new(params.bet, MIN_CHOSEN)?;

    let workers = params.workers.max(1);
    let per_worker = params.rounds / workers as u64;
    let remainder = params.rounds % workers as u64;

    let results: Vec<Result<Totals>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|w| {
                let rounds = per_worker + u64::from((w as u64) < remainder);
                let seed = worker_seed(params.seed, w);
                scope.spawn(move || run_worker(rounds, params.bet, seed))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(totals) => totals,
                Err(_) => Err(anyhow!("simulation worker panicked")),
            })
            .collect()
    });

    let mut totals = Totals::default();
    for result in results {
        let worker_totals = result?;
        debug!(
            "Worker finished {} rounds (payout {:.2})",
            worker_totals.rounds, worker_totals.payout
        );
        totals = totals.merge(worker_totals);
    }

    let rtp = if totals.staked > 0.0 {
        totals.payout / totals.staked
    } else {
        0.0
    };

    Ok(RtpReport {
        timestamp: chrono::Utc::now().to_rfc3339(),
        source: RtpSource::Simulation,
        rounds: totals.rounds,
        workers,
        bet: params.bet,
        total_staked: totals.staked,
        total_payout: totals.payout,
        rtp,
        expected_rtp: expected_rtp(),
        rejected: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn expected_rtp_is_exact() {
        // Sum of all 99 * 100 equally likely unit-bet payouts is 77589.
        assert!(approx_eq(expected_rtp(), 77_589.0 / 9_900.0));
    }

    #[test]
    fn splits_rounds_across_workers() {
        let report = simulate(SimulationParams {
            rounds: 1_003,
            workers: 4,
            bet: 1.0,
            seed: 7,
        })
        .unwrap();
        assert_eq!(report.rounds, 1_003);
        assert_eq!(report.workers, 4);
        assert!(approx_eq(report.total_staked, 1_003.0));
        assert_eq!(report.source, RtpSource::Simulation);
    }

    #[test]
    fn zero_workers_runs_on_one() {
        let report = simulate(SimulationParams {
            rounds: 10,
            workers: 0,
            bet: 1.0,
            seed: 1,
        })
        .unwrap();
        assert_eq!(report.workers, 1);
        assert_eq!(report.rounds, 10);
    }

    #[test]
    fn zero_rounds_reports_zero_rtp() {
        let report = simulate(SimulationParams {
            rounds: 0,
            workers: 3,
            bet: 1.0,
            seed: 1,
        })
        .unwrap();
        assert_eq!(report.rtp, 0.0);
        assert_eq!(report.total_payout, 0.0);
    }

    #[test]
    fn rejects_invalid_bet() {
        let err = simulate(SimulationParams {
            rounds: 10,
            workers: 2,
            bet: 0.0,
            seed: 1,
        });
        assert!(err.is_err());
    }

    #[test]
    fn same_seed_same_totals() {
        let params = SimulationParams {
            rounds: 20_000,
            workers: 3,
            bet: 2.0,
            seed: 42,
        };
        let a = simulate(params).unwrap();
        let b = simulate(params).unwrap();
        assert_eq!(a.total_payout, b.total_payout);
    }

    #[test]
    fn converges_to_expected_rtp() {
        // Per-round payout std dev for a unit bet is about 23.4, so the
        // standard error at 400k rounds is about 0.037.
        let report = simulate(SimulationParams {
            rounds: 400_000,
            workers: 8,
            bet: 1.0,
            seed: 0x5EED,
        })
        .unwrap();
        let diff = (report.rtp - report.expected_rtp).abs();
        assert!(
            diff < 0.25,
            "rtp {} vs expected {} (diff {diff})",
            report.rtp,
            report.expected_rtp
        );
    }

    #[test]
    fn rtp_independent_of_bet_size() {
        let params = |bet| SimulationParams {
            rounds: 400_000,
            workers: 4,
            bet,
            seed: 99,
        };
        let unit = simulate(params(1.0)).unwrap();
        let big = simulate(params(5.0)).unwrap();
        assert!((unit.rtp - unit.expected_rtp).abs() < 0.25);
        assert!((big.rtp - big.expected_rtp).abs() < 0.25);
        // Same seed, same draws: payouts scale exactly with the bet.
        assert!((big.total_payout - 5.0 * unit.total_payout).abs() < 1e-6 * big.total_payout);
    }
}
