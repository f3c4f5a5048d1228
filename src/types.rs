use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reason a single round was rejected before evaluation.
///
/// Every variant is local to one round; the connection that sent the payload
/// stays open for the next request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoundError {
    #[error("expected 2 comma-separated fields, got {0}")]
    FieldCount(usize),
    #[error("bet {0:?} is not a decimal number")]
    InvalidBet(String),
    #[error("chosen number {0:?} is not an integer")]
    InvalidChosenNumber(String),
    #[error("bet must be positive, got {0}")]
    NonPositiveBet(f64),
    #[error("chosen number must be between 1 and 99, got {0}")]
    ChosenNumberOutOfRange(i64),
}

/// A validated bet: positive finite stake and a chosen number in `1..=99`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundInput {
    bet: f64,
    chosen_number: u8,
}

/// Lowest number a player may choose.
pub const MIN_CHOSEN: i64 = 1;

/// Highest number a player may choose. 100 would divide by zero in the multiplier.
pub const MAX_CHOSEN: i64 = 99;

impl RoundInput {
    pub fn new(bet: f64, chosen_number: i64) -> Result<Self, RoundError> {
        if !bet.is_finite() || bet <= 0.0 {
            return Err(RoundError::NonPositiveBet(bet));
        }
        if !(MIN_CHOSEN..=MAX_CHOSEN).contains(&chosen_number) {
            return Err(RoundError::ChosenNumberOutOfRange(chosen_number));
        }
        Ok(Self {
            bet,
            // Range checked above.
            chosen_number: chosen_number as u8,
        })
    }

    pub fn bet(&self) -> f64 {
        self.bet
    }

    pub fn chosen_number(&self) -> u8 {
        self.chosen_number
    }
}

/// Outcome of one evaluated round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundResult {
    pub payout: f64,
}

/// Aggregate of a batch of rounds, emitted as JSON by the reporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RtpReport {
    pub timestamp: String,
    pub source: RtpSource,
    pub rounds: u64,
    pub workers: usize,
    pub bet: f64,
    pub total_staked: f64,
    pub total_payout: f64,
    /// Observed `total_payout / total_staked`.
    pub rtp: f64,
    /// Analytic RTP of the payout formula for uniform chosen numbers.
    pub expected_rtp: f64,
    /// Rounds the server rejected (only non-zero for probes over the wire).
    #[serde(default)]
    pub rejected: u64,
}

/// Where an `RtpReport`'s rounds were played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RtpSource {
    Simulation,
    Probe,
}
