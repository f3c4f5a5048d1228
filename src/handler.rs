use crate::rng::{DrawSource, ThreadRngDraw};
use crate::round::evaluate;
use crate::types::{RoundError, RoundInput};

/// Parse a `"<bet>,<chosen>"` payload into a validated round.
///
/// Surrounding whitespace on either field is ignored.
pub fn parse_request(payload: &str) -> Result<RoundInput, RoundError> {
    let fields: Vec<&str> = payload.split(',').map(str::trim).collect();
    let [bet, chosen] = fields[..] else {
        return Err(RoundError::FieldCount(fields.len()));
    };

    let bet: f64 = bet
        .parse()
        .map_err(|_| RoundError::InvalidBet(bet.to_string()))?;
    let chosen: i64 = chosen
        .parse()
        .map_err(|_| RoundError::InvalidChosenNumber(chosen.to_string()))?;

    RoundInput::new(bet, chosen)
}

/// Decimal text of a payout, always with a fractional part (`2.0`, not `2`).
pub fn format_payout(payout: f64) -> String {
    format!("{payout:?}")
}

/// Plays one round per inbound payload.
///
/// Holds no per-round state; share one instance across all connections.
#[derive(Debug, Default)]
pub struct RoundHandler<D = ThreadRngDraw> {
    draws: D,
}

impl<D: DrawSource> RoundHandler<D> {
    pub fn new(draws: D) -> Self {
        Self { draws }
    }

    /// Parse, draw, evaluate, and format the reply for one payload.
    ///
    /// A rejected payload never consumes a draw.
    pub fn handle(&self, payload: &str) -> Result<String, RoundError> {
        let input = parse_request(payload)?;
        let drawn = self.draws.draw();
        let result = evaluate(&input, drawn);
        Ok(format_payout(result.payout))
    }
}
