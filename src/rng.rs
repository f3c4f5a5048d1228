use std::collections::VecDeque;
use std::sync::Mutex;

use rand::Rng;

use crate::round::DRAW_MAX;

/// Source of the server's drawn number.
///
/// Implementations must be safe to share between connection tasks.
pub trait DrawSource: Send + Sync {
    /// Uniform integer in `low..=high`.
    fn draw_uniform(&self, low: u8, high: u8) -> u8;

    /// Draw for one round: uniform over `1..=100`.
    fn draw(&self) -> u8 {
        self.draw_uniform(1, DRAW_MAX)
    }
}

/// Draws from `rand::thread_rng()`.
///
/// Each OS thread owns its own generator, so concurrent rounds never contend
/// for or correlate through a shared one. Not cryptographically secure.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngDraw;

impl DrawSource for ThreadRngDraw {
    fn draw_uniform(&self, low: u8, high: u8) -> u8 {
        rand::thread_rng().gen_range(low..=high)
    }
}

/// Replays a fixed sequence of draws, then repeats the last one.
///
/// Lets tests pin the drawn number of every round.
#[derive(Debug)]
pub struct ScriptedDraw {
    draws: Mutex<VecDeque<u8>>,
    last: u8,
}

impl ScriptedDraw {
    pub fn new(draws: impl IntoIterator<Item = u8>) -> Self {
        let draws: VecDeque<u8> = draws.into_iter().collect();
        let last = draws.back().copied().unwrap_or(DRAW_MAX);
        Self {
            draws: Mutex::new(draws),
            last,
        }
    }

    /// Always draws `value`.
    pub fn fixed(value: u8) -> Self {
        Self::new([value])
    }
}

impl DrawSource for ScriptedDraw {
    fn draw_uniform(&self, low: u8, high: u8) -> u8 {
        let next = match self.draws.lock() {
            Ok(mut draws) => draws.pop_front().unwrap_or(self.last),
            Err(poisoned) => poisoned.into_inner().pop_front().unwrap_or(self.last),
        };
        next.clamp(low, high)
    }
}
