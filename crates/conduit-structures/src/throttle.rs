use conduit_core::fixed::Fixed64;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Shared game-time clock, in seconds. Structures capture a clone in their
/// ask-callbacks; the host advances it once per frame.
#[derive(Debug, Clone, Default)]
pub struct GameClock(Rc<RefCell<Fixed64>>);

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Fixed64 {
        *self.0.borrow()
    }

    pub fn advance(&self, dt: Fixed64) {
        *self.0.borrow_mut() += dt;
    }
}

/// Caps production at a rate per game second by crediting the time elapsed
/// since the previous ask. A drained generator simply grants less; it never
/// over-grants, which is what lets the line re-ask it across fair-share
/// rounds safely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottledGenerator {
    rate_per_second: Fixed64,
    last_generation: Fixed64,
}

impl ThrottledGenerator {
    pub fn new(rate_per_second: Fixed64, now: Fixed64) -> Self {
        Self {
            rate_per_second,
            last_generation: now,
        }
    }

    /// Grant up to `amount`, limited by what accumulated since the last ask.
    pub fn generate(&mut self, amount: Fixed64, now: Fixed64) -> Fixed64 {
        let elapsed = now - self.last_generation;
        self.last_generation = now;
        let available = elapsed * self.rate_per_second;
        amount.min(available).max(Fixed64::ZERO)
    }
}
