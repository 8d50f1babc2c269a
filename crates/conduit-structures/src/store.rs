use conduit_core::fixed::Fixed64;
use serde::{Deserialize, Serialize};

/// A capacity-gated amount of a single resource.
///
/// `add` does not clamp: the capacity gates the owner's pull loop (a full
/// store stops requesting), not the deposit itself, so an in-flight delivery
/// is never silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceStore {
    capacity: Fixed64,
    amount: Fixed64,
}

impl ResourceStore {
    pub fn new(capacity: Fixed64) -> Self {
        Self {
            capacity,
            amount: Fixed64::ZERO,
        }
    }

    pub fn with_amount(capacity: Fixed64, amount: Fixed64) -> Self {
        Self { capacity, amount }
    }

    pub fn capacity(&self) -> Fixed64 {
        self.capacity
    }

    pub fn amount(&self) -> Fixed64 {
        self.amount
    }

    pub fn is_full(&self) -> bool {
        self.amount >= self.capacity
    }

    /// Deposit `amount` and return how much was added.
    pub fn add(&mut self, amount: Fixed64) -> Fixed64 {
        let new_amount = self.amount + amount;
        let added = new_amount - self.amount;
        self.amount = new_amount;
        added
    }

    /// Withdraw up to `amount` and return how much actually came out.
    pub fn take(&mut self, amount: Fixed64) -> Fixed64 {
        let new_amount = (self.amount - amount).max(Fixed64::ZERO);
        let removed = self.amount - new_amount;
        self.amount = new_amount;
        removed
    }
}
