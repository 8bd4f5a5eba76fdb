//! Per-user experience and currency counters.
//!
//! Counters live in memory for the lifetime of the process. The
//! [`CounterStore`] trait is the seam a persistent backend would plug into.

use dashmap::DashMap;
use poise::serenity_prelude::UserId;
use thiserror::Error;

/// Counter values for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub experience: u64,
    pub currency: u64,
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("balance of {balance} is below the required {required}")]
pub struct InsufficientFunds {
    pub balance: u64,
    pub required: u64,
}

pub trait CounterStore: Send + Sync {
    /// Add one to both counters, creating the user at zero first if unseen.
    fn increment(&self, user_id: UserId) -> Counters;

    /// Current counters, `(0, 0)` for unseen users.
    fn read(&self, user_id: UserId) -> Counters;

    /// Take `amount` from the user's currency. The balance check and the
    /// subtraction happen under the same lock.
    fn debit(&self, user_id: UserId, amount: u64) -> Result<Counters, InsufficientFunds>;
}

#[derive(Default)]
pub struct MemoryCounterStore {
    counters: DashMap<UserId, Counters>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a user's counters. Used to seed balances.
    pub fn set(&self, user_id: UserId, counters: Counters) {
        self.counters.insert(user_id, counters);
    }
}

impl CounterStore for MemoryCounterStore {
    fn increment(&self, user_id: UserId) -> Counters {
        let mut entry = self.counters.entry(user_id).or_default();
        entry.experience = entry.experience.saturating_add(1);
        entry.currency = entry.currency.saturating_add(1);
        *entry
    }

    fn read(&self, user_id: UserId) -> Counters {
        self.counters
            .get(&user_id)
            .map(|entry| *entry)
            .unwrap_or_default()
    }

    fn debit(&self, user_id: UserId, amount: u64) -> Result<Counters, InsufficientFunds> {
        let mut entry = self.counters.entry(user_id).or_default();
        if entry.currency < amount {
            return Err(InsufficientFunds {
                balance: entry.currency,
                required: amount,
            });
        }
        entry.currency -= amount;
        Ok(*entry)
    }
}
