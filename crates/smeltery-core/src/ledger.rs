//! Shared resource balances.
//!
//! Each resource has its own slot lock, so producers of different resources
//! never contend. Multi-resource operations take every slot lock in
//! [`ResourceType::ALL`] order (Iron, Copper, Gold) and hold them for the
//! whole check-then-debit step, which makes a debit atomic with respect to
//! every other ledger operation and rules out lock-order deadlocks.

use parking_lot::{Mutex, MutexGuard};
use std::fmt;

use crate::level::UpgradeCost;
use crate::resource::{ResourceMap, ResourceType};

/// Point-in-time balances of every resource.
pub type Balances = ResourceMap<u64>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// One resource the ledger could not cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub resource: ResourceType,
    pub required: u64,
    pub available: u64,
}

/// A debit was refused. Lists every short resource, not just the first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct InsufficientResources {
    shortfalls: Vec<Shortfall>,
}

impl InsufficientResources {
    pub fn new(shortfalls: Vec<Shortfall>) -> Self {
        Self { shortfalls }
    }

    pub fn shortfalls(&self) -> &[Shortfall] {
        &self.shortfalls
    }

    /// The resources that were short, in lock order.
    pub fn missing(&self) -> Vec<ResourceType> {
        self.shortfalls.iter().map(|s| s.resource).collect()
    }
}

impl fmt::Display for InsufficientResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("payment error: ")?;
        for (i, s) in self.shortfalls.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(
                f,
                "not enough {} (need {}, have {})",
                s.resource, s.required, s.available
            )?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Non-negative balance per resource, mutated only by [`Ledger::accumulate`]
/// and [`Ledger::try_debit_all`].
#[derive(Debug, Default)]
pub struct Ledger {
    slots: ResourceMap<Mutex<u64>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger seeded with the given balances.
    pub fn with_balances(initial: Balances) -> Self {
        Self {
            slots: initial.map(|_, amount| Mutex::new(*amount)),
        }
    }

    /// Add `amount` to `resource`. Serialized per resource only.
    ///
    /// A balance never exceeds `u64::MAX`; the excess is dropped and logged
    /// at `warn`.
    pub fn accumulate(&self, resource: ResourceType, amount: u64) {
        let mut balance = self.slots[resource].lock();
        *balance = match balance.checked_add(amount) {
            Some(total) => total,
            None => {
                log::warn!(
                    "ledger {resource} balance capped at {}, dropped {} of +{amount}",
                    u64::MAX,
                    amount - (u64::MAX - *balance)
                );
                u64::MAX
            }
        };
        log::debug!("ledger {resource} +{amount} -> {}", *balance);
    }

    pub fn balance(&self, resource: ResourceType) -> u64 {
        *self.slots[resource].lock()
    }

    /// Read each balance under its own slot lock.
    ///
    /// Fields are read one after another, so a debit may land between two
    /// reads. Use [`Ledger::snapshot`] when a linearizable view is needed.
    pub fn balances(&self) -> Balances {
        ResourceMap::from_fn(|r| self.balance(r))
    }

    /// Read every balance while holding all slot locks at once.
    pub fn snapshot(&self) -> Balances {
        let guards = self.lock_all();
        guards.map(|_, g| **g)
    }

    /// Debit every amount named in `cost`, or nothing at all.
    ///
    /// All slot locks are held from the first check to the last subtraction,
    /// so no accumulate, debit or snapshot can observe the step half done.
    pub fn try_debit_all(&self, cost: &UpgradeCost) -> Result<Balances, InsufficientResources> {
        let mut guards = self.lock_all();

        let shortfalls: Vec<Shortfall> = cost
            .iter()
            .filter_map(|(resource, required)| {
                let available = *guards[resource];
                (available < required).then_some(Shortfall {
                    resource,
                    required,
                    available,
                })
            })
            .collect();
        if !shortfalls.is_empty() {
            return Err(InsufficientResources::new(shortfalls));
        }

        for (resource, required) in cost.iter() {
            *guards[resource] -= required;
        }
        Ok(guards.map(|_, g| **g))
    }

    /// Acquire every slot lock in lock order.
    fn lock_all(&self) -> ResourceMap<MutexGuard<'_, u64>> {
        // Struct fields are evaluated in written order: iron, copper, gold.
        ResourceMap {
            iron: self.slots.iron.lock(),
            copper: self.slots.copper.lock(),
            gold: self.slots.gold.lock(),
        }
    }
}
