//! Shared test helpers for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use std::time::Duration;

use crate::economy::Economy;
use crate::ledger::Balances;
use crate::level::{FactoryLevel, LevelTable, UpgradeCost};
use crate::resource::{ResourceMap, ResourceType};

// ===========================================================================
// Level tables
// ===========================================================================

/// Three-tier ladders with one-second ticks and two-second cooldowns.
///
/// Production per tick is `base`, `2 * base`, `4 * base` with
/// `base` = 1 (iron), 5 (copper), 1 (gold). Every upgrade costs 10 of the
/// factory's own resource, plus 1 gold for iron and copper.
pub fn fast_table() -> LevelTable {
    let ladder = |resource: ResourceType, base: u64| {
        (1..=3u32)
            .map(|tier| {
                let upgrade_cost = if tier == 3 {
                    UpgradeCost::new()
                } else if resource == ResourceType::Gold {
                    UpgradeCost::new().with(ResourceType::Gold, 10)
                } else {
                    UpgradeCost::new().with(resource, 10).with(ResourceType::Gold, 1)
                };
                FactoryLevel {
                    tier,
                    production: base << (tier - 1),
                    production_interval: Duration::from_secs(1),
                    upgrade_cooldown: Duration::from_secs(2),
                    upgrade_cost,
                }
            })
            .collect::<Vec<_>>()
    };
    let ladders = ResourceMap::from_fn(|r| match r {
        ResourceType::Copper => ladder(r, 5),
        _ => ladder(r, 1),
    });
    match LevelTable::new(ladders) {
        Ok(table) => table,
        Err(e) => panic!("fast_table is invalid: {e}"),
    }
}

// ===========================================================================
// Economies
// ===========================================================================

/// Idle economy on the standard table with the given balances.
pub fn seeded_economy(balances: Balances) -> Economy {
    Economy::builder().balances(balances).build()
}

/// Idle economy on [`fast_table`] with the given balances.
pub fn fast_economy(balances: Balances) -> Economy {
    Economy::builder()
        .level_table(fast_table())
        .balances(balances)
        .build()
}

/// Enough of everything to buy every standard upgrade many times over.
pub fn rich() -> Balances {
    ResourceMap::new(1_000_000, 1_000_000, 10_000)
}
