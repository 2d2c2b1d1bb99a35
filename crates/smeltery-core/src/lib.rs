//! Smeltery Core -- the production-and-upgrade engine of an idle economy.
//!
//! Three factories (iron, copper, gold) produce into a shared ledger on their
//! own cadence. A factory can be upgraded to its next tier by paying a
//! multi-resource cost, after which a cooldown runs before the new tier takes
//! effect.
//!
//! # Concurrency model
//!
//! - One production task and one aggregation task per factory, connected by a
//!   single-slot channel.
//! - Zero or one countdown task per factory while an upgrade is running.
//! - The ledger has one lock per resource. Multi-resource operations acquire
//!   them in the fixed order Iron, Copper, Gold.
//!
//! No lock is held across an `.await`, and no task ever waits on another
//! resource's lock while holding its own.
//!
//! # Key Types
//!
//! - [`economy::Economy`] -- aggregate root; dashboard, upgrade, save hook.
//! - [`factory::Factory`] -- tier, upgrade status, production and countdown tasks.
//! - [`ledger::Ledger`] -- per-resource balances with an all-or-nothing debit.
//! - [`level::LevelTable`] -- immutable tier ladders.
//! - [`api`] -- what an external request layer calls.

pub mod api;
pub mod economy;
pub mod error;
pub mod factory;
pub mod ledger;
pub mod level;
pub mod resource;
pub mod serde_secs;
pub mod snapshot;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use economy::{Dashboard, Economy, EconomyBuilder, FactoryView};
pub use error::UpgradeError;
pub use factory::{Factory, UpgradeHandle, UpgradeStatus};
pub use ledger::{Balances, InsufficientResources, Ledger, Shortfall};
pub use level::{FactoryLevel, LevelTable, LevelTableError, UpgradeCost};
pub use resource::{ResourceMap, ResourceType};
pub use snapshot::{EconomySnapshot, FactorySnapshot, SaveError, SaveHook};
