//! Serializable economy state for the teardown save hook.
//!
//! The core decides *what* is saved; where and how it is stored is up to the
//! [`SaveHook`] passed to [`crate::economy::Economy::save_state`].

use serde::{Deserialize, Serialize};

use crate::factory::UpgradeStatus;
use crate::ledger::Balances;
use crate::resource::ResourceMap;

/// Bump when the snapshot layout changes incompatibly.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorySnapshot {
    pub tier: u32,
    pub status: UpgradeStatus,
}

/// Ledger balances and factory tiers at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomySnapshot {
    pub format_version: u32,
    pub balances: Balances,
    pub factories: ResourceMap<FactorySnapshot>,
}

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding failed: {0}")]
    Encode(String),

    #[error("save rejected: {0}")]
    Rejected(String),
}

/// Storage for a teardown snapshot. Invoked once, just before exit.
pub trait SaveHook {
    fn save(&mut self, snapshot: &EconomySnapshot) -> Result<(), SaveError>;
}

impl<F> SaveHook for F
where
    F: FnMut(&EconomySnapshot) -> Result<(), SaveError>,
{
    fn save(&mut self, snapshot: &EconomySnapshot) -> Result<(), SaveError> {
        self(snapshot)
    }
}
