//! Serde data file structs for level ladders.
//!
//! These define the on-disk format. Resource names are plain strings here and
//! are resolved (case-insensitively) by the loader, so the same file reads the
//! same way in RON, TOML and JSON.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Top-level document: one ladder per resource.
///
/// In TOML this is a `[[ladders]]` array of tables.
#[derive(Debug, Clone, Deserialize)]
pub struct LevelsFile {
    pub ladders: Vec<LadderData>,
}

/// The tiers of one resource's factory.
#[derive(Debug, Clone, Deserialize)]
pub struct LadderData {
    pub resource: String,
    /// Default production cadence for every tier of this ladder.
    pub interval_secs: f64,
    pub tiers: Vec<TierData>,
}

/// One tier. Tiers are numbered by their position in the list, starting at 1.
#[derive(Debug, Clone, Deserialize)]
pub struct TierData {
    pub production: u64,
    pub cooldown_secs: f64,
    /// Overrides the ladder's `interval_secs` for this tier only.
    #[serde(default)]
    pub interval_secs: Option<f64>,
    /// Resource name to amount. Omitted on the last tier.
    #[serde(default)]
    pub cost: BTreeMap<String, u64>,
}
