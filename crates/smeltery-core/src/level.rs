//! Static factory tier data: production rates, cooldowns and upgrade costs.
//!
//! A [`LevelTable`] holds one ladder of [`FactoryLevel`]s per resource type.
//! It is validated once at construction and never mutated afterwards, so it
//! can be shared behind an `Arc` and read from any task without locking.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::resource::{ResourceMap, ResourceType};

// ---------------------------------------------------------------------------
// UpgradeCost
// ---------------------------------------------------------------------------

/// Amount of each resource required to advance a factory to its next tier.
///
/// Resources without an entry cost nothing. An empty cost means no further
/// upgrade is offered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpgradeCost(BTreeMap<ResourceType, u64>);

impl UpgradeCost {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style: require `amount` of `resource`.
    pub fn with(mut self, resource: ResourceType, amount: u64) -> Self {
        self.0.insert(resource, amount);
        self
    }

    /// Required amount of `resource`, if the cost names it.
    pub fn get(&self, resource: ResourceType) -> Option<u64> {
        self.0.get(&resource).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Named resources and their amounts, in lock order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceType, u64)> + '_ {
        self.0.iter().map(|(r, a)| (*r, *a))
    }
}

impl FromIterator<(ResourceType, u64)> for UpgradeCost {
    fn from_iter<I: IntoIterator<Item = (ResourceType, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// FactoryLevel
// ---------------------------------------------------------------------------

/// One tier of a factory ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryLevel {
    /// Tier number, starting at 1.
    pub tier: u32,
    /// Quantity emitted per production tick.
    pub production: u64,
    /// Time between production ticks.
    #[serde(rename = "production_interval_secs", with = "crate::serde_secs")]
    pub production_interval: Duration,
    /// How long an upgrade away from this tier takes once paid for.
    #[serde(rename = "upgrade_cooldown_secs", with = "crate::serde_secs")]
    pub upgrade_cooldown: Duration,
    /// Cost to reach the next tier. Empty at the terminal tier.
    pub upgrade_cost: UpgradeCost,
}

impl FactoryLevel {
    /// Whether an upgrade away from this tier is offered at all.
    pub fn is_terminal(&self) -> bool {
        self.upgrade_cost.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LevelTableError {
    #[error("no tier {tier} defined for {resource}")]
    NotFound { resource: ResourceType, tier: u32 },

    #[error("{0} ladder has no tiers")]
    EmptyLadder(ResourceType),

    #[error("{resource} ladder position {position} declares tier {tier}")]
    TierOutOfSequence {
        resource: ResourceType,
        position: usize,
        tier: u32,
    },

    #[error("{resource} tier {tier} has a zero production interval")]
    ZeroInterval { resource: ResourceType, tier: u32 },

    #[error("{resource} tier {tier} is not the last tier but has no upgrade cost")]
    MissingCost { resource: ResourceType, tier: u32 },

    #[error("{resource} tier {tier} is the last tier but has an upgrade cost")]
    TerminalCost { resource: ResourceType, tier: u32 },
}

// ---------------------------------------------------------------------------
// LevelTable
// ---------------------------------------------------------------------------

/// Immutable lookup of every resource's tier ladder. Thread-safe to share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelTable {
    ladders: ResourceMap<Vec<FactoryLevel>>,
}

impl LevelTable {
    /// Validate and freeze a set of ladders.
    ///
    /// Each ladder must be non-empty with tiers numbered 1, 2, 3, ... in order,
    /// every non-terminal tier must carry a cost and the terminal tier must not.
    pub fn new(ladders: ResourceMap<Vec<FactoryLevel>>) -> Result<Self, LevelTableError> {
        for (resource, ladder) in ladders.iter() {
            validate_ladder(resource, ladder)?;
        }
        Ok(Self { ladders })
    }

    /// The ladder every new economy starts with unless a data file says otherwise.
    ///
    /// Iron and copper tick every second, gold every minute.
    pub fn standard() -> Self {
        use ResourceType::{Copper, Gold, Iron};

        let ladder = |interval: u64, rows: [(u64, u64, UpgradeCost); 5]| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (production, cooldown, upgrade_cost))| FactoryLevel {
                    tier: i as u32 + 1,
                    production,
                    production_interval: Duration::from_secs(interval),
                    upgrade_cooldown: Duration::from_secs(cooldown),
                    upgrade_cost,
                })
                .collect::<Vec<_>>()
        };
        let cost = |iron: u64, copper: u64, gold: u64| {
            [(Iron, iron), (Copper, copper), (Gold, gold)]
                .into_iter()
                .filter(|(_, amount)| *amount > 0)
                .collect::<UpgradeCost>()
        };

        Self {
            ladders: ResourceMap::new(
                ladder(
                    1,
                    [
                        (10, 15, cost(300, 100, 1)),
                        (20, 30, cost(800, 250, 2)),
                        (40, 60, cost(1600, 500, 4)),
                        (80, 90, cost(3000, 1000, 8)),
                        (150, 120, UpgradeCost::new()),
                    ],
                ),
                ladder(
                    1,
                    [
                        (3, 15, cost(200, 70, 0)),
                        (7, 30, cost(400, 150, 0)),
                        (14, 60, cost(800, 300, 0)),
                        (30, 90, cost(1600, 600, 2)),
                        (60, 120, UpgradeCost::new()),
                    ],
                ),
                ladder(
                    60,
                    [
                        (2, 15, cost(0, 100, 2)),
                        (3, 30, cost(0, 200, 4)),
                        (4, 60, cost(0, 400, 8)),
                        (6, 90, cost(0, 800, 16)),
                        (8, 120, UpgradeCost::new()),
                    ],
                ),
            ),
        }
    }

    /// Look up `tier` of `resource`'s ladder.
    pub fn level_of(&self, resource: ResourceType, tier: u32) -> Result<&FactoryLevel, LevelTableError> {
        let ladder = &self.ladders[resource];
        tier.checked_sub(1)
            .and_then(|i| ladder.get(i as usize))
            .ok_or(LevelTableError::NotFound { resource, tier })
    }

    /// Tier 1 of `resource`'s ladder.
    pub fn first(&self, resource: ResourceType) -> &FactoryLevel {
        // Non-empty by construction.
        &self.ladders[resource][0]
    }

    /// Highest tier defined for `resource`.
    pub fn max_tier(&self, resource: ResourceType) -> u32 {
        self.ladders[resource].len() as u32
    }

    pub fn ladder(&self, resource: ResourceType) -> &[FactoryLevel] {
        &self.ladders[resource]
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn validate_ladder(resource: ResourceType, ladder: &[FactoryLevel]) -> Result<(), LevelTableError> {
    if ladder.is_empty() {
        return Err(LevelTableError::EmptyLadder(resource));
    }
    let last = ladder.len() - 1;
    for (position, level) in ladder.iter().enumerate() {
        if level.tier as usize != position + 1 {
            return Err(LevelTableError::TierOutOfSequence {
                resource,
                position,
                tier: level.tier,
            });
        }
        if level.production_interval.is_zero() {
            return Err(LevelTableError::ZeroInterval {
                resource,
                tier: level.tier,
            });
        }
        match (position == last, level.upgrade_cost.is_empty()) {
            (false, true) => {
                return Err(LevelTableError::MissingCost {
                    resource,
                    tier: level.tier,
                });
            }
            (true, false) => {
                return Err(LevelTableError::TerminalCost {
                    resource,
                    tier: level.tier,
                });
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceType::*;

    fn level(tier: u32, cost: UpgradeCost) -> FactoryLevel {
        FactoryLevel {
            tier,
            production: 1,
            production_interval: Duration::from_secs(1),
            upgrade_cooldown: Duration::from_secs(1),
            upgrade_cost: cost,
        }
    }

    fn two_tier() -> Vec<FactoryLevel> {
        vec![level(1, UpgradeCost::new().with(Iron, 5)), level(2, UpgradeCost::new())]
    }

    #[test]
    fn standard_table_is_valid() {
        let table = LevelTable::standard();
        let rebuilt = LevelTable::new(table.ladders.clone()).unwrap();
        assert_eq!(rebuilt, table);
    }

    #[test]
    fn standard_iron_tier_one() {
        let table = LevelTable::standard();
        let l = table.level_of(Iron, 1).unwrap();
        assert_eq!(l.production, 10);
        assert_eq!(l.upgrade_cooldown, Duration::from_secs(15));
        assert_eq!(l.upgrade_cost.get(Iron), Some(300));
        assert_eq!(l.upgrade_cost.get(Copper), Some(100));
        assert_eq!(l.upgrade_cost.get(Gold), Some(1));
    }

    #[test]
    fn standard_ladders_have_five_tiers() {
        let table = LevelTable::standard();
        for r in ResourceType::ALL {
            assert_eq!(table.max_tier(r), 5);
            assert!(table.level_of(r, 5).unwrap().is_terminal());
        }
        assert_eq!(table.first(Gold).production_interval, Duration::from_secs(60));
    }

    #[test]
    fn partial_costs_omit_resources() {
        let table = LevelTable::standard();
        let cost = &table.level_of(Copper, 1).unwrap().upgrade_cost;
        assert_eq!(cost.get(Gold), None);
        assert_eq!(cost.iter().count(), 2);
    }

    #[test]
    fn level_of_out_of_range() {
        let table = LevelTable::standard();
        assert_eq!(
            table.level_of(Iron, 6),
            Err(LevelTableError::NotFound { resource: Iron, tier: 6 })
        );
        assert_eq!(
            table.level_of(Iron, 0),
            Err(LevelTableError::NotFound { resource: Iron, tier: 0 })
        );
    }

    #[test]
    fn rejects_empty_ladder() {
        let result = LevelTable::new(ResourceMap::new(two_tier(), vec![], two_tier()));
        assert_eq!(result, Err(LevelTableError::EmptyLadder(Copper)));
    }

    #[test]
    fn rejects_out_of_sequence_tiers() {
        let mut gold = two_tier();
        gold[1].tier = 3;
        let result = LevelTable::new(ResourceMap::new(two_tier(), two_tier(), gold));
        assert!(matches!(result, Err(LevelTableError::TierOutOfSequence { resource: Gold, .. })));
    }

    #[test]
    fn rejects_cost_placement() {
        let mut iron = two_tier();
        iron[0].upgrade_cost = UpgradeCost::new();
        let result = LevelTable::new(ResourceMap::new(iron, two_tier(), two_tier()));
        assert_eq!(result, Err(LevelTableError::MissingCost { resource: Iron, tier: 1 }));

        let mut iron = two_tier();
        iron[1].upgrade_cost = UpgradeCost::new().with(Gold, 1);
        let result = LevelTable::new(ResourceMap::new(iron, two_tier(), two_tier()));
        assert_eq!(result, Err(LevelTableError::TerminalCost { resource: Iron, tier: 2 }));
    }

    #[test]
    fn rejects_zero_interval() {
        let mut copper = two_tier();
        copper[0].production_interval = Duration::ZERO;
        let result = LevelTable::new(ResourceMap::new(two_tier(), copper, two_tier()));
        assert_eq!(result, Err(LevelTableError::ZeroInterval { resource: Copper, tier: 1 }));
    }

    #[test]
    fn upgrade_cost_serializes_as_map() {
        let cost = UpgradeCost::new().with(Gold, 1).with(Iron, 300);
        let json = serde_json::to_string(&cost).unwrap();
        assert_eq!(json, r#"{"iron":300,"gold":1}"#);
    }
}
