//! Resource types and the fixed three-slot map keyed by them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UpgradeError;

// ---------------------------------------------------------------------------
// ResourceType
// ---------------------------------------------------------------------------

/// A kind of resource produced by a factory and held in the ledger.
///
/// The declaration order is the lock-acquisition order used by every
/// multi-resource ledger operation: Iron, then Copper, then Gold.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Iron,
    Copper,
    Gold,
}

impl ResourceType {
    /// Every resource type, in lock order.
    pub const ALL: [ResourceType; 3] = [ResourceType::Iron, ResourceType::Copper, ResourceType::Gold];

    /// Slot index inside a [`ResourceMap`].
    pub const fn index(self) -> usize {
        match self {
            ResourceType::Iron => 0,
            ResourceType::Copper => 1,
            ResourceType::Gold => 2,
        }
    }

    /// Lowercase external name.
    pub const fn name(self) -> &'static str {
        match self {
            ResourceType::Iron => "iron",
            ResourceType::Copper => "copper",
            ResourceType::Gold => "gold",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceType {
    type Err = UpgradeError;

    /// Case-insensitive: `"iron"`, `"Iron"` and `"IRON"` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        ResourceType::ALL
            .into_iter()
            .find(|r| r.name() == lowered)
            .ok_or_else(|| UpgradeError::UnknownResource(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ResourceMap
// ---------------------------------------------------------------------------

/// One value per resource type. Serialized as `{ "iron": .., "copper": .., "gold": .. }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMap<T> {
    pub iron: T,
    pub copper: T,
    pub gold: T,
}

impl<T> ResourceMap<T> {
    pub fn new(iron: T, copper: T, gold: T) -> Self {
        Self { iron, copper, gold }
    }

    /// Build a map by calling `f` once per resource, in lock order.
    pub fn from_fn(mut f: impl FnMut(ResourceType) -> T) -> Self {
        Self {
            iron: f(ResourceType::Iron),
            copper: f(ResourceType::Copper),
            gold: f(ResourceType::Gold),
        }
    }

    pub fn get(&self, resource: ResourceType) -> &T {
        match resource {
            ResourceType::Iron => &self.iron,
            ResourceType::Copper => &self.copper,
            ResourceType::Gold => &self.gold,
        }
    }

    pub fn get_mut(&mut self, resource: ResourceType) -> &mut T {
        match resource {
            ResourceType::Iron => &mut self.iron,
            ResourceType::Copper => &mut self.copper,
            ResourceType::Gold => &mut self.gold,
        }
    }

    /// Iterate `(resource, value)` pairs in lock order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceType, &T)> {
        ResourceType::ALL.into_iter().map(move |r| (r, self.get(r)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(ResourceType, &T) -> U) -> ResourceMap<U> {
        ResourceMap::from_fn(|r| f(r, self.get(r)))
    }
}

impl<T> std::ops::Index<ResourceType> for ResourceMap<T> {
    type Output = T;

    fn index(&self, resource: ResourceType) -> &T {
        self.get(resource)
    }
}

impl<T> std::ops::IndexMut<ResourceType> for ResourceMap<T> {
    fn index_mut(&mut self, resource: ResourceType) -> &mut T {
        self.get_mut(resource)
    }
}
