//! The economy: one factory per resource type plus the shared ledger.
//!
//! # Tasks
//!
//! [`Economy::start_production`] spawns, per resource, a production task
//! (inside [`Factory::produce`]) and an aggregation task that moves each
//! emitted quantity into the ledger. Resources never share a task, so a slow
//! consumer of one resource cannot hold back another.
//!
//! # Upgrade transaction
//!
//! [`Economy::upgrade`] runs under the economy's upgrade gate:
//!
//! 1. **Eligibility** -- rejects if the factory is already upgrading or is at
//!    its terminal tier.
//! 2. **Payment** -- [`Ledger::try_debit_all`] locks every balance in
//!    Iron, Copper, Gold order and debits the whole cost or nothing.
//! 3. **Activation** -- the factory flips to in-progress and its countdown
//!    runs in the background. The caller gets an [`UpgradeHandle`] back
//!    without waiting for the cooldown.
//!
//! Because the in-progress flag is set before the gate is released, a second
//! request for the same resource always sees it and never pays twice.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::error::UpgradeError;
use crate::factory::{Factory, ProductionStream, UpgradeHandle, UpgradeStatus};
use crate::ledger::{Balances, Ledger};
use crate::level::{FactoryLevel, LevelTable};
use crate::resource::{ResourceMap, ResourceType};
use crate::snapshot::{
    EconomySnapshot, FactorySnapshot, SNAPSHOT_FORMAT_VERSION, SaveError, SaveHook,
};

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// A factory's level and upgrade status as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryView {
    pub level: FactoryLevel,
    pub status: UpgradeStatus,
}

/// Display view of the whole economy.
///
/// Balances are read together under every ledger lock, so a payment is never
/// seen half applied. Each factory is read on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    pub resources: Balances,
    pub factories: ResourceMap<FactoryView>,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct EconomyBuilder {
    table: Option<LevelTable>,
    balances: Balances,
}

impl EconomyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `table` instead of [`LevelTable::standard`].
    pub fn level_table(mut self, table: LevelTable) -> Self {
        self.table = Some(table);
        self
    }

    /// Seed the ledger. Defaults to zero everywhere.
    pub fn balances(mut self, balances: Balances) -> Self {
        self.balances = balances;
        self
    }

    /// Build an economy with no production running.
    pub fn build(self) -> Economy {
        let table = Arc::new(self.table.unwrap_or_default());
        let factories = ResourceMap::from_fn(|r| Arc::new(Factory::new(r, Arc::clone(&table))));
        Economy {
            table,
            ledger: Arc::new(Ledger::with_balances(self.balances)),
            factories,
            upgrade_gate: Mutex::new(()),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Build and immediately start production. Must be called from within a
    /// tokio runtime.
    pub fn start(self) -> Economy {
        let economy = self.build();
        economy.start_production();
        economy
    }
}

// ---------------------------------------------------------------------------
// Economy
// ---------------------------------------------------------------------------

/// Aggregate root of the production-and-upgrade engine.
///
/// Share it behind an `Arc` with whatever serves requests. Dropping the last
/// reference aborts every task the economy started.
#[derive(Debug)]
pub struct Economy {
    table: Arc<LevelTable>,
    ledger: Arc<Ledger>,
    factories: ResourceMap<Arc<Factory>>,
    upgrade_gate: Mutex<()>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Economy {
    pub fn builder() -> EconomyBuilder {
        EconomyBuilder::new()
    }

    /// Spawn the production and aggregation tasks. Calling it again is a no-op.
    /// Must be called from within a tokio runtime.
    pub fn start_production(&self) {
        let mut tasks = self.tasks.lock();
        if !tasks.is_empty() {
            log::warn!("economy production already running");
            return;
        }
        for (resource, factory) in self.factories.iter() {
            let output = factory.produce();
            let ledger = Arc::clone(&self.ledger);
            tasks.push(tokio::spawn(aggregate(resource, output, ledger)));
        }
        log::info!("economy started: {} production lines", tasks.len());
    }

    pub fn is_producing(&self) -> bool {
        !self.tasks.lock().is_empty()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn factory(&self, resource: ResourceType) -> &Factory {
        &self.factories[resource]
    }

    pub fn level_table(&self) -> &LevelTable {
        &self.table
    }

    /// Consistent balances plus every factory's level and status.
    pub fn dashboard(&self) -> Dashboard {
        Dashboard {
            resources: self.ledger.snapshot(),
            factories: self.factories.map(|_, factory| {
                let (level, status) = factory.view();
                FactoryView { level, status }
            }),
        }
    }

    /// Pay for and start an upgrade of `resource`'s factory.
    ///
    /// The countdown is spawned on the current tokio runtime. Called outside
    /// one, this returns [`UpgradeError::RuntimeUnavailable`] before paying.
    /// On any error nothing has changed: no balance was debited and no
    /// countdown was started.
    pub fn upgrade(&self, resource: ResourceType) -> Result<UpgradeHandle, UpgradeError> {
        let _gate = self.upgrade_gate.lock();
        let factory = &self.factories[resource];

        Self::check_eligible(factory)
            .and_then(|cost_level| {
                let runtime =
                    Handle::try_current().map_err(|_| UpgradeError::RuntimeUnavailable)?;
                let balances = self.ledger.try_debit_all(&cost_level.upgrade_cost)?;
                log::info!(
                    "paid for {resource} tier {} upgrade, balances now {balances:?}",
                    cost_level.tier + 1
                );
                Ok(factory.begin_upgrade_on(&runtime))
            })
            .inspect_err(|e| log::warn!("{resource} upgrade rejected: {e}"))
    }

    /// [`Economy::upgrade`] with a case-insensitive resource name.
    pub fn upgrade_by_name(&self, name: &str) -> Result<UpgradeHandle, UpgradeError> {
        let resource = name
            .parse::<ResourceType>()
            .inspect_err(|e| log::warn!("upgrade rejected: {e}"))?;
        self.upgrade(resource)
    }

    fn check_eligible(factory: &Factory) -> Result<FactoryLevel, UpgradeError> {
        let resource = factory.resource();
        let (level, status) = factory.view();
        if status.in_progress {
            return Err(UpgradeError::AlreadyInProgress(resource));
        }
        if level.is_terminal() {
            return Err(UpgradeError::MaxTierReached {
                resource,
                tier: level.tier,
            });
        }
        Ok(level)
    }

    /// Consistent state capture: no upgrade can be paid for while it runs and
    /// the balances are read under every ledger lock at once.
    pub fn snapshot(&self) -> EconomySnapshot {
        let _gate = self.upgrade_gate.lock();
        EconomySnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            balances: self.ledger.snapshot(),
            factories: self.factories.map(|_, factory| {
                let (level, status) = factory.view();
                FactorySnapshot {
                    tier: level.tier,
                    status,
                }
            }),
        }
    }

    /// Teardown hook: capture a snapshot and hand it to `hook`.
    pub fn save_state(&self, hook: &mut dyn SaveHook) -> Result<EconomySnapshot, SaveError> {
        let snapshot = self.snapshot();
        hook.save(&snapshot)?;
        log::info!(
            "economy state saved (balances {:?})",
            snapshot.balances
        );
        Ok(snapshot)
    }
}

impl Drop for Economy {
    fn drop(&mut self) {
        for task in self.tasks.get_mut().drain(..) {
            task.abort();
        }
        for (_, factory) in self.factories.iter() {
            factory.abort_countdown();
        }
    }
}

async fn aggregate(resource: ResourceType, mut output: ProductionStream, ledger: Arc<Ledger>) {
    while let Some(quantity) = output.next().await {
        ledger.accumulate(resource, quantity);
    }
    log::debug!("{resource} production stream closed");
}
