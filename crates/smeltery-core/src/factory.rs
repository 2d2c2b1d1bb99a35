//! A single resource-producing factory.
//!
//! A [`Factory`] owns its current tier and upgrade phase. It drives two kinds
//! of background task:
//!
//! - a production task, started by [`Factory::produce`], that emits the
//!   current tier's production quantity once per production interval into a
//!   single-slot channel;
//! - at most one countdown task, started by [`Factory::begin_upgrade`], that
//!   ticks the remaining cooldown down once per second and swaps in the next
//!   tier when it reaches zero.
//!
//! The factory never checks affordability or eligibility; that is the
//! economy's job. Once started, a countdown always runs to completion.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::{self, Instant};

use crate::level::{FactoryLevel, LevelTable, UpgradeCost};
use crate::resource::ResourceType;

/// Granularity of the upgrade countdown.
pub const COUNTDOWN_STEP: Duration = Duration::from_secs(1);

/// Capacity of the channel between a production task and its consumer.
/// A full slot holds the producer back until the previous quantity is taken.
pub const PRODUCTION_BUFFER: usize = 1;

// ---------------------------------------------------------------------------
// Upgrade status
// ---------------------------------------------------------------------------

/// Externally observable upgrade state of a factory.
///
/// While in progress, `remaining` is set and `next_upgrade_cost` is not.
/// While idle, `remaining` is unset and `next_upgrade_cost` is set unless the
/// factory is at its terminal tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeStatus {
    pub in_progress: bool,
    #[serde(rename = "remaining_secs", with = "crate::serde_secs::option")]
    pub remaining: Option<Duration>,
    pub next_upgrade_cost: Option<UpgradeCost>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Upgrading { remaining: Duration },
}

#[derive(Debug)]
struct FactoryState {
    level: FactoryLevel,
    phase: Phase,
}

impl FactoryState {
    fn status(&self) -> UpgradeStatus {
        match self.phase {
            Phase::Idle => UpgradeStatus {
                in_progress: false,
                remaining: None,
                next_upgrade_cost: (!self.level.is_terminal())
                    .then(|| self.level.upgrade_cost.clone()),
            },
            Phase::Upgrading { remaining } => UpgradeStatus {
                in_progress: true,
                remaining: Some(remaining),
                next_upgrade_cost: None,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Factory {
    resource: ResourceType,
    table: Arc<LevelTable>,
    state: RwLock<FactoryState>,
    countdown: Mutex<Option<AbortHandle>>,
}

impl Factory {
    /// A tier-1 factory for `resource`.
    pub fn new(resource: ResourceType, table: Arc<LevelTable>) -> Self {
        let level = table.first(resource).clone();
        Self {
            resource,
            table,
            state: RwLock::new(FactoryState {
                level,
                phase: Phase::Idle,
            }),
            countdown: Mutex::new(None),
        }
    }

    pub fn resource(&self) -> ResourceType {
        self.resource
    }

    pub fn current_level(&self) -> FactoryLevel {
        self.state.read().level.clone()
    }

    pub fn tier(&self) -> u32 {
        self.state.read().level.tier
    }

    pub fn status(&self) -> UpgradeStatus {
        self.state.read().status()
    }

    /// Level and status read under one lock.
    pub fn view(&self) -> (FactoryLevel, UpgradeStatus) {
        let state = self.state.read();
        (state.level.clone(), state.status())
    }

    pub fn is_upgrading(&self) -> bool {
        matches!(self.state.read().phase, Phase::Upgrading { .. })
    }

    /// Start the production task and return its output.
    ///
    /// Every production interval the task emits the production quantity of
    /// whatever tier is current at emission time. The interval is read when a
    /// wait starts, so a tier change only affects the following tick.
    /// Must be called from within a tokio runtime.
    pub fn produce(self: &Arc<Self>) -> ProductionStream {
        let (tx, rx) = mpsc::channel(PRODUCTION_BUFFER);
        let task = tokio::spawn(Arc::clone(self).run_production(tx));
        ProductionStream { rx, task }
    }

    async fn run_production(self: Arc<Self>, tx: mpsc::Sender<u64>) {
        loop {
            let interval = self.state.read().level.production_interval;
            time::sleep(interval).await;
            let quantity = self.state.read().level.production;
            log::trace!("{} factory produced {quantity}", self.resource);
            if tx.send(quantity).await.is_err() {
                break;
            }
        }
    }

    /// Mark the factory as upgrading and start the countdown task.
    ///
    /// The caller must ensure no upgrade is already in progress and that the
    /// factory is not at its terminal tier. The status flips to in-progress
    /// before this returns; only the countdown itself runs in the background.
    /// Must be called from within a tokio runtime.
    pub fn begin_upgrade(self: &Arc<Self>) -> UpgradeHandle {
        self.begin_upgrade_on(&Handle::current())
    }

    /// [`Factory::begin_upgrade`] with the countdown spawned on `runtime`.
    pub fn begin_upgrade_on(self: &Arc<Self>, runtime: &Handle) -> UpgradeHandle {
        let cooldown = {
            let mut state = self.state.write();
            debug_assert_eq!(state.phase, Phase::Idle, "upgrade already in progress");
            let cooldown = state.level.upgrade_cooldown;
            state.phase = Phase::Upgrading { remaining: cooldown };
            cooldown
        };
        log::info!(
            "{} factory upgrade started, {}s remaining",
            self.resource,
            cooldown.as_secs_f64()
        );

        let task = runtime.spawn(Arc::clone(self).run_countdown());
        *self.countdown.lock() = Some(task.abort_handle());
        UpgradeHandle {
            resource: self.resource,
            task,
        }
    }

    async fn run_countdown(self: Arc<Self>) -> FactoryLevel {
        let mut ticker = time::interval_at(Instant::now() + COUNTDOWN_STEP, COUNTDOWN_STEP);
        let mut elapsed = Duration::ZERO;
        loop {
            if let Some(level) = self.advance_countdown(elapsed) {
                self.countdown.lock().take();
                return level;
            }
            ticker.tick().await;
            elapsed = COUNTDOWN_STEP;
        }
    }

    /// Take `elapsed` off the remaining cooldown. Returns the new level once
    /// the countdown has finished and the tier has been swapped.
    fn advance_countdown(&self, elapsed: Duration) -> Option<FactoryLevel> {
        let mut state = self.state.write();
        let Phase::Upgrading { remaining } = state.phase else {
            return Some(state.level.clone());
        };
        let remaining = remaining.saturating_sub(elapsed);
        if !remaining.is_zero() {
            state.phase = Phase::Upgrading { remaining };
            return None;
        }

        let next_tier = state.level.tier + 1;
        match self.table.level_of(self.resource, next_tier) {
            Ok(next) => {
                state.level = next.clone();
                log::info!("{} factory upgraded to tier {next_tier}", self.resource);
            }
            Err(e) => {
                log::error!("{} factory upgrade abandoned: {e}", self.resource);
            }
        }
        state.phase = Phase::Idle;
        Some(state.level.clone())
    }

    /// Abort a running countdown, if any. The factory stays in its current
    /// phase; only used when the owning economy is torn down.
    pub(crate) fn abort_countdown(&self) {
        if let Some(handle) = self.countdown.lock().take() {
            handle.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Production output
// ---------------------------------------------------------------------------

/// Receiving end of a factory's production task.
///
/// Dropping the stream stops the task.
#[derive(Debug)]
pub struct ProductionStream {
    rx: mpsc::Receiver<u64>,
    task: JoinHandle<()>,
}

impl ProductionStream {
    /// Wait for the next production tick.
    pub async fn next(&mut self) -> Option<u64> {
        self.rx.recv().await
    }
}

impl Drop for ProductionStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ---------------------------------------------------------------------------
// Upgrade handle
// ---------------------------------------------------------------------------

/// Handle to a running upgrade countdown.
///
/// Dropping it detaches the countdown; the upgrade still completes.
#[derive(Debug)]
pub struct UpgradeHandle {
    resource: ResourceType,
    task: JoinHandle<FactoryLevel>,
}

impl UpgradeHandle {
    pub fn resource(&self) -> ResourceType {
        self.resource
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the countdown to finish and return the factory's new level.
    /// Returns `None` if the countdown was aborted.
    pub async fn completed(self) -> Option<FactoryLevel> {
        self.task.await.ok()
    }
}
