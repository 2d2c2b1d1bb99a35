//! One-line dashboard summaries for the periodic log.

use smeltery_core::{Dashboard, FactoryView};
use std::fmt::Write;

/// `iron 320 [t2 +20/1s] | copper 45 [t1 +3/1s, upgrading 12s] | gold 2 [t1 +2/60s]`
pub fn dashboard_line(dashboard: &Dashboard) -> String {
    let mut line = String::new();
    for (resource, view) in dashboard.factories.iter() {
        if !line.is_empty() {
            line.push_str(" | ");
        }
        let _ = write!(
            line,
            "{resource} {} [{}]",
            dashboard.resources[resource],
            factory_summary(view)
        );
    }
    line
}

fn factory_summary(view: &FactoryView) -> String {
    let level = &view.level;
    let mut summary = format!(
        "t{} +{}/{}s",
        level.tier,
        level.production,
        level.production_interval.as_secs_f64()
    );
    if view.status.in_progress {
        match view.status.remaining {
            Some(left) => {
                let _ = write!(summary, ", upgrading {}s", left.as_secs());
            }
            None => summary.push_str(", upgrading"),
        }
    } else if view.status.next_upgrade_cost.is_none() {
        summary.push_str(", max");
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use smeltery_core::test_utils::{fast_economy, rich};
    use smeltery_core::{ResourceMap, ResourceType};

    #[test]
    fn idle_economy_line() {
        let economy = fast_economy(ResourceMap::new(5, 6, 7));
        let line = dashboard_line(&economy.dashboard());
        assert_eq!(
            line,
            "iron 5 [t1 +1/1s] | copper 6 [t1 +5/1s] | gold 7 [t1 +1/1s]"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn upgrading_factory_shows_countdown() {
        let economy = fast_economy(rich());
        economy.upgrade(ResourceType::Copper).unwrap();
        let line = dashboard_line(&economy.dashboard());
        assert!(line.contains("copper 999990 [t1 +5/1s, upgrading 2s]"), "{line}");
    }
}
