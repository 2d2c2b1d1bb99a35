//! Cross-crate tests: ladders loaded from data files driving a running
//! economy, with the request-layer contract and the JSON save hook on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use smeltery_core::ResourceType::*;
use smeltery_core::api::{self, RejectionKind, UpgradeRequest};
use smeltery_core::{Economy, LevelTable, ResourceMap};
use smeltery_data::save::read_snapshot;
use smeltery_data::{JsonFileSaveHook, load_level_table};
use tokio::time::sleep;

fn data_file(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../smeltery-data/data")
        .join(name)
}

fn quick_levels() -> LevelTable {
    load_level_table(&data_file("levels.toml")).unwrap()
}

fn make_test_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "smeltery_integration_{suffix}_{}",
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn request(name: &str) -> UpgradeRequest {
    UpgradeRequest {
        resource: name.to_string(),
    }
}

#[test]
fn bundled_ron_is_the_standard_ladder() {
    let table = load_level_table(&data_file("levels.ron")).unwrap();
    assert_eq!(table, LevelTable::standard());
}

#[tokio::test(start_paused = true)]
async fn loaded_ladder_sets_production_and_cadence() {
    let economy = Economy::builder().level_table(quick_levels()).start();

    sleep(Duration::from_millis(10_500)).await;
    let dashboard = api::handle_dashboard(&economy);

    // Iron 10/s, copper 5/s, gold 1 every 10 s.
    assert_eq!(dashboard.resources, ResourceMap::new(100, 50, 1));
    assert_eq!(
        dashboard.factories.gold.level.production_interval,
        Duration::from_secs(10)
    );
}

#[tokio::test(start_paused = true)]
async fn economy_saves_up_and_upgrades() {
    let economy = Economy::builder().level_table(quick_levels()).start();

    // Nothing to pay with yet.
    let rejection = api::handle_upgrade(&economy, &request("iron")).unwrap_err();
    assert_eq!(rejection.kind, RejectionKind::BadRequest);
    assert_eq!(
        rejection.message,
        "payment error: not enough iron (need 30, have 0), not enough copper (need 10, have 0)"
    );

    // Three seconds of production covers iron 30 + copper 10.
    sleep(Duration::from_millis(3_500)).await;
    let reply = api::handle_upgrade(&economy, &request("Iron")).unwrap();
    assert_eq!(reply.message, "Successfully upgraded iron");
    assert_eq!(economy.ledger().balance(Iron), 0);
    assert_eq!(economy.ledger().balance(Copper), 5);

    let status = economy.factory(Iron).status();
    assert!(status.in_progress);
    assert_eq!(status.remaining, Some(Duration::from_secs(2)));

    // Two one-second countdown steps, then tier 2 produces 25 per tick.
    sleep(Duration::from_millis(2_250)).await;
    assert_eq!(economy.factory(Iron).tier(), 2);
    assert!(!economy.factory(Iron).is_upgrading());

    let before = economy.ledger().balance(Iron);
    sleep(Duration::from_secs(3)).await;
    assert_eq!(economy.ledger().balance(Iron), before + 75);
}

#[tokio::test(start_paused = true)]
async fn snapshot_written_by_hook_reads_back() {
    let dir = make_test_dir("save");
    let path = dir.join("economy-save.json");

    let economy = Economy::builder()
        .level_table(quick_levels())
        .balances(ResourceMap::new(1_000, 1_000, 100))
        .build();
    let handle = economy.upgrade(Gold).unwrap();
    let level = handle.completed().await.unwrap();
    assert_eq!(level.tier, 2);
    assert_eq!(level.production_interval, Duration::from_secs(5));
    economy.upgrade(Copper).unwrap();

    let mut hook = JsonFileSaveHook::new(&path);
    let written = economy.save_state(&mut hook).unwrap();
    let read = read_snapshot(&path).unwrap();

    assert_eq!(read, written);
    assert_eq!(read.balances, ResourceMap::new(980, 970, 98));
    assert_eq!(read.factories.gold.tier, 2);
    assert!(read.factories.copper.status.in_progress);
    assert_eq!(read.factories.iron.tier, 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test(start_paused = true)]
async fn dashboard_json_shape() {
    let economy = Economy::builder()
        .level_table(quick_levels())
        .balances(ResourceMap::new(1, 2, 3))
        .build();
    let json = serde_json::to_value(api::handle_dashboard(&economy)).unwrap();

    assert_eq!(json["resources"]["iron"], 1);
    assert_eq!(json["factories"]["copper"]["level"]["tier"], 1);
    assert_eq!(json["factories"]["copper"]["status"]["in_progress"], false);
    assert_eq!(
        json["factories"]["gold"]["status"]["next_upgrade_cost"]["gold"],
        2
    );
}
