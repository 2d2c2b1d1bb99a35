//! Data-driven configuration for the smeltery economy.
//!
//! Level ladders are read from RON, TOML or JSON files (format detected from
//! the file extension) and validated into a [`smeltery_core::LevelTable`].
//! [`JsonFileSaveHook`] stores teardown snapshots as pretty-printed JSON.

pub mod loader;
pub mod save;
pub mod schema;

pub use loader::{DataLoadError, Format, load_level_table, parse_level_table};
pub use save::JsonFileSaveHook;
