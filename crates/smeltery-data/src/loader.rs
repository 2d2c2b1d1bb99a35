//! Reads level data files and resolves them into a validated [`LevelTable`].
//!
//! Provides format detection (RON/JSON/TOML), deserialization helpers and the
//! resolution step that turns [`LevelsFile`] into engine types.

use serde::de::DeserializeOwned;
use smeltery_core::{FactoryLevel, LevelTable, LevelTableError, ResourceMap, ResourceType, UpgradeCost};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::schema::{LadderData, LevelsFile, TierData};

/// Pseudo file name used in errors for content parsed from a string.
const INLINE_SOURCE: &str = "<inline>";

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading level data.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A resource name did not match any resource type.
    #[error("unknown resource '{name}' in {file}")]
    UnknownResource { file: PathBuf, name: String },

    /// A resource has no ladder.
    #[error("no ladder for {resource} in {file}")]
    MissingLadder { file: PathBuf, resource: ResourceType },

    /// A resource has more than one ladder.
    #[error("duplicate ladder for {resource} in {file}")]
    DuplicateLadder { file: PathBuf, resource: ResourceType },

    /// A duration field was negative or not a finite number.
    #[error("invalid duration in {resource} tier {tier}: {detail}")]
    InvalidDuration {
        resource: ResourceType,
        tier: u32,
        detail: String,
    },

    /// The ladders parsed but do not form a valid table.
    #[error(transparent)]
    Table(#[from] LevelTableError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// Deserialization
// ===========================================================================

fn deserialize_str<T: DeserializeOwned>(
    content: &str,
    format: Format,
    file: &Path,
) -> Result<T, DataLoadError> {
    let parsed = match format {
        Format::Ron => ron::from_str(content).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        Format::Toml => toml::from_str(content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|detail| DataLoadError::Parse {
        file: file.to_path_buf(),
        detail,
    })
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

// ===========================================================================
// Loading
// ===========================================================================

/// Load and validate a level table from `path` (`.ron`, `.toml` or `.json`).
pub fn load_level_table(path: &Path) -> Result<LevelTable, DataLoadError> {
    let file: LevelsFile = deserialize_file(path)?;
    let table = resolve_levels(file, path)?;
    log::info!("loaded level table from {}", path.display());
    Ok(table)
}

/// Parse and validate a level table from in-memory content.
pub fn parse_level_table(content: &str, format: Format) -> Result<LevelTable, DataLoadError> {
    let origin = Path::new(INLINE_SOURCE);
    let file: LevelsFile = deserialize_str(content, format, origin)?;
    resolve_levels(file, origin)
}

/// Resolve resource names and durations, then hand the ladders to
/// [`LevelTable::new`] for structural validation.
pub fn resolve_levels(file: LevelsFile, origin: &Path) -> Result<LevelTable, DataLoadError> {
    let mut ladders: ResourceMap<Option<Vec<FactoryLevel>>> = ResourceMap::default();

    for ladder in file.ladders {
        let resource = resolve_resource(&ladder.resource, origin)?;
        if ladders[resource].is_some() {
            return Err(DataLoadError::DuplicateLadder {
                file: origin.to_path_buf(),
                resource,
            });
        }
        ladders[resource] = Some(resolve_ladder(resource, ladder, origin)?);
    }

    let mut resolved: ResourceMap<Vec<FactoryLevel>> = ResourceMap::default();
    for resource in ResourceType::ALL {
        resolved[resource] = ladders[resource]
            .take()
            .ok_or_else(|| DataLoadError::MissingLadder {
                file: origin.to_path_buf(),
                resource,
            })?;
    }

    Ok(LevelTable::new(resolved)?)
}

fn resolve_resource(name: &str, origin: &Path) -> Result<ResourceType, DataLoadError> {
    name.parse().map_err(|_| DataLoadError::UnknownResource {
        file: origin.to_path_buf(),
        name: name.to_string(),
    })
}

fn resolve_ladder(
    resource: ResourceType,
    ladder: LadderData,
    origin: &Path,
) -> Result<Vec<FactoryLevel>, DataLoadError> {
    let default_interval = ladder.interval_secs;
    ladder
        .tiers
        .into_iter()
        .enumerate()
        .map(|(i, tier_data)| {
            let tier = i as u32 + 1;
            resolve_tier(resource, tier, default_interval, tier_data, origin)
        })
        .collect()
}

fn resolve_tier(
    resource: ResourceType,
    tier: u32,
    default_interval: f64,
    data: TierData,
    origin: &Path,
) -> Result<FactoryLevel, DataLoadError> {
    let secs = |value: f64| {
        Duration::try_from_secs_f64(value).map_err(|e| DataLoadError::InvalidDuration {
            resource,
            tier,
            detail: e.to_string(),
        })
    };

    let mut upgrade_cost = UpgradeCost::new();
    for (name, amount) in data.cost {
        upgrade_cost = upgrade_cost.with(resolve_resource(&name, origin)?, amount);
    }

    Ok(FactoryLevel {
        tier,
        production: data.production,
        production_interval: secs(data.interval_secs.unwrap_or(default_interval))?,
        upgrade_cooldown: secs(data.cooldown_secs)?,
        upgrade_cost,
    })
}

// ===========================================================================
// Tests
// ===========================================================================
