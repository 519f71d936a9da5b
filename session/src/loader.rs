//! File loading. Paths in the config are relative to the config file.

use crate::{ConfigError, SessionError, SessionResult, ShipvalConfig, Snapshot};
use shipval_normalize::RawInput;
use std::path::{Path, PathBuf};

/// Load `shipval.toml` and return it with the directory its paths are relative to.
pub fn load_config(path: &Path) -> SessionResult<(ShipvalConfig, PathBuf)> {
    let config = ShipvalConfig::load(path)?;
    let base = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok((config, base))
}

/// Read the schema, units, synonyms and catalog the config names.
pub fn load_snapshot(config: &ShipvalConfig, base: &Path) -> SessionResult<Snapshot> {
    let schema_path = config
        .schema
        .path
        .as_deref()
        .ok_or_else(|| ConfigError::validation("schema.path", "required"))?;
    let catalog_path = config
        .catalog
        .path
        .as_deref()
        .ok_or_else(|| ConfigError::validation("catalog.path", "required"))?;

    let schema = read(&resolve(base, schema_path))?;
    let catalog = read(&resolve(base, catalog_path))?;
    let units = optional(base, config.normalization.units.as_deref())?;
    let synonyms = optional(base, config.normalization.synonyms.as_deref())?;

    Snapshot::from_sources(&schema, &units, &synonyms, &catalog)
}

/// Read a run input JSON file.
pub fn read_input(path: &Path) -> SessionResult<RawInput> {
    let source = read(path)?;
    RawInput::from_json(&source).map_err(|e| SessionError::Input(format!("{}: {e}", path.display())))
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

fn read(path: &Path) -> SessionResult<String> {
    tracing::debug!(path = %path.display(), "reading");
    std::fs::read_to_string(path).map_err(|e| SessionError::read(path, e))
}

/// An unset table location reads as an empty table.
fn optional(base: &Path, path: Option<&Path>) -> SessionResult<String> {
    match path {
        Some(path) => read(&resolve(base, path)),
        None => Ok(String::new()),
    }
}
