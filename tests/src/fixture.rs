//! The fixture ship under `tests/fixtures`.

use crate::ScenarioResult;
use shipval_normalize::RawInput;
use shipval_session::{loader, RunSettings, SessionError, ShipvalConfig, Snapshot};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

/// Config and snapshot loaded from `fixtures/`.
pub struct Fixture {
    pub config: ShipvalConfig,
    pub snapshot: Arc<Snapshot>,
}

impl Fixture {
    pub fn load() -> ScenarioResult<Self> {
        let (config, base) = loader::load_config(&fixtures_dir().join("shipval.toml"))?;
        let snapshot = Arc::new(loader::load_snapshot(&config, &base)?);
        Ok(Self { config, snapshot })
    }

    pub fn settings(&self) -> ScenarioResult<RunSettings> {
        Ok(self.config.run_settings().map_err(SessionError::from)?)
    }

    /// The full fixture ship.
    pub fn input() -> ScenarioResult<RawInput> {
        Ok(loader::read_input(&fixtures_dir().join("input.json"))?)
    }
}
