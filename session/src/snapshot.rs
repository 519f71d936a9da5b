//! Immutable, versioned snapshots of the validation inputs that outlive a run.

use crate::SessionResult;
use shipval_catalog::Catalog;
use shipval_normalize::{SynonymTable, UnitTable};
use shipval_schema::SchemaStore;
use std::sync::{Arc, RwLock};

/// A schema, its unit and synonym tables, and a catalog bound against them.
#[derive(Debug)]
pub struct Snapshot {
    version: u64,
    schema: SchemaStore,
    units: UnitTable,
    synonyms: SynonymTable,
    catalog: Catalog,
}

impl Snapshot {
    pub fn new(schema: SchemaStore, units: UnitTable, synonyms: SynonymTable, catalog: Catalog) -> Self {
        Self {
            version: 0,
            schema,
            units,
            synonyms,
            catalog,
        }
    }

    /// Parse and cross-check all four tables.
    ///
    /// Units and synonyms are checked against the schema before the catalog
    /// is bound, so a catalog never sees an inconsistent table.
    pub fn from_sources(schema: &str, units: &str, synonyms: &str, catalog: &str) -> SessionResult<Self> {
        let schema = SchemaStore::from_toml(schema)?;
        let units = UnitTable::from_toml(units)?;
        units.check_schema(&schema)?;
        let synonyms = SynonymTable::from_toml(synonyms)?;
        synonyms.check_schema(&schema)?;
        let catalog = Catalog::from_toml(catalog, &schema, &units)?;
        tracing::info!(
            schema = schema.version(),
            catalog = catalog.version(),
            constraints = catalog.len(),
            units = units.len(),
            synonyms = synonyms.len(),
            "snapshot loaded"
        );
        Ok(Self::new(schema, units, synonyms, catalog))
    }

    /// Registry version; 0 until published.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn schema(&self) -> &SchemaStore {
        &self.schema
    }

    pub fn units(&self) -> &UnitTable {
        &self.units
    }

    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

/// Publishes snapshots under increasing versions.
///
/// Runs hold the `Arc` they acquired; publishing never touches it.
#[derive(Debug)]
pub struct SnapshotRegistry {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotRegistry {
    /// Start with `initial` published as version 1.
    pub fn new(mut initial: Snapshot) -> Self {
        initial.version = 1;
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// The latest published snapshot.
    pub fn acquire(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Publish a new snapshot and return its version.
    pub fn publish(&self, mut snapshot: Snapshot) -> u64 {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        snapshot.version = guard.version + 1;
        let version = snapshot.version;
        *guard = Arc::new(snapshot);
        tracing::info!(version, "snapshot published");
        version
    }

    pub fn version(&self) -> u64 {
        self.acquire().version
    }
}
