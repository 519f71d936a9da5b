//! Unit table: symbols, aliases and linear conversion to canonical units.

use crate::{TableError, TableResult};
use serde::Deserialize;
use shipval_core::QuantityKind;
use shipval_schema::SchemaStore;
use std::collections::{BTreeMap, HashMap};

/// One unit of measure. `canonical = value * scale + offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDef {
    pub symbol: String,
    pub kind: QuantityKind,
    pub scale: f64,
    pub offset: f64,
    pub aliases: Vec<String>,
}

impl UnitDef {
    pub fn new(symbol: impl Into<String>, kind: impl Into<QuantityKind>, scale: f64) -> Self {
        Self {
            symbol: symbol.into(),
            kind: kind.into(),
            scale,
            offset: 0.0,
            aliases: Vec::new(),
        }
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_aliases<S: Into<String>>(mut self, aliases: impl IntoIterator<Item = S>) -> Self {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn to_canonical(&self, value: f64) -> f64 {
        value * self.scale + self.offset
    }

    pub fn from_canonical(&self, canonical: f64) -> f64 {
        (canonical - self.offset) / self.scale
    }

    fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.offset == 0.0
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnitFile {
    #[serde(default)]
    units: Vec<UnitEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UnitEntry {
    symbol: String,
    kind: String,
    #[serde(default = "default_scale")]
    scale: f64,
    #[serde(default)]
    offset: f64,
    #[serde(default)]
    aliases: Vec<String>,
}

fn default_scale() -> f64 {
    1.0
}

/// Lookup of unit tokens as they appear in vendor data.
///
/// Token lookup order: exact symbol, declared alias (case-insensitive),
/// then case-folded symbol when the fold is unambiguous (`kn` and `kN`
/// both fold to `KN`, so neither is found that way).
#[derive(Debug, Default)]
pub struct UnitTable {
    units: BTreeMap<String, UnitDef>,
    aliases: HashMap<String, String>,
    folded: HashMap<String, Option<String>>,
}

impl UnitTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `[[units]]` TOML table.
    pub fn from_toml(source: &str) -> TableResult<Self> {
        let file: UnitFile = toml::from_str(source).map_err(|e| TableError::Parse(e.to_string()))?;
        let mut table = Self::new();
        for entry in file.units {
            let def = UnitDef {
                symbol: entry.symbol,
                kind: QuantityKind::new(entry.kind),
                scale: entry.scale,
                offset: entry.offset,
                aliases: entry.aliases,
            };
            table.add(def)?;
        }
        tracing::debug!(units = table.len(), "unit table loaded");
        Ok(table)
    }

    pub fn add(&mut self, def: UnitDef) -> TableResult<()> {
        if self.units.contains_key(&def.symbol) {
            return Err(TableError::DuplicateUnit(def.symbol));
        }
        if def.scale == 0.0 || !def.scale.is_finite() || !def.offset.is_finite() {
            return Err(TableError::InvalidScale(def.symbol));
        }
        for alias in &def.aliases {
            let key = alias.to_uppercase();
            if let Some(first) = self.aliases.get(&key) {
                return Err(TableError::DuplicateAlias {
                    alias: alias.clone(),
                    first: first.clone(),
                    second: def.symbol.clone(),
                });
            }
            self.aliases.insert(key, def.symbol.clone());
        }
        self.folded
            .entry(def.symbol.to_uppercase())
            .and_modify(|slot| *slot = None)
            .or_insert_with(|| Some(def.symbol.clone()));
        self.units.insert(def.symbol.clone(), def);
        Ok(())
    }

    pub fn get(&self, symbol: &str) -> Option<&UnitDef> {
        self.units.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Every quantity kind in the schema must have its canonical unit here,
    /// with the matching kind and an identity conversion.
    pub fn check_schema(&self, schema: &SchemaStore) -> TableResult<()> {
        for (kind, symbol) in schema.quantity_kinds() {
            let def = self
                .units
                .get(symbol)
                .ok_or_else(|| TableError::MissingCanonicalUnit {
                    kind: kind.to_string(),
                    unit: symbol.to_string(),
                })?;
            if &def.kind != kind {
                return Err(TableError::CanonicalKindMismatch {
                    unit: symbol.to_string(),
                    expected: kind.to_string(),
                    actual: def.kind.to_string(),
                });
            }
            if !def.is_identity() {
                return Err(TableError::NonIdentityCanonical(symbol.to_string()));
            }
        }
        Ok(())
    }

    /// Look up a raw unit token such as `"unit:KiloN-M"`, `"#RPM"` or `"kW"`.
    pub fn normalize_token(&self, raw: &str) -> Option<&UnitDef> {
        let token = raw.trim();
        let token = token.strip_prefix("unit:").unwrap_or(token);
        let token = token.trim_start_matches('#').trim();
        if token.is_empty() {
            return None;
        }
        if let Some(def) = self.units.get(token) {
            return Some(def);
        }
        let key = token.to_uppercase();
        if let Some(symbol) = self.aliases.get(&key) {
            return self.units.get(symbol);
        }
        match self.folded.get(&key) {
            Some(Some(symbol)) => self.units.get(symbol),
            _ => None,
        }
    }

    /// Infer a unit from the last `_` segment of a label (`Pwr_Out_kW`),
    /// accepted only if it belongs to the expected kind.
    pub fn infer_from_label(&self, label: &str, kind: &str) -> Option<&UnitDef> {
        let (_, suffix) = label.trim().rsplit_once('_')?;
        self.normalize_token(suffix).filter(|def| def.kind.as_str() == kind)
    }

    /// Convert between two units of the same kind.
    pub fn convert(&self, value: f64, from: &UnitDef, to: &UnitDef) -> Option<f64> {
        (from.kind == to.kind).then(|| to.from_canonical(from.to_canonical(value)))
    }
}
