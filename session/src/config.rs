//! `shipval.toml` configuration.

use crate::ConfigError;
use serde::Deserialize;
use shipval_constraint::EvaluatorConfig;
use shipval_core::Severity;
use shipval_normalize::{LabelGate, Mode, PipelineConfig, ResolverConfig, DEFAULT_OUT_OF_DOMAIN_PATTERNS};
use std::path::{Path, PathBuf};

/// Top-level configuration. Every section and field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShipvalConfig {
    pub schema: SchemaSection,
    pub catalog: CatalogSection,
    pub normalization: NormalizationConfig,
    pub evaluation: EvaluationConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SchemaSection {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Default: lenient.
    pub mode: Option<Mode>,
    /// Synonym dictionary location.
    pub synonyms: Option<PathBuf>,
    /// Unit conversion table location.
    pub units: Option<PathBuf>,
    /// Default: 0.6.
    pub fuzzy_threshold: Option<f64>,
    /// Default: 0.1.
    pub fuzzy_margin: Option<f64>,
    /// Default: 0.7.
    pub review_threshold: Option<f64>,
    /// Default: true.
    pub unit_weighting: Option<bool>,
    /// Replaces the built-in out-of-domain patterns when set.
    pub out_of_domain_patterns: Option<Vec<String>>,
    pub skip_labels: Vec<String>,
}

impl NormalizationConfig {
    pub fn effective_mode(&self) -> Mode {
        self.mode.unwrap_or_default()
    }

    pub fn effective_resolver(&self) -> ResolverConfig {
        let defaults = ResolverConfig::default();
        ResolverConfig {
            threshold: self.fuzzy_threshold.unwrap_or(defaults.threshold),
            margin: self.fuzzy_margin.unwrap_or(defaults.margin),
            review_threshold: self.review_threshold.unwrap_or(defaults.review_threshold),
            unit_weighting: self.unit_weighting.unwrap_or(defaults.unit_weighting),
        }
    }

    pub fn effective_patterns(&self) -> Vec<String> {
        match &self.out_of_domain_patterns {
            Some(patterns) => patterns.clone(),
            None => DEFAULT_OUT_OF_DOMAIN_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn gate(&self) -> Result<LabelGate, ConfigError> {
        LabelGate::new(self.effective_patterns(), &self.skip_labels)
            .map_err(|e| ConfigError::validation("normalization.out_of_domain_patterns", e.to_string()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Enabled requirement sets; empty enables all.
    pub requirement_sets: Vec<String>,
    /// Enabled constraint ids within the sets; empty enables all.
    pub constraints: Vec<String>,
    /// Default: violation.
    pub fail_on: Option<Severity>,
    /// Default: true.
    pub parallel: Option<bool>,
    /// Default: 64.
    pub batch_size: Option<usize>,
}

impl EvaluationConfig {
    pub fn effective_fail_on(&self) -> Severity {
        self.fail_on.unwrap_or_default()
    }

    pub fn effective_evaluator(&self) -> EvaluatorConfig {
        let defaults = EvaluatorConfig::default();
        EvaluatorConfig {
            parallel: self.parallel.unwrap_or(defaults.parallel),
            batch_size: self.batch_size.unwrap_or(defaults.batch_size),
        }
    }
}

/// Everything a run needs from the configuration, resolved to concrete values.
#[derive(Debug, Clone, Default)]
pub struct RunSettings {
    pub pipeline: PipelineConfig,
    pub evaluator: EvaluatorConfig,
    pub requirement_sets: Vec<String>,
    pub constraints: Vec<String>,
    pub fail_on: Severity,
}

impl ShipvalConfig {
    /// Read, parse and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let config: ShipvalConfig = toml::from_str(&source).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a TOML string (for testing).
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: ShipvalConfig = toml::from_str(source).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = &self.normalization;
        for (field, value) in [
            ("normalization.fuzzy_threshold", n.fuzzy_threshold),
            ("normalization.review_threshold", n.review_threshold),
        ] {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(ConfigError::validation(field, "must be between 0.0 and 1.0"));
                }
            }
        }
        if let Some(margin) = n.fuzzy_margin {
            if !(0.0..1.0).contains(&margin) {
                return Err(ConfigError::validation(
                    "normalization.fuzzy_margin",
                    "must be at least 0.0 and below 1.0",
                ));
            }
        }
        if self.evaluation.batch_size == Some(0) {
            return Err(ConfigError::validation("evaluation.batch_size", "must be greater than 0"));
        }
        n.gate()?;
        Ok(())
    }

    pub fn run_settings(&self) -> Result<RunSettings, ConfigError> {
        Ok(RunSettings {
            pipeline: PipelineConfig {
                mode: self.normalization.effective_mode(),
                resolver: self.normalization.effective_resolver(),
                gate: self.normalization.gate()?,
            },
            evaluator: self.evaluation.effective_evaluator(),
            requirement_sets: self.evaluation.requirement_sets.clone(),
            constraints: self.evaluation.constraints.clone(),
            fail_on: self.evaluation.effective_fail_on(),
        })
    }
}
