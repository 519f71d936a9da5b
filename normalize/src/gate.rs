//! Label gate: skip list and out-of-domain patterns, applied before resolution.

use std::collections::BTreeSet;

/// Label families that never describe ship design data: packet counters,
/// PLC and firmware registers, debug variables, cabinet and memory
/// temperatures, checksums and vibration alarms.
pub const DEFAULT_OUT_OF_DOMAIN_PATTERNS: &[&str] = &[
    r"\bPkt",
    r"\bPLC",
    r"\bFW[_-]",
    r"\bDbgVar",
    r"\bMemTemp",
    r"\bCabTemp",
    r"\bChecksum",
    r"\bVibAlarm",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateVerdict {
    Pass,
    Skip,
    OutOfDomain(String),
}

#[derive(Debug, Clone)]
pub struct LabelGate {
    patterns: Vec<(String, regex_lite::Regex)>,
    skip: BTreeSet<String>,
}

impl Default for LabelGate {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_OUT_OF_DOMAIN_PATTERNS
                .iter()
                .filter_map(|p| compile(p).ok().map(|re| (p.to_string(), re)))
                .collect(),
            skip: BTreeSet::new(),
        }
    }
}

fn compile(pattern: &str) -> Result<regex_lite::Regex, regex_lite::Error> {
    regex_lite::Regex::new(&format!("(?i){pattern}"))
}

impl LabelGate {
    /// Build a gate from explicit patterns (matched case-insensitively) and
    /// skip-listed labels (matched exactly, ignoring case).
    pub fn new<P, S>(patterns: P, skip: S) -> Result<Self, regex_lite::Error>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| compile(p.as_ref()).map(|re| (p.as_ref().to_string(), re)))
            .collect::<Result<Vec<_>, _>>()?;
        let skip = skip
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .collect();
        Ok(Self { patterns, skip })
    }

    pub fn verdict(&self, label: &str) -> GateVerdict {
        if self.skip.contains(&label.trim().to_lowercase()) {
            return GateVerdict::Skip;
        }
        self.patterns
            .iter()
            .find(|(_, re)| re.is_match(label))
            .map(|(p, _)| GateVerdict::OutOfDomain(p.clone()))
            .unwrap_or(GateVerdict::Pass)
    }
}
