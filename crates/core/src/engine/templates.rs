//! Static allocation tables, one per risk band.
//!
//! Loaded and verified once at process start, then shared read-only.

use crate::domain::risk::RiskBand;
use crate::error::PlanError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateEntry {
    pub ticker: String,
    pub weight: f64,
}

/// Ordered ticker weights. Order is preserved in every allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllocationTemplate {
    entries: Vec<TemplateEntry>,
}

impl AllocationTemplate {
    pub fn new(entries: Vec<TemplateEntry>) -> Self {
        Self { entries }
    }

    fn from_static(entries: &[(&str, f64)]) -> Self {
        Self::new(
            entries
                .iter()
                .map(|(ticker, weight)| TemplateEntry {
                    ticker: ticker.to_string(),
                    weight: *weight,
                })
                .collect(),
        )
    }

    pub fn entries(&self) -> &[TemplateEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the first entry holding the maximal weight.
    pub fn largest_weight_index(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, entry) in self.entries.iter().enumerate() {
            match best {
                Some((_, w)) if entry.weight <= w => {}
                _ => best = Some((idx, entry.weight)),
            }
        }
        best.map(|(idx, _)| idx)
    }

    pub fn verify(&self) -> Result<(), PlanError> {
        if self.entries.is_empty() {
            return Err(PlanError::configuration("template has no tickers"));
        }

        let mut seen = BTreeSet::new();
        let mut sum = 0.0;
        for entry in &self.entries {
            let ticker = entry.ticker.trim();
            if ticker.is_empty() {
                return Err(PlanError::configuration("template ticker must be non-empty"));
            }
            if !seen.insert(ticker) {
                return Err(PlanError::configuration(format!(
                    "duplicate ticker in template: {ticker}"
                )));
            }
            if !(entry.weight > 0.0 && entry.weight <= 1.0) {
                return Err(PlanError::configuration(format!(
                    "weight for {ticker} must be in (0, 1] (got {})",
                    entry.weight
                )));
            }
            sum += entry.weight;
        }

        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(PlanError::configuration(format!(
                "template weights must sum to 1.0 (got {sum})"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateSet {
    pub conservative: AllocationTemplate,
    pub moderate: AllocationTemplate,
    pub aggressive: AllocationTemplate,
}

impl TemplateSet {
    pub fn builtin() -> Result<Self, PlanError> {
        let set = Self {
            conservative: AllocationTemplate::from_static(&[
                ("BND", 0.40),
                ("AGG", 0.20),
                ("VTI", 0.20),
                ("VXUS", 0.10),
                ("SHY", 0.10),
            ]),
            moderate: AllocationTemplate::from_static(&[
                ("VTI", 0.40),
                ("BND", 0.25),
                ("VXUS", 0.20),
                ("QQQ", 0.10),
                ("VNQ", 0.05),
            ]),
            aggressive: AllocationTemplate::from_static(&[
                ("VTI", 0.40),
                ("QQQ", 0.25),
                ("VXUS", 0.20),
                ("VWO", 0.10),
                ("BND", 0.05),
            ]),
        };
        set.verify()?;
        Ok(set)
    }

    pub fn from_json_str(json: &str) -> Result<Self, PlanError> {
        let set: Self = serde_json::from_str(json).map_err(|e| {
            PlanError::configuration(format!("allocation templates are not valid JSON: {e}"))
        })?;
        set.verify()?;
        Ok(set)
    }

    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read allocation templates: {}", path.display()))?;
        Ok(Self::from_json_str(&json)?)
    }

    pub fn template_for(&self, band: RiskBand) -> &AllocationTemplate {
        match band {
            RiskBand::Conservative => &self.conservative,
            RiskBand::Moderate => &self.moderate,
            RiskBand::Aggressive => &self.aggressive,
        }
    }

    pub fn verify(&self) -> Result<(), PlanError> {
        for band in RiskBand::ALL {
            self.template_for(band).verify().map_err(|e| {
                PlanError::configuration(format!("{band} template: {}", e.reason()))
            })?;
        }
        Ok(())
    }
}
