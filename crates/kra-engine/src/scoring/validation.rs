use std::collections::BTreeSet;

use serde::Serialize;

use super::domain::{Kra, KraId, RoleId};
use super::thresholds::validate_bands;

/// Required sum of weightages across one role's active KRA set.
pub const REQUIRED_TOTAL_WEIGHTAGE: u32 = 100;

/// Raised when configuration handed to the engine breaks an invariant scoring depends on.
///
/// Every variant carries the offending value so operators can correct the
/// configuration directly.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("KRA set is empty")]
    EmptyKraSet,
    #[error("KRA '{kra_id}' weightage {weightage}% is outside 0-100%")]
    WeightageOutOfRange { kra_id: KraId, weightage: u32 },
    #[error("total weightage {total}% ≠ 100%")]
    WeightageTotal { total: u32 },
    #[error("KRA '{kra_id}' target {target} must be greater than zero")]
    NonPositiveTarget { kra_id: KraId, target: f64 },
    #[error("KRA '{kra_id}' achieved value {achieved} must be a non-negative number")]
    InvalidAchievement { kra_id: KraId, achieved: f64 },
    #[error("KRA id '{kra_id}' appears more than once")]
    DuplicateKra { kra_id: KraId },
    #[error("malformed threshold bands: {reason}")]
    MalformedBands { reason: String },
    #[error("incentive tier table is empty")]
    EmptyTierTable,
    #[error("malformed incentive tier table: {reason}")]
    MalformedTierTable { reason: String },
    #[error("bonus rule '{name}' is malformed: {reason}")]
    MalformedBonusRule { name: String, reason: String },
    #[error("simulated achievement {value} for KRA '{kra_id}' must be a non-negative number")]
    InvalidOverride { kra_id: KraId, value: f64 },
}

/// Immutable, validated snapshot of the KRAs applicable to a role.
///
/// Only [`validate_kra_set`] builds one, so holders can rely on the weightage
/// and target invariants without re-checking them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedKraSet {
    role: RoleId,
    kras: Vec<Kra>,
}

impl ValidatedKraSet {
    pub fn role(&self) -> &RoleId {
        &self.role
    }

    pub fn kras(&self) -> &[Kra] {
        &self.kras
    }

    pub fn len(&self) -> usize {
        self.kras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kras.is_empty()
    }

    pub fn get(&self, id: &KraId) -> Option<&Kra> {
        self.kras.iter().find(|kra| &kra.id == id)
    }

    pub fn total_weightage(&self) -> u32 {
        self.kras.iter().map(|kra| kra.weightage).sum()
    }
}

/// Validates a candidate KRA list for `role`, all-or-nothing.
pub fn validate_kra_set(role: RoleId, kras: Vec<Kra>) -> Result<ValidatedKraSet, ConfigurationError> {
    check_kra_list(&kras)?;
    Ok(ValidatedKraSet { role, kras })
}

/// Runs every per-KRA and set-level check without taking ownership.
pub(crate) fn check_kra_list(kras: &[Kra]) -> Result<(), ConfigurationError> {
    if kras.is_empty() {
        return Err(ConfigurationError::EmptyKraSet);
    }

    let mut seen = BTreeSet::new();
    for kra in kras {
        if !seen.insert(&kra.id) {
            return Err(ConfigurationError::DuplicateKra {
                kra_id: kra.id.clone(),
            });
        }

        if kra.weightage > REQUIRED_TOTAL_WEIGHTAGE {
            return Err(ConfigurationError::WeightageOutOfRange {
                kra_id: kra.id.clone(),
                weightage: kra.weightage,
            });
        }

        check_target(kra)?;

        if !kra.achieved.is_finite() || kra.achieved < 0.0 {
            return Err(ConfigurationError::InvalidAchievement {
                kra_id: kra.id.clone(),
                achieved: kra.achieved,
            });
        }

        if let Some(bands) = &kra.thresholds {
            validate_bands(bands)?;
        }
    }

    let total: u32 = kras.iter().map(|kra| kra.weightage).sum();
    if total != REQUIRED_TOTAL_WEIGHTAGE {
        return Err(ConfigurationError::WeightageTotal { total });
    }

    Ok(())
}

/// Rejects targets that would make the achievement ratio undefined.
pub(crate) fn check_target(kra: &Kra) -> Result<(), ConfigurationError> {
    if kra.target.is_finite() && kra.target > 0.0 {
        Ok(())
    } else {
        Err(ConfigurationError::NonPositiveTarget {
            kra_id: kra.id.clone(),
            target: kra.target,
        })
    }
}
