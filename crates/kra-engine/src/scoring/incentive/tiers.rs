use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::super::validation::ConfigurationError;

/// Highest aggregate score the engine can produce.
const MAX_ATTAINABLE_SCORE: u32 = 100;

/// Score threshold mapped to a base incentive amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncentiveTier {
    pub min_score: u32,
    pub base_amount: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl IncentiveTier {
    pub fn new(min_score: u32, base_amount: u64) -> Self {
        Self {
            min_score,
            base_amount,
            label: None,
        }
    }

    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Display label, defaulting to the threshold itself (e.g. `90%`).
    pub fn label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("{}%", self.min_score))
    }
}

/// Validated tier table, kept sorted by descending `min_score`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TierTable {
    tiers: Vec<IncentiveTier>,
}

impl TierTable {
    pub fn new(mut tiers: Vec<IncentiveTier>) -> Result<Self, ConfigurationError> {
        if tiers.is_empty() {
            return Err(ConfigurationError::EmptyTierTable);
        }

        let mut seen = BTreeSet::new();
        for tier in &tiers {
            if !seen.insert(tier.min_score) {
                return Err(ConfigurationError::MalformedTierTable {
                    reason: format!("minimum score {} is listed more than once", tier.min_score),
                });
            }
            if tier.min_score > MAX_ATTAINABLE_SCORE {
                return Err(ConfigurationError::MalformedTierTable {
                    reason: format!(
                        "minimum score {} exceeds the attainable maximum of {}",
                        tier.min_score, MAX_ATTAINABLE_SCORE
                    ),
                });
            }
        }

        tiers.sort_by(|left, right| right.min_score.cmp(&left.min_score));
        Ok(Self { tiers })
    }

    /// `>=100 -> 5000`, `>=90 -> 2000`, `>=80 -> 1000`.
    pub(crate) fn reference() -> Self {
        Self {
            tiers: vec![
                IncentiveTier::new(100, 5000),
                IncentiveTier::new(90, 2000),
                IncentiveTier::new(80, 1000),
            ],
        }
    }

    pub fn tiers(&self) -> &[IncentiveTier] {
        &self.tiers
    }

    /// First tier, scanning from the highest threshold, that the score reaches.
    pub fn select(&self, score: u32) -> Option<&IncentiveTier> {
        self.tiers.iter().find(|tier| tier.min_score <= score)
    }

    /// Lowest tier strictly above the score.
    pub fn next_above(&self, score: u32) -> Option<&IncentiveTier> {
        self.tiers.iter().rev().find(|tier| tier.min_score > score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_table() -> TierTable {
        TierTable::new(vec![
            IncentiveTier::new(80, 1000),
            IncentiveTier::new(100, 5000),
            IncentiveTier::new(90, 2000),
        ])
        .expect("valid table")
    }

    #[test]
    fn sorts_highest_threshold_first() {
        let table = reference_table();
        let order: Vec<u32> = table.tiers().iter().map(|tier| tier.min_score).collect();
        assert_eq!(order, vec![100, 90, 80]);
    }

    #[test]
    fn selection_is_monotonic() {
        let table = reference_table();
        let amounts: Vec<u64> = [79, 80, 90, 100]
            .iter()
            .map(|score| table.select(*score).map(|tier| tier.base_amount).unwrap_or(0))
            .collect();

        assert_eq!(amounts, vec![0, 1000, 2000, 5000]);
        assert!(amounts.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn next_tier_is_the_closest_above() {
        let table = reference_table();
        assert_eq!(table.next_above(85).map(|tier| tier.min_score), Some(90));
        assert_eq!(table.next_above(10).map(|tier| tier.min_score), Some(80));
        assert!(table.next_above(100).is_none());
    }

    #[test]
    fn empty_table_is_rejected() {
        assert_eq!(TierTable::new(Vec::new()), Err(ConfigurationError::EmptyTierTable));
    }

    #[test]
    fn duplicate_threshold_is_rejected() {
        let result = TierTable::new(vec![IncentiveTier::new(90, 2000), IncentiveTier::new(90, 2500)]);
        assert!(matches!(
            result,
            Err(ConfigurationError::MalformedTierTable { .. })
        ));
    }

    #[test]
    fn unreachable_threshold_is_rejected() {
        let result = TierTable::new(vec![IncentiveTier::new(120, 9000)]);
        assert!(matches!(
            result,
            Err(ConfigurationError::MalformedTierTable { .. })
        ));
    }

    #[test]
    fn label_defaults_to_threshold() {
        assert_eq!(IncentiveTier::new(90, 2000).label(), "90%");
        assert_eq!(IncentiveTier::new(100, 5000).labelled("Star").label(), "Star");
    }
}
