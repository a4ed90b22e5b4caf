use serde::{Deserialize, Serialize};

use super::super::aggregate::KraScore;
use super::super::domain::KraId;
use super::super::thresholds::reaches;
use super::super::validation::ConfigurationError;

/// Decides which KRA a bonus rule is about.
///
/// Keeping this behind one trait lets title matching be replaced with stable
/// id references without touching the aggregation math.
pub trait BonusPredicate {
    fn matches(&self, kra_id: &KraId, title: &str) -> bool;

    fn describe(&self) -> String;
}

/// Serializable bonus predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KraMatcher {
    /// Case-insensitive substring of the KRA title.
    TitleContains { pattern: String },
    /// Exact KRA id.
    KraId { kra_id: KraId },
}

impl BonusPredicate for KraMatcher {
    fn matches(&self, kra_id: &KraId, title: &str) -> bool {
        match self {
            KraMatcher::TitleContains { pattern } => title
                .to_lowercase()
                .contains(&pattern.to_lowercase()),
            KraMatcher::KraId { kra_id: expected } => expected == kra_id,
        }
    }

    fn describe(&self) -> String {
        match self {
            KraMatcher::TitleContains { pattern } => format!("title contains '{pattern}'"),
            KraMatcher::KraId { kra_id } => format!("KRA '{kra_id}'"),
        }
    }
}

/// Additive incentive paid when a specific KRA reaches a threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusRule {
    pub name: String,
    pub matcher: KraMatcher,
    /// Uncapped achievement percentage the matched KRA must reach.
    pub achievement_threshold: f64,
    pub bonus_amount: u64,
}

impl BonusRule {
    pub fn title_contains(
        name: impl Into<String>,
        pattern: impl Into<String>,
        achievement_threshold: f64,
        bonus_amount: u64,
    ) -> Self {
        Self {
            name: name.into(),
            matcher: KraMatcher::TitleContains {
                pattern: pattern.into(),
            },
            achievement_threshold,
            bonus_amount,
        }
    }

    pub fn for_kra(
        name: impl Into<String>,
        kra_id: KraId,
        achievement_threshold: f64,
        bonus_amount: u64,
    ) -> Self {
        Self {
            name: name.into(),
            matcher: KraMatcher::KraId { kra_id },
            achievement_threshold,
            bonus_amount,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        let malformed = |reason: &str| ConfigurationError::MalformedBonusRule {
            name: self.name.clone(),
            reason: reason.to_string(),
        };

        if !self.achievement_threshold.is_finite() || self.achievement_threshold < 0.0 {
            return Err(malformed("achievement threshold must be a non-negative number"));
        }
        if let KraMatcher::TitleContains { pattern } = &self.matcher {
            if pattern.trim().is_empty() {
                return Err(malformed("title pattern must not be blank"));
            }
        }
        Ok(())
    }
}

/// A bonus rule that paid out, with the evidence that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiredBonus {
    pub rule: String,
    pub kra_id: KraId,
    pub kra_title: String,
    pub achievement_pct: f64,
    pub threshold: f64,
    pub amount: u64,
}

/// Evaluates every rule independently; rules without a matching KRA are skipped.
pub(crate) fn evaluate_bonuses(rules: &[BonusRule], per_kra: &[KraScore]) -> Vec<FiredBonus> {
    let mut fired = Vec::new();

    for rule in rules {
        let Some(score) = per_kra
            .iter()
            .find(|score| rule.matcher.matches(&score.kra_id, &score.title))
        else {
            tracing::debug!(
                rule = %rule.name,
                matcher = %rule.matcher.describe(),
                "bonus rule skipped: no matching KRA"
            );
            continue;
        };

        if reaches(score.achievement_pct, rule.achievement_threshold) {
            tracing::debug!(
                rule = %rule.name,
                kra = %score.kra_id,
                achievement = score.achievement_pct,
                "bonus rule fired"
            );
            fired.push(FiredBonus {
                rule: rule.name.clone(),
                kra_id: score.kra_id.clone(),
                kra_title: score.title.clone(),
                achievement_pct: score.achievement_pct,
                threshold: rule.achievement_threshold,
                amount: rule.bonus_amount,
            });
        }
    }

    fired
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(id: &str, title: &str, pct: f64) -> KraScore {
        KraScore {
            kra_id: KraId::new(id),
            title: title.to_string(),
            weightage: 50,
            achievement_pct: pct,
            contribution: pct.min(100.0) * 0.5,
        }
    }

    #[test]
    fn title_match_is_case_insensitive() {
        let matcher = KraMatcher::TitleContains {
            pattern: "SHG".to_string(),
        };
        assert!(matcher.matches(&KraId::new("k1"), "shg creation"));
        assert!(matcher.matches(&KraId::new("k1"), "New Shg Linkages"));
        assert!(!matcher.matches(&KraId::new("k1"), "FD Acquisition"));
    }

    #[test]
    fn id_match_ignores_title() {
        let matcher = KraMatcher::KraId {
            kra_id: KraId::new("k7"),
        };
        assert!(matcher.matches(&KraId::new("k7"), "Renamed KRA"));
        assert!(!matcher.matches(&KraId::new("k8"), "Renamed KRA"));
    }

    #[test]
    fn uses_first_matching_kra() {
        let rules = vec![BonusRule::title_contains("visits", "visit", 100.0, 1000)];
        let per_kra = vec![
            score("a", "Customer Visits", 80.0),
            score("b", "Branch Visits", 120.0),
        ];

        assert!(evaluate_bonuses(&rules, &per_kra).is_empty());
    }

    #[test]
    fn threshold_is_inclusive_and_uncapped() {
        let rules = vec![
            BonusRule::title_contains("conversion", "conversion", 105.0, 1500),
            BonusRule::title_contains("shg", "shg", 90.0, 2000),
        ];
        let per_kra = vec![
            score("a", "Lead Conversion", 105.0),
            score("b", "SHG Creation", 89.9),
        ];

        let fired = evaluate_bonuses(&rules, &per_kra);

        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].rule, "conversion");
        assert_eq!(fired[0].amount, 1500);
    }

    #[test]
    fn computed_ratio_on_threshold_fires() {
        let rules = vec![BonusRule::title_contains("shg", "shg", 90.0, 2000)];
        let per_kra = vec![score("a", "SHG Creation", 29.88 / 33.2 * 100.0)];

        let fired = evaluate_bonuses(&rules, &per_kra);

        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].amount, 2000);
    }

    #[test]
    fn pattern_whitespace_is_significant() {
        let matcher = KraMatcher::TitleContains {
            pattern: " visit".to_string(),
        };
        assert!(matcher.matches(&KraId::new("k1"), "Customer Visits"));
        assert!(!matcher.matches(&KraId::new("k2"), "Revisit Calls"));
    }

    #[test]
    fn blank_pattern_is_malformed() {
        let rule = BonusRule::title_contains("empty", "  ", 90.0, 100);
        assert!(matches!(
            rule.validate(),
            Err(ConfigurationError::MalformedBonusRule { .. })
        ));
    }
}
