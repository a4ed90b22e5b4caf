mod bonus;
mod tiers;

pub use bonus::{BonusPredicate, BonusRule, FiredBonus, KraMatcher};
pub use tiers::{IncentiveTier, TierTable};

use serde::{Deserialize, Serialize};

use super::aggregate::KraScore;
use super::validation::ConfigurationError;
use bonus::evaluate_bonuses;

/// Label reported when the aggregate score reaches no tier.
pub const BELOW_MINIMUM_TIER: &str = "Below minimum tier";

/// Tier table plus bonus rules, validated as one configuration snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IncentivePlanConfig")]
pub struct IncentivePlan {
    tiers: TierTable,
    bonus_rules: Vec<BonusRule>,
}

#[derive(Debug, Clone, Deserialize)]
struct IncentivePlanConfig {
    tiers: Vec<IncentiveTier>,
    #[serde(default)]
    bonus_rules: Vec<BonusRule>,
}

impl TryFrom<IncentivePlanConfig> for IncentivePlan {
    type Error = ConfigurationError;

    fn try_from(value: IncentivePlanConfig) -> Result<Self, Self::Error> {
        IncentivePlan::new(value.tiers, value.bonus_rules)
    }
}

impl IncentivePlan {
    pub fn new(tiers: Vec<IncentiveTier>, bonus_rules: Vec<BonusRule>) -> Result<Self, ConfigurationError> {
        let tiers = TierTable::new(tiers)?;
        for rule in &bonus_rules {
            rule.validate()?;
        }
        Ok(Self { tiers, bonus_rules })
    }

    /// Tiers and bonus rules used by the field sales incentive simulator.
    ///
    /// Bonus thresholds differ per rule and are kept as configured values.
    pub fn reference() -> Self {
        Self {
            tiers: TierTable::reference(),
            bonus_rules: vec![
                BonusRule::title_contains("SHG creation bonus", "shg", 90.0, 2000),
                BonusRule::title_contains("Customer visit bonus", "visit", 100.0, 1000),
                BonusRule::title_contains("Lead conversion bonus", "conversion", 105.0, 1500),
            ],
        }
    }

    pub fn tiers(&self) -> &[IncentiveTier] {
        self.tiers.tiers()
    }

    pub fn bonus_rules(&self) -> &[BonusRule] {
        &self.bonus_rules
    }

    pub fn resolve(&self, aggregate_score: u32, per_kra: &[KraScore]) -> IncentiveBreakdown {
        let (base_incentive, tier_label, tier_min_score) = match self.tiers.select(aggregate_score) {
            Some(tier) => (tier.base_amount, tier.label(), Some(tier.min_score)),
            None => (0, BELOW_MINIMUM_TIER.to_string(), None),
        };

        let next_tier = self.tiers.next_above(aggregate_score).map(|tier| NextTier {
            label: tier.label(),
            min_score: tier.min_score,
            base_amount: tier.base_amount,
            points_needed: tier.min_score - aggregate_score,
        });

        let fired_bonuses = evaluate_bonuses(&self.bonus_rules, per_kra);
        let bonus_total: u64 = fired_bonuses.iter().map(|bonus| bonus.amount).sum();

        IncentiveBreakdown {
            base_incentive,
            tier_label,
            tier_min_score,
            bonus_total,
            fired_bonuses,
            total_incentive: base_incentive + bonus_total,
            next_tier,
        }
    }
}

impl Default for IncentivePlan {
    fn default() -> Self {
        IncentivePlan::reference()
    }
}

/// Maps an aggregate score and per-KRA results to base tier and bonuses.
///
/// Fails only when the tier table or a bonus rule is malformed; missing KRAs
/// and low performance simply earn nothing.
pub fn resolve_incentive(
    aggregate_score: u32,
    per_kra: &[KraScore],
    tiers: &[IncentiveTier],
    bonus_rules: &[BonusRule],
) -> Result<IncentiveBreakdown, ConfigurationError> {
    let plan = IncentivePlan::new(tiers.to_vec(), bonus_rules.to_vec())?;
    Ok(plan.resolve(aggregate_score, per_kra))
}

/// Base tier, fired bonuses and total payout for one aggregate score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncentiveBreakdown {
    pub base_incentive: u64,
    pub tier_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_min_score: Option<u32>,
    pub bonus_total: u64,
    pub fired_bonuses: Vec<FiredBonus>,
    pub total_incentive: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_tier: Option<NextTier>,
}

/// Distance from the current score to the next tier up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextTier {
    pub label: String,
    pub min_score: u32,
    pub base_amount: u64,
    pub points_needed: u32,
}
