use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::aggregate::{aggregate, KraScore};
use super::domain::{Kra, KraId, RoleId, ThresholdBands, Zone};
use super::incentive::{IncentiveBreakdown, IncentivePlan};
use super::thresholds::ThresholdResolver;
use super::validation::{check_kra_list, ConfigurationError, ValidatedKraSet};
use super::zone::classify;

/// Hypothetical achieved values keyed by KRA id.
pub type AchievementOverrides = BTreeMap<KraId, f64>;

/// Stateless what-if evaluator composing aggregation, zoning and incentives.
///
/// Holds only read-only configuration, so a single instance can be shared
/// across threads and called concurrently.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationEngine {
    resolver: ThresholdResolver,
    plan: IncentivePlan,
}

impl SimulationEngine {
    pub fn new(resolver: ThresholdResolver, plan: IncentivePlan) -> Self {
        Self { resolver, plan }
    }

    pub fn resolver(&self) -> &ThresholdResolver {
        &self.resolver
    }

    pub fn plan(&self) -> &IncentivePlan {
        &self.plan
    }

    /// Simulates a role-less KRA list; thresholds come from KRA overrides or the global default.
    pub fn simulate(
        &self,
        kras: &[Kra],
        overrides: &AchievementOverrides,
    ) -> Result<SimulationResult, ConfigurationError> {
        self.run(None, kras, overrides)
    }

    pub fn simulate_for_role(
        &self,
        role: &RoleId,
        kras: &[Kra],
        overrides: &AchievementOverrides,
    ) -> Result<SimulationResult, ConfigurationError> {
        self.run(Some(role), kras, overrides)
    }

    pub fn simulate_set(
        &self,
        set: &ValidatedKraSet,
        overrides: &AchievementOverrides,
    ) -> Result<SimulationResult, ConfigurationError> {
        self.run(Some(set.role()), set.kras(), overrides)
    }

    /// Scores the stored achievements with no hypothetical values applied.
    pub fn actual(&self, set: &ValidatedKraSet) -> Result<SimulationResult, ConfigurationError> {
        self.simulate_set(set, &AchievementOverrides::new())
    }

    fn run(
        &self,
        role: Option<&RoleId>,
        kras: &[Kra],
        overrides: &AchievementOverrides,
    ) -> Result<SimulationResult, ConfigurationError> {
        let (working, simulated) = apply_overrides(kras, overrides)?;
        check_kra_list(&working)?;

        let scores = aggregate(&working)?;

        let per_kra = working
            .iter()
            .zip(&scores.per_kra)
            .map(|(kra, score)| {
                let bands = self.resolver.resolve(role, Some(kra));
                KraAchievement::from_score(kra, score, classify(score.achievement_pct, &bands))
                    .simulated(simulated.contains(&kra.id))
            })
            .collect();

        let aggregate_thresholds = self.resolver.resolve(role, None);
        let aggregate_zone = classify(f64::from(scores.aggregate_score), &aggregate_thresholds);
        let incentive = self.plan.resolve(scores.aggregate_score, &scores.per_kra);

        tracing::debug!(
            role = role.map(RoleId::as_str).unwrap_or("-"),
            score = scores.aggregate_score,
            zone = aggregate_zone.label(),
            total_incentive = incentive.total_incentive,
            simulated = simulated.len(),
            "simulation complete"
        );

        Ok(SimulationResult {
            role: role.cloned(),
            per_kra,
            aggregate_score: scores.aggregate_score,
            aggregate_zone,
            aggregate_thresholds,
            incentive,
        })
    }
}

/// Copies the KRAs, replacing `achieved` wherever an override is present.
fn apply_overrides(
    kras: &[Kra],
    overrides: &AchievementOverrides,
) -> Result<(Vec<Kra>, BTreeSet<KraId>), ConfigurationError> {
    for (kra_id, value) in overrides {
        if !value.is_finite() || *value < 0.0 {
            return Err(ConfigurationError::InvalidOverride {
                kra_id: kra_id.clone(),
                value: *value,
            });
        }
        if !kras.iter().any(|kra| &kra.id == kra_id) {
            tracing::debug!(kra = %kra_id, "ignoring override for KRA outside the set");
        }
    }

    let mut simulated = BTreeSet::new();
    let working = kras
        .iter()
        .map(|kra| {
            let mut copy = kra.clone();
            if let Some(value) = overrides.get(&kra.id) {
                copy.achieved = *value;
                simulated.insert(kra.id.clone());
            }
            copy
        })
        .collect();

    Ok((working, simulated))
}

/// Per-KRA line of a simulation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KraAchievement {
    pub kra_id: KraId,
    pub title: String,
    pub weightage: u32,
    pub target: f64,
    pub achieved: f64,
    /// Uncapped, used for display and bonus rules.
    pub achievement_pct: f64,
    /// Capped share of the aggregate score.
    pub contribution: f64,
    pub zone: Zone,
    pub over_achieved: bool,
    /// Whether `achieved` came from a what-if override.
    pub simulated: bool,
}

impl KraAchievement {
    fn from_score(kra: &Kra, score: &KraScore, zone: Zone) -> Self {
        Self {
            kra_id: kra.id.clone(),
            title: kra.title.clone(),
            weightage: kra.weightage,
            target: kra.target,
            achieved: kra.achieved,
            achievement_pct: score.achievement_pct,
            contribution: score.contribution,
            zone,
            over_achieved: score.over_achieved(),
            simulated: false,
        }
    }

    fn simulated(mut self, simulated: bool) -> Self {
        self.simulated = simulated;
        self
    }
}

/// Score, zone and incentive breakdown for one simulation call. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleId>,
    pub per_kra: Vec<KraAchievement>,
    pub aggregate_score: u32,
    pub aggregate_zone: Zone,
    pub aggregate_thresholds: ThresholdBands,
    pub incentive: IncentiveBreakdown,
}

impl SimulationResult {
    pub fn achievement(&self, kra_id: &KraId) -> Option<&KraAchievement> {
        self.per_kra.iter().find(|line| &line.kra_id == kra_id)
    }

    /// Achievement percentage and zone keyed by KRA id.
    pub fn per_kra_map(&self) -> BTreeMap<KraId, (f64, Zone)> {
        self.per_kra
            .iter()
            .map(|line| (line.kra_id.clone(), (line.achievement_pct, line.zone)))
            .collect()
    }

    pub fn zone_counts(&self) -> BTreeMap<Zone, usize> {
        let mut counts: BTreeMap<Zone, usize> = Zone::ALL.iter().map(|zone| (*zone, 0)).collect();
        for line in &self.per_kra {
            *counts.entry(line.zone).or_default() += 1;
        }
        counts
    }

    pub fn summary(&self) -> String {
        let incentive = &self.incentive;
        format!(
            "score {} ({}) | base {} [{}] + bonus {} = {}",
            self.aggregate_score,
            self.aggregate_zone,
            format_amount(incentive.base_incentive),
            incentive.tier_label,
            format_amount(incentive.bonus_total),
            format_amount(incentive.total_incentive)
        )
    }
}

/// Groups thousands with commas, e.g. `12500` -> `12,500`.
pub fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_amounts_with_grouping() {
        assert_eq!(format_amount(0), "0");
        assert_eq!(format_amount(999), "999");
        assert_eq!(format_amount(4000), "4,000");
        assert_eq!(format_amount(1_250_000), "1,250,000");
    }

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SimulationEngine>();
        assert_send_sync::<SimulationResult>();
    }
}
