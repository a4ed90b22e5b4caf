
use serde::{Deserialize, Serialize};

use super::domain::{Kra, KraId};
use super::validation::{check_target, ConfigurationError};

/// Ceiling applied to each KRA before it contributes to the aggregate.
pub const CONTRIBUTION_CAP_PCT: f64 = 100.0;

/// Achievement of one KRA and its weighted share of the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KraScore {
    pub kra_id: KraId,
    pub title: String,
    pub weightage: u32,
    /// Uncapped `achieved / target * 100`.
    pub achievement_pct: f64,
    /// `min(achievement_pct, 100) * weightage / 100`, unrounded.
    pub contribution: f64,
}

impl KraScore {
    pub fn over_achieved(&self) -> bool {
        self.achievement_pct > CONTRIBUTION_CAP_PCT
    }
}

/// Output of [`aggregate`]: per-KRA percentages plus the rounded weighted score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreAggregate {
    pub per_kra: Vec<KraScore>,
    pub raw_total: f64,
    pub aggregate_score: u32,
}

impl ScoreAggregate {
    pub fn percent(&self, kra_id: &KraId) -> Option<f64> {
        self.per_kra
            .iter()
            .find(|score| &score.kra_id == kra_id)
            .map(|score| score.achievement_pct)
    }
}

/// Uncapped achievement percentage of a single KRA.
pub fn achievement_pct(kra: &Kra) -> Result<f64, ConfigurationError> {
    check_target(kra)?;
    Ok(kra.achieved / kra.target * 100.0)
}

/// Computes per-KRA achievement and the weighted overall score.
///
/// Callers are expected to have validated the set already; a non-positive
/// target is still rejected here because the ratio is undefined.
pub fn aggregate(kras: &[Kra]) -> Result<ScoreAggregate, ConfigurationError> {
    let mut per_kra = Vec::with_capacity(kras.len());
    let mut raw_total = 0.0;

    for kra in kras {
        let pct = achievement_pct(kra)?;
        let contribution = pct.min(CONTRIBUTION_CAP_PCT) * f64::from(kra.weightage) / 100.0;
        raw_total += contribution;

        per_kra.push(KraScore {
            kra_id: kra.id.clone(),
            title: kra.title.clone(),
            weightage: kra.weightage,
            achievement_pct: pct,
            contribution,
        });
    }

    Ok(ScoreAggregate {
        per_kra,
        raw_total,
        aggregate_score: raw_total.round().max(0.0) as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn single_kra_on_target_scores_hundred() {
        let kras = vec![Kra::new("fd", "FD Acquisition", 20.0, 100).with_achieved(20.0)];

        let result = aggregate(&kras).expect("valid kra");

        assert_eq!(result.aggregate_score, 100);
        assert_close(result.per_kra[0].achievement_pct, 100.0);
    }

    #[test]
    fn over_achievement_is_capped_only_in_contribution() {
        let kras = vec![
            Kra::new("loans", "Loan Disbursal", 10.0, 50).with_achieved(15.0),
            Kra::new("casa", "CASA Accounts", 10.0, 50).with_achieved(0.0),
        ];

        let result = aggregate(&kras).expect("valid kras");
        let loans = &result.per_kra[0];

        assert_close(loans.achievement_pct, 150.0);
        assert_close(loans.contribution, 50.0);
        assert!(loans.over_achieved());
        assert_eq!(result.aggregate_score, 50);
        assert_eq!(result.percent(&KraId::new("loans")), Some(150.0));
    }

    #[test]
    fn rounds_to_nearest_integer() {
        let kras = vec![
            Kra::new("a", "Visits", 100.0, 50).with_achieved(81.0),
            Kra::new("b", "Leads", 100.0, 50).with_achieved(80.0),
        ];

        let result = aggregate(&kras).expect("valid kras");

        assert_close(result.raw_total, 80.5);
        assert_eq!(result.aggregate_score, 81);
    }

    #[test]
    fn zero_target_is_signalled() {
        let kras = vec![Kra::new("a", "Visits", 0.0, 100).with_achieved(5.0)];

        match aggregate(&kras) {
            Err(ConfigurationError::NonPositiveTarget { kra_id, target }) => {
                assert_eq!(kra_id, KraId::new("a"));
                assert_eq!(target, 0.0);
            }
            other => panic!("expected non-positive target error, got {other:?}"),
        }
    }

    #[test]
    fn zero_achievement_is_not_an_error() {
        let kras = vec![Kra::new("a", "Visits", 40.0, 100)];

        let result = aggregate(&kras).expect("zero achievement is normal data");

        assert_eq!(result.aggregate_score, 0);
    }
}
