//! Performance scoring and incentive computation for sales-role KRAs.
//!
//! Configuration arrives as immutable snapshots ([`ValidatedKraSet`],
//! [`ThresholdResolver`], [`IncentivePlan`]) and every computation is a pure
//! function of its inputs. The repository, service and router modules wrap
//! the engine for the HTTP service; none of them add state to scoring itself.

pub mod aggregate;
pub mod domain;
pub mod import;
pub mod incentive;
pub mod repository;
pub mod router;
pub mod service;
pub mod simulation;
pub mod thresholds;
pub mod validation;
pub mod zone;

#[cfg(test)]
mod tests;

pub use aggregate::{aggregate, achievement_pct, KraScore, ScoreAggregate};
pub use domain::{
    Band, Kra, KraId, MeasurementType, ReviewPeriod, RoleId, RoleThresholdProfile,
    ThresholdBands, Zone,
};
pub use import::{KraImportError, KraSheetImporter};
pub use incentive::{
    resolve_incentive, BonusPredicate, BonusRule, FiredBonus, IncentiveBreakdown, IncentivePlan,
    IncentiveTier, KraMatcher, NextTier, TierTable, BELOW_MINIMUM_TIER,
};
pub use repository::{KraRepository, KraSetView, RepositoryError};
pub use router::performance_router;
pub use service::{PerformanceService, PerformanceServiceError, ThresholdSource, ThresholdView};
pub use simulation::{
    format_amount, AchievementOverrides, KraAchievement, SimulationEngine, SimulationResult,
};
pub use thresholds::{validate_bands, ThresholdResolver};
pub use validation::{validate_kra_set, ConfigurationError, ValidatedKraSet};
pub use zone::classify;
