use std::sync::Arc;

use serde::Serialize;

use super::domain::{Kra, RoleId, ThresholdBands};
use super::repository::{KraRepository, RepositoryError};
use super::simulation::{AchievementOverrides, SimulationEngine, SimulationResult};
use super::validation::{validate_kra_set, ConfigurationError, ValidatedKraSet};

/// Service composing the KRA repository with the simulation engine.
pub struct PerformanceService<R> {
    repository: Arc<R>,
    engine: Arc<SimulationEngine>,
}

impl<R> PerformanceService<R>
where
    R: KraRepository + 'static,
{
    pub fn new(repository: Arc<R>, engine: SimulationEngine) -> Self {
        Self {
            repository,
            engine: Arc::new(engine),
        }
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    /// Validate a role's KRA list and make it the active set.
    pub fn configure_role(
        &self,
        role: RoleId,
        kras: Vec<Kra>,
    ) -> Result<ValidatedKraSet, PerformanceServiceError> {
        let set = match validate_kra_set(role.clone(), kras) {
            Ok(set) => set,
            Err(error) => {
                tracing::warn!(%role, %error, "rejected KRA configuration");
                return Err(error.into());
            }
        };

        let stored = self.repository.store(set)?;
        tracing::info!(
            role = %stored.role(),
            kras = stored.len(),
            "KRA set configured"
        );
        Ok(stored)
    }

    pub fn kra_set(&self, role: &RoleId) -> Result<ValidatedKraSet, PerformanceServiceError> {
        let set = self
            .repository
            .fetch(role)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(set)
    }

    /// Roles with an active KRA set, in id order.
    pub fn configured_roles(&self) -> Result<Vec<RoleId>, PerformanceServiceError> {
        let mut roles = self.repository.roles()?;
        roles.sort();
        Ok(roles)
    }

    pub fn thresholds_for(&self, role: &RoleId) -> ThresholdView {
        let resolver = self.engine.resolver();
        let (bands, source) = match resolver.profile(role) {
            Some(profile) => (profile.bands(), ThresholdSource::Role),
            None => (resolver.default_bands(), ThresholdSource::Default),
        };

        ThresholdView {
            role: role.clone(),
            source,
            bands,
        }
    }

    /// Simulate against the stored set for a role; an empty override map reports actuals.
    pub fn simulate_role(
        &self,
        role: &RoleId,
        overrides: &AchievementOverrides,
    ) -> Result<SimulationResult, PerformanceServiceError> {
        let set = self.kra_set(role)?;
        Ok(self.engine.simulate_set(&set, overrides)?)
    }

    /// Simulate an unsaved KRA list, optionally under a role's threshold profile.
    pub fn simulate_adhoc(
        &self,
        role: Option<&RoleId>,
        kras: &[Kra],
        overrides: &AchievementOverrides,
    ) -> Result<SimulationResult, PerformanceServiceError> {
        let result = match role {
            Some(role) => self.engine.simulate_for_role(role, kras, overrides)?,
            None => self.engine.simulate(kras, overrides)?,
        };
        Ok(result)
    }
}

/// Where resolved role thresholds came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSource {
    Role,
    Default,
}

/// Bands in effect for a role's aggregate score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdView {
    pub role: RoleId,
    pub source: ThresholdSource,
    pub bands: ThresholdBands,
}

/// Error raised by the performance service.
#[derive(Debug, thiserror::Error)]
pub enum PerformanceServiceError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
