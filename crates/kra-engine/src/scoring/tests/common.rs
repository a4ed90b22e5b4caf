use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::scoring::{
    AchievementOverrides, IncentivePlan, Kra, KraId, KraRepository, MeasurementType,
    PerformanceService, RepositoryError, RoleId, RoleThresholdProfile, SimulationEngine,
    ThresholdBands, ThresholdResolver, ValidatedKraSet,
};

pub(super) fn field_officer() -> RoleId {
    RoleId::new("field_officer")
}

pub(super) fn branch_manager() -> RoleId {
    RoleId::new("branch_manager")
}

/// Month-end sheet for a field officer: SHG, FD, visits and attendance.
pub(super) fn field_officer_kras() -> Vec<Kra> {
    vec![
        Kra::new("shg", "SHG Creation", 25.0, 40).with_achieved(23.0),
        Kra::new("fd", "FD Acquisition", 15.0, 30).with_achieved(16.0),
        Kra::new("visits", "Customer Visits", 95.0, 20)
            .with_achieved(92.0)
            .with_measurement(MeasurementType::Percentage),
        Kra::new("attendance", "Attendance", 98.0, 10)
            .with_achieved(99.0)
            .with_measurement(MeasurementType::Percentage),
    ]
}

pub(super) fn overrides(values: &[(&str, f64)]) -> AchievementOverrides {
    values
        .iter()
        .map(|(id, value)| (KraId::new(*id), *value))
        .collect()
}

/// Stricter bands for managers: amber from 75%, green from 95%.
pub(super) fn manager_bands() -> ThresholdBands {
    ThresholdBands::from_boundaries(75.0, 95.0)
}

pub(super) fn engine() -> SimulationEngine {
    let resolver = ThresholdResolver::default()
        .with_profile(RoleThresholdProfile::new(branch_manager(), manager_bands()))
        .expect("manager profile is valid");
    SimulationEngine::new(resolver, IncentivePlan::reference())
}

pub(super) fn build_service() -> (PerformanceService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = PerformanceService::new(repository.clone(), engine());
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) sets: Arc<Mutex<HashMap<RoleId, ValidatedKraSet>>>,
}

impl KraRepository for MemoryRepository {
    fn store(&self, set: ValidatedKraSet) -> Result<ValidatedKraSet, RepositoryError> {
        let mut guard = self.sets.lock().expect("repository mutex poisoned");
        guard.insert(set.role().clone(), set.clone());
        Ok(set)
    }

    fn fetch(&self, role: &RoleId) -> Result<Option<ValidatedKraSet>, RepositoryError> {
        let guard = self.sets.lock().expect("repository mutex poisoned");
        Ok(guard.get(role).cloned())
    }

    fn roles(&self) -> Result<Vec<RoleId>, RepositoryError> {
        let guard = self.sets.lock().expect("repository mutex poisoned");
        let mut roles: Vec<RoleId> = guard.keys().cloned().collect();
        roles.sort();
        Ok(roles)
    }
}

pub(super) struct UnavailableRepository;

impl KraRepository for UnavailableRepository {
    fn store(&self, _set: ValidatedKraSet) -> Result<ValidatedKraSet, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _role: &RoleId) -> Result<Option<ValidatedKraSet>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn roles(&self) -> Result<Vec<RoleId>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn performance_router_with_service(
    service: PerformanceService<MemoryRepository>,
) -> axum::Router {
    crate::scoring::performance_router(Arc::new(service))
}
