use kra_engine::scoring::{KraId, KraRepository, RepositoryError, RoleId, ValidatedKraSet};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local store of each role's active KRA set.
#[derive(Default, Clone)]
pub(crate) struct InMemoryKraRepository {
    sets: Arc<Mutex<HashMap<RoleId, ValidatedKraSet>>>,
}

impl InMemoryKraRepository {
    fn guard(&self) -> Result<MutexGuard<'_, HashMap<RoleId, ValidatedKraSet>>, RepositoryError> {
        self.sets
            .lock()
            .map_err(|_| RepositoryError::Unavailable("KRA store lock poisoned".to_string()))
    }
}

impl KraRepository for InMemoryKraRepository {
    fn store(&self, set: ValidatedKraSet) -> Result<ValidatedKraSet, RepositoryError> {
        let mut guard = self.guard()?;
        guard.insert(set.role().clone(), set.clone());
        Ok(set)
    }

    fn fetch(&self, role: &RoleId) -> Result<Option<ValidatedKraSet>, RepositoryError> {
        let guard = self.guard()?;
        Ok(guard.get(role).cloned())
    }

    fn roles(&self) -> Result<Vec<RoleId>, RepositoryError> {
        let guard = self.guard()?;
        let mut roles: Vec<RoleId> = guard.keys().cloned().collect();
        roles.sort();
        Ok(roles)
    }
}

/// Parses `id=value` into a simulation override, accepting a trailing `%`.
pub(crate) fn parse_override(raw: &str) -> Result<(KraId, f64), String> {
    let (id, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KRA_ID=VALUE, got '{raw}'"))?;

    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing KRA id in '{raw}'"));
    }

    let value = value
        .trim()
        .trim_end_matches('%')
        .parse::<f64>()
        .map_err(|err| format!("failed to parse '{value}' as a number ({err})"))?;

    Ok((KraId::new(id), value))
}
