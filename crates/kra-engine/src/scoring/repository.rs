use serde::Serialize;

use super::domain::{Kra, RoleId};
use super::validation::ValidatedKraSet;

/// Storage abstraction for validated role KRA sets; the backing store lives outside the engine.
pub trait KraRepository: Send + Sync {
    /// Inserts or replaces the active set for the set's role.
    fn store(&self, set: ValidatedKraSet) -> Result<ValidatedKraSet, RepositoryError>;
    fn fetch(&self, role: &RoleId) -> Result<Option<ValidatedKraSet>, RepositoryError>;
    fn roles(&self) -> Result<Vec<RoleId>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("no KRA set configured for role")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Exposed shape of a stored KRA set.
#[derive(Debug, Clone, Serialize)]
pub struct KraSetView {
    pub role: RoleId,
    pub total_weightage: u32,
    pub kras: Vec<Kra>,
}

impl From<&ValidatedKraSet> for KraSetView {
    fn from(set: &ValidatedKraSet) -> Self {
        Self {
            role: set.role().clone(),
            total_weightage: set.total_weightage(),
            kras: set.kras().to_vec(),
        }
    }
}
