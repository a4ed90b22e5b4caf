use std::collections::BTreeMap;

use super::domain::{Band, Kra, RoleId, RoleThresholdProfile, ThresholdBands};
use super::validation::ConfigurationError;

const BOUNDARY_TOLERANCE: f64 = 1e-9;

/// Resolves the bands to classify with, from the most specific source available.
///
/// Order: KRA-level override, then the role profile, then the global default
/// supplied at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdResolver {
    default: ThresholdBands,
    profiles: BTreeMap<RoleId, ThresholdBands>,
}

impl ThresholdResolver {
    pub fn new(default: ThresholdBands) -> Result<Self, ConfigurationError> {
        validate_bands(&default)?;
        Ok(Self {
            default,
            profiles: BTreeMap::new(),
        })
    }

    pub fn with_profile(mut self, profile: RoleThresholdProfile) -> Result<Self, ConfigurationError> {
        self.insert_profile(profile)?;
        Ok(self)
    }

    pub fn with_profiles<I>(mut self, profiles: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = RoleThresholdProfile>,
    {
        for profile in profiles {
            self.insert_profile(profile)?;
        }
        Ok(self)
    }

    /// Registers or replaces the profile for a role after validating its bands.
    pub fn insert_profile(&mut self, profile: RoleThresholdProfile) -> Result<(), ConfigurationError> {
        let bands = profile.bands();
        validate_bands(&bands)?;
        self.profiles.insert(profile.role, bands);
        Ok(())
    }

    pub fn default_bands(&self) -> ThresholdBands {
        self.default
    }

    pub fn profile(&self, role: &RoleId) -> Option<RoleThresholdProfile> {
        self.profiles
            .get(role)
            .map(|bands| RoleThresholdProfile::new(role.clone(), *bands))
    }

    pub fn profiles(&self) -> Vec<RoleThresholdProfile> {
        self.profiles
            .iter()
            .map(|(role, bands)| RoleThresholdProfile::new(role.clone(), *bands))
            .collect()
    }

    pub fn resolve(&self, role: Option<&RoleId>, kra: Option<&Kra>) -> ThresholdBands {
        if let Some(bands) = kra.and_then(|kra| kra.thresholds) {
            return bands;
        }

        role.and_then(|role| self.profiles.get(role))
            .copied()
            .unwrap_or(self.default)
    }
}

impl Default for ThresholdResolver {
    fn default() -> Self {
        Self {
            default: ThresholdBands::default(),
            profiles: BTreeMap::new(),
        }
    }
}

/// Checks that bands are contiguous, non-overlapping and cover `[0, 100]`.
pub fn validate_bands(bands: &ThresholdBands) -> Result<(), ConfigurationError> {
    let named = [("red", bands.red), ("amber", bands.amber), ("green", bands.green)];

    for (name, band) in named {
        check_band(name, band)?;
    }

    if !same_boundary(bands.red.min, 0.0) {
        return Err(malformed(format!(
            "red band must start at 0%, found {}%",
            bands.red.min
        )));
    }
    if !same_boundary(bands.red.max, bands.amber.min) {
        return Err(malformed(format!(
            "red band ends at {}% but amber starts at {}%",
            bands.red.max, bands.amber.min
        )));
    }
    if !same_boundary(bands.amber.max, bands.green.min) {
        return Err(malformed(format!(
            "amber band ends at {}% but green starts at {}%",
            bands.amber.max, bands.green.min
        )));
    }
    if !same_boundary(bands.green.max, 100.0) {
        return Err(malformed(format!(
            "green band must end at 100%, found {}%",
            bands.green.max
        )));
    }

    Ok(())
}

fn check_band(name: &str, band: Band) -> Result<(), ConfigurationError> {
    if !band.min.is_finite() || !band.max.is_finite() {
        return Err(malformed(format!("{name} band has a non-finite boundary")));
    }
    if band.min >= band.max {
        return Err(malformed(format!(
            "{name} band min {}% must be below max {}%",
            band.min, band.max
        )));
    }
    Ok(())
}

fn same_boundary(left: f64, right: f64) -> bool {
    (left - right).abs() < BOUNDARY_TOLERANCE
}

/// Whether a computed percentage reaches `boundary`.
///
/// Ratios such as `23.24 / 33.2 * 100` land a few ulps under the exact
/// value, so the comparison absorbs float error below the tolerance.
pub(crate) fn reaches(percent: f64, boundary: f64) -> bool {
    percent >= boundary - BOUNDARY_TOLERANCE
}

fn malformed(reason: String) -> ConfigurationError {
    ConfigurationError::MalformedBands { reason }
}
