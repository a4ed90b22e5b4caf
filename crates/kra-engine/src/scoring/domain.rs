use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for a Key Result Area.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KraId(pub String);

impl KraId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier for the sales role a KRA set or threshold profile belongs to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(pub String);

impl RoleId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a KRA target is expressed. Informational only; scoring always works on ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementType {
    #[default]
    Numeric,
    Percentage,
}

impl MeasurementType {
    pub const fn label(self) -> &'static str {
        match self {
            MeasurementType::Numeric => "numeric",
            MeasurementType::Percentage => "percentage",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "numeric" | "number" | "count" => Some(Self::Numeric),
            "percentage" | "percent" | "%" => Some(Self::Percentage),
            _ => None,
        }
    }
}

/// Review cadence used to group KRAs on dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewPeriod {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Quarterly,
}

impl ReviewPeriod {
    pub const fn label(self) -> &'static str {
        match self {
            ReviewPeriod::Daily => "daily",
            ReviewPeriod::Weekly => "weekly",
            ReviewPeriod::Monthly => "monthly",
            ReviewPeriod::Quarterly => "quarterly",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            _ => None,
        }
    }
}

/// Inclusive-at-min percentage band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Red/amber/green boundaries applied to a KRA or aggregate percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBands {
    pub red: Band,
    pub amber: Band,
    pub green: Band,
}

impl ThresholdBands {
    /// Builds contiguous bands over `[0, 100]` from the two inner boundaries.
    pub const fn from_boundaries(amber_min: f64, green_min: f64) -> Self {
        Self {
            red: Band::new(0.0, amber_min),
            amber: Band::new(amber_min, green_min),
            green: Band::new(green_min, 100.0),
        }
    }
}

impl Default for ThresholdBands {
    fn default() -> Self {
        Self::from_boundaries(70.0, 90.0)
    }
}

/// Performance classification of a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Red,
    Amber,
    Green,
}

impl Zone {
    pub const ALL: [Zone; 3] = [Zone::Red, Zone::Amber, Zone::Green];

    pub const fn label(self) -> &'static str {
        match self {
            Zone::Red => "red",
            Zone::Amber => "amber",
            Zone::Green => "green",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A weighted, measurable performance dimension.
///
/// `title` is matched by title-based bonus rules, so renaming a KRA can change
/// which bonuses fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kra {
    pub id: KraId,
    pub title: String,
    #[serde(default)]
    pub measurement_type: MeasurementType,
    pub target: f64,
    #[serde(default)]
    pub achieved: f64,
    pub weightage: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<ThresholdBands>,
    #[serde(default)]
    pub period: ReviewPeriod,
}

impl Kra {
    pub fn new(id: impl Into<String>, title: impl Into<String>, target: f64, weightage: u32) -> Self {
        Self {
            id: KraId::new(id),
            title: title.into(),
            measurement_type: MeasurementType::Numeric,
            target,
            achieved: 0.0,
            weightage,
            thresholds: None,
            period: ReviewPeriod::Monthly,
        }
    }

    pub fn with_achieved(mut self, achieved: f64) -> Self {
        self.achieved = achieved;
        self
    }

    pub fn with_measurement(mut self, measurement_type: MeasurementType) -> Self {
        self.measurement_type = measurement_type;
        self
    }

    pub fn with_thresholds(mut self, thresholds: ThresholdBands) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn with_period(mut self, period: ReviewPeriod) -> Self {
        self.period = period;
        self
    }
}

/// Threshold bands configured for a specific role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleThresholdProfile {
    pub role: RoleId,
    pub red: Band,
    pub amber: Band,
    pub green: Band,
}

impl RoleThresholdProfile {
    pub fn new(role: RoleId, bands: ThresholdBands) -> Self {
        Self {
            role,
            red: bands.red,
            amber: bands.amber,
            green: bands.green,
        }
    }

    pub fn bands(&self) -> ThresholdBands {
        ThresholdBands {
            red: self.red,
            amber: self.amber,
            green: self.green,
        }
    }
}
