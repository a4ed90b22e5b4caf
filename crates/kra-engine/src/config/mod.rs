use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use serde::Deserialize;

use crate::scoring::{
    validate_bands, ConfigurationError, IncentivePlan, RoleThresholdProfile, SimulationEngine,
    ThresholdBands, ThresholdResolver,
};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub engine: EngineConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = ThresholdBands::default();
        let amber_min = percent_var("KRA_AMBER_MIN", defaults.amber.min)?;
        let green_min = percent_var("KRA_GREEN_MIN", defaults.green.min)?;
        let default_bands = ThresholdBands::from_boundaries(amber_min, green_min);
        validate_bands(&default_bands).map_err(ConfigError::Engine)?;

        let plan_path = env::var("KRA_PLAN_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            engine: EngineConfig {
                default_bands,
                plan_path,
            },
        })
    }
}

fn percent_var(variable: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(variable) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or(ConfigError::InvalidThreshold { variable }),
        Err(_) => Ok(default),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Scoring defaults and the optional incentive plan file.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub default_bands: ThresholdBands,
    pub plan_path: Option<PathBuf>,
}

/// JSON layout of `KRA_PLAN_PATH`.
#[derive(Debug, Deserialize)]
struct PlanFile {
    incentive: IncentivePlan,
    #[serde(default)]
    role_thresholds: Vec<RoleThresholdProfile>,
}

impl EngineConfig {
    /// Builds the engine from the configured defaults, falling back to the reference plan.
    pub fn build_engine(&self) -> Result<SimulationEngine, ConfigError> {
        let resolver = ThresholdResolver::new(self.default_bands).map_err(ConfigError::Engine)?;

        let Some(path) = &self.plan_path else {
            return Ok(SimulationEngine::new(resolver, IncentivePlan::reference()));
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::PlanFile {
            path: path.clone(),
            source,
        })?;
        let plan: PlanFile = serde_json::from_str(&raw).map_err(|source| ConfigError::PlanParse {
            path: path.clone(),
            source,
        })?;

        let resolver = resolver
            .with_profiles(plan.role_thresholds)
            .map_err(ConfigError::Engine)?;

        Ok(SimulationEngine::new(resolver, plan.incentive))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidThreshold { variable: &'static str },
    PlanFile { path: PathBuf, source: std::io::Error },
    PlanParse { path: PathBuf, source: serde_json::Error },
    Engine(ConfigurationError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidThreshold { variable } => {
                write!(f, "{variable} must be a numeric percentage")
            }
            ConfigError::PlanFile { path, .. } => {
                write!(f, "unable to read incentive plan {}", path.display())
            }
            ConfigError::PlanParse { path, source } => {
                write!(f, "invalid incentive plan {}: {}", path.display(), source)
            }
            ConfigError::Engine(err) => write!(f, "invalid scoring defaults: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidThreshold { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::PlanFile { source, .. } => Some(source),
            ConfigError::PlanParse { source, .. } => Some(source),
            ConfigError::Engine(err) => Some(err),
        }
    }
}
