use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::advisor::{ScoringMode, SelectionMode};

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
    pub advisor: AdvisorConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            advisor: AdvisorConfig::from_env()?,
        })
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

/// Scoring strategy, artifact location and institution/major selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorConfig {
    pub model_dir: PathBuf,
    pub scoring: ScoringMode,
    pub selection: SelectionMode,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("ai_models"),
            scoring: ScoringMode::Auto,
            selection: SelectionMode::Random,
        }
    }
}

impl AdvisorConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let model_dir = env::var("ADVISOR_MODEL_DIR").unwrap_or_else(|_| "ai_models".to_string());

        let scoring_value = env::var("ADVISOR_SCORING").unwrap_or_else(|_| "auto".to_string());
        let scoring = ScoringMode::parse(&scoring_value).ok_or(ConfigError::InvalidScoringMode {
            value: scoring_value,
        })?;

        let seed = env::var("ADVISOR_SELECTION_SEED")
            .unwrap_or_else(|_| "42".to_string())
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidSelectionSeed)?;
        let selection_value =
            env::var("ADVISOR_SELECTION").unwrap_or_else(|_| "random".to_string());
        let selection = SelectionMode::parse(&selection_value, seed).ok_or(
            ConfigError::InvalidSelectionMode {
                value: selection_value,
            },
        )?;

        Ok(Self {
            model_dir: PathBuf::from(model_dir),
            scoring,
            selection,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidScoringMode { value: String },
    InvalidSelectionMode { value: String },
    InvalidSelectionSeed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidScoringMode { value } => write!(
                f,
                "ADVISOR_SCORING must be 'auto' or 'heuristic', got '{value}'"
            ),
            ConfigError::InvalidSelectionMode { value } => write!(
                f,
                "ADVISOR_SELECTION must be 'random', 'first' or 'seeded', got '{value}'"
            ),
            ConfigError::InvalidSelectionSeed => {
                write!(f, "ADVISOR_SELECTION_SEED must be a valid u64")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
