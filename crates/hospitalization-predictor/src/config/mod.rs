use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::workflows::prediction::VocabularyEmission;

pub const DEFAULT_PREDICTION_ENDPOINT: &str =
    "https://canalytics.comunicare.io/api/predictionHospitalizationCovidFhir";

/// Distinguishes runtime behavior for different stages of the client.
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

/// Top-level configuration for the prediction client.
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    pub environment: AppEnvironment,
    pub prediction: PredictionEndpointConfig,
    pub encoding: EncodingConfig,
    pub timings: WorkflowTimings,
    pub preferences: PreferencesConfig,
    pub telemetry: TelemetryConfig,
}

impl PredictorConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("PREDICTOR_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let endpoint = env::var("PREDICTOR_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_PREDICTION_ENDPOINT.to_string());
        if endpoint.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        let timeout_ms = positive_millis("PREDICTOR_TIMEOUT_MS", 15_000)?;

        let emission_raw =
            env::var("PREDICTOR_EMISSION").unwrap_or_else(|_| "zero-filled".to_string());
        let emission = VocabularyEmission::parse(&emission_raw)
            .ok_or(ConfigError::InvalidEmission(emission_raw))?;
        let subject_reference =
            env::var("PREDICTOR_SUBJECT_REFERENCE").unwrap_or_else(|_| "patient-id".to_string());

        let timings = WorkflowTimings {
            error_banner_ms: millis("PREDICTOR_ERROR_BANNER_MS", 10_000)?,
            report_banner_ms: millis("PREDICTOR_REPORT_BANNER_MS", 3_000)?,
            report_latency_ms: millis("PREDICTOR_REPORT_LATENCY_MS", 1_000)?,
        };

        let preferences_path = env::var("PREDICTOR_PREFERENCES_PATH")
            .unwrap_or_else(|_| "predictor-preferences.json".to_string());

        let log_level = env::var("PREDICTOR_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            prediction: PredictionEndpointConfig {
                endpoint: endpoint.trim().to_string(),
                timeout_ms,
            },
            encoding: EncodingConfig {
                emission,
                subject_reference,
            },
            timings,
            preferences: PreferencesConfig {
                path: PathBuf::from(preferences_path),
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn millis(variable: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(variable) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidMillis { variable, value }),
        Err(_) => Ok(default),
    }
}

fn positive_millis(variable: &'static str, default: u64) -> Result<u64, ConfigError> {
    let value = millis(variable, default)?;
    if value == 0 {
        return Err(ConfigError::ZeroMillis { variable });
    }
    Ok(value)
}

/// Remote prediction service location and request timeout.
#[derive(Debug, Clone)]
pub struct PredictionEndpointConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
}

impl PredictionEndpointConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for PredictionEndpointConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_PREDICTION_ENDPOINT.to_string(),
            timeout_ms: 15_000,
        }
    }
}

/// Payload encoding policy.
#[derive(Debug, Clone)]
pub struct EncodingConfig {
    pub emission: VocabularyEmission,
    pub subject_reference: String,
}

/// Durations driving the transient banners and the simulated report round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowTimings {
    pub error_banner_ms: u64,
    pub report_banner_ms: u64,
    pub report_latency_ms: u64,
}

impl WorkflowTimings {
    pub fn error_banner(&self) -> Duration {
        Duration::from_millis(self.error_banner_ms)
    }

    pub fn report_banner(&self) -> Duration {
        Duration::from_millis(self.report_banner_ms)
    }

    pub fn report_latency(&self) -> Duration {
        Duration::from_millis(self.report_latency_ms)
    }
}

impl Default for WorkflowTimings {
    fn default() -> Self {
        Self {
            error_banner_ms: 10_000,
            report_banner_ms: 3_000,
            report_latency_ms: 1_000,
        }
    }
}

/// Location of the persisted language/theme preferences.
#[derive(Debug, Clone)]
pub struct PreferencesConfig {
    pub path: PathBuf,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyEndpoint,
    InvalidMillis {
        variable: &'static str,
        value: String,
    },
    ZeroMillis {
        variable: &'static str,
    },
    InvalidEmission(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyEndpoint => write!(f, "PREDICTOR_ENDPOINT must not be empty"),
            ConfigError::InvalidMillis { variable, value } => write!(
                f,
                "{} must be a non-negative number of milliseconds (got '{}')",
                variable, value
            ),
            ConfigError::ZeroMillis { variable } => {
                write!(f, "{} must be a positive number of milliseconds", variable)
            }
            ConfigError::InvalidEmission(value) => write!(
                f,
                "PREDICTOR_EMISSION must be 'zero-filled' or 'sparse' (got '{}')",
                value
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
