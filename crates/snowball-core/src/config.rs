//! Snowball Configuration Management
//!
//! Handles configuration from TOML files, the flat `key=value` parameter
//! files used by earlier Snowball runs, and environment variables.
//! Bootstrap hyperparameters have no defaults: a missing one is an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnowballConfig {
    /// Bootstrap hyperparameters
    pub bootstrap: BootstrapConfig,

    /// Candidate extraction parameters
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SnowballConfig {
    /// Create a configuration with default extraction and logging settings
    pub fn new(bootstrap: BootstrapConfig) -> Self {
        Self {
            bootstrap,
            extraction: ExtractionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Load, apply environment overrides and validate
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let config = Self::from_file(path)?.with_env_override();
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file.
    ///
    /// `*.toml` files are parsed as TOML; anything else is read as a
    /// `key=value` parameter file.
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        let is_toml = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        if is_toml {
            Self::from_toml_str(&content, &path)
        } else {
            Self::from_properties_str(&content)
        }
    }

    /// Parse TOML content
    pub fn from_toml_str(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Parse a `key=value` parameter file.
    ///
    /// Blank lines and `#` comments are ignored. Lines that are not
    /// `key=value` or that name an unknown key are skipped with a warning.
    pub fn from_properties_str(content: &str) -> Result<Self, ConfigError> {
        let mut params = PartialParams::default();

        for (lineno, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                tracing::warn!(line = lineno + 1, content = line, "Skipping malformed config line");
                continue;
            };

            let key = key.trim();
            let value = value.trim();

            match key {
                "alpha" => params.alpha = Some(parse_f64(key, value)?),
                "beta" => params.beta = Some(parse_f64(key, value)?),
                "gamma" => params.gamma = Some(parse_f64(key, value)?),
                "threshold_similarity" => {
                    params.threshold_similarity = Some(parse_f64(key, value)?)
                }
                "instance_confidance" | "instance_confidence" => {
                    params.instance_confidence = Some(parse_f64(key, value)?)
                }
                "min_pattern_support" => {
                    params.min_pattern_support = Some(parse_usize(key, value)?)
                }
                "number_iterations" => params.number_iterations = Some(parse_usize(key, value)?),
                "wUpdt" | "w_updt" => params.w_updt = Some(parse_f64(key, value)?),
                "use_RlogF" | "use_rlogf" => params.use_rlogf = Some(parse_bool(key, value)?),
                "max_tokens_away" => params.extraction.max_tokens_away = parse_usize(key, value)?,
                "min_tokens_away" => params.extraction.min_tokens_away = parse_usize(key, value)?,
                "context_window_size" => {
                    params.extraction.context_window_size = parse_usize(key, value)?
                }
                "log_level" => params.logging.level = value.to_string(),
                "log_json" => params.logging.json_format = parse_bool(key, value)?,
                _ => {
                    tracing::warn!(line = lineno + 1, key, "Skipping unknown config key");
                }
            }
        }

        params.finish()
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Self {
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            if !level.trim().is_empty() {
                self.logging.level = level;
            }
        }
        self
    }

    /// Check every value is usable before any iteration starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bootstrap.validate()?;
        self.extraction.validate()
    }
}

/// Bootstrap hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Weight of the before-context similarity
    pub alpha: f64,

    /// Weight of the between-context similarity
    pub beta: f64,

    /// Weight of the after-context similarity
    pub gamma: f64,

    /// Minimum similarity for clustering and for pattern matches
    pub threshold_similarity: f64,

    /// Minimum confidence for an instance to become a seed
    #[serde(alias = "instance_confidance")]
    pub instance_confidence: f64,

    /// Minimum number of instances a pattern needs to survive pruning
    pub min_pattern_support: usize,

    /// Number of bootstrap iterations, iteration 0 included
    pub number_iterations: usize,

    /// Weight of new evidence against the previous iteration's confidence
    #[serde(alias = "wUpdt")]
    pub w_updt: f64,

    /// Use the RlogF statistic for pattern confidence
    #[serde(alias = "use_RlogF")]
    pub use_rlogf: bool,
}

impl BootstrapConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [("alpha", self.alpha), ("beta", self.beta), ("gamma", self.gamma)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::out_of_range(key, value, "a finite value >= 0"));
            }
        }

        for (key, value) in [
            ("threshold_similarity", self.threshold_similarity),
            ("instance_confidence", self.instance_confidence),
            ("w_updt", self.w_updt),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::out_of_range(key, value, "[0, 1]"));
            }
        }

        if self.min_pattern_support < 1 {
            return Err(ConfigError::out_of_range(
                "min_pattern_support",
                self.min_pattern_support,
                ">= 1",
            ));
        }

        Ok(())
    }
}

/// Candidate extraction parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Maximum number of tokens between the two entities
    pub max_tokens_away: usize,

    /// Minimum number of tokens between the two entities
    pub min_tokens_away: usize,

    /// Number of tokens kept before e1 and after e2
    pub context_window_size: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_tokens_away: 6,
            min_tokens_away: 1,
            context_window_size: 2,
        }
    }
}

impl ExtractionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_tokens_away > self.max_tokens_away {
            return Err(ConfigError::out_of_range(
                "min_tokens_away",
                self.min_tokens_away,
                "<= max_tokens_away",
            ));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Values collected from a parameter file before required-key checks
#[derive(Default)]
struct PartialParams {
    alpha: Option<f64>,
    beta: Option<f64>,
    gamma: Option<f64>,
    threshold_similarity: Option<f64>,
    instance_confidence: Option<f64>,
    min_pattern_support: Option<usize>,
    number_iterations: Option<usize>,
    w_updt: Option<f64>,
    use_rlogf: Option<bool>,
    extraction: ExtractionConfig,
    logging: LoggingConfig,
}

impl PartialParams {
    fn finish(self) -> Result<SnowballConfig, ConfigError> {
        let bootstrap = BootstrapConfig {
            alpha: required("alpha", self.alpha)?,
            beta: required("beta", self.beta)?,
            gamma: required("gamma", self.gamma)?,
            threshold_similarity: required("threshold_similarity", self.threshold_similarity)?,
            instance_confidence: required("instance_confidance", self.instance_confidence)?,
            min_pattern_support: required("min_pattern_support", self.min_pattern_support)?,
            number_iterations: required("number_iterations", self.number_iterations)?,
            w_updt: required("wUpdt", self.w_updt)?,
            use_rlogf: required("use_RlogF", self.use_rlogf)?,
        };

        Ok(SnowballConfig {
            bootstrap,
            extraction: self.extraction,
            logging: self.logging,
        })
    }
}

fn required<T>(key: &str, value: Option<T>) -> Result<T, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingRequired(key.to_string()))
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value
        .parse::<f64>()
        .map_err(|_| ConfigError::invalid(key, value))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value
        .parse::<usize>()
        .map_err(|_| ConfigError::invalid(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::invalid(key, value)),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Value {value} for {key} is out of range (expected {expected})")]
    OutOfRange {
        key: String,
        value: String,
        expected: &'static str,
    },
}

impl ConfigError {
    fn invalid(key: &str, value: &str) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    fn out_of_range(key: &str, value: impl std::fmt::Display, expected: &'static str) -> Self {
        Self::OutOfRange {
            key: key.to_string(),
            value: value.to_string(),
            expected,
        }
    }
}
