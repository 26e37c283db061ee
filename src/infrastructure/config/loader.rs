use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_concurrency: {0}. Must be at least 1")]
    InvalidMaxConcurrency(usize),

    #[error("Invalid max_variants: {0}. Must be at least 1")]
    InvalidMaxVariants(usize),

    #[error("Invalid max_iterations: {0}. Must be at least 1")]
    InvalidMaxIterations(usize),

    #[error("Invalid min_message_score: {0}. Must be between 0 and 1")]
    InvalidMinMessageScore(f64),

    #[error("Invalid rate limit: {0}. Must be positive")]
    InvalidRateLimit(f64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid max_retries: {0}. Cannot be 0")]
    InvalidMaxRetries(u32),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must be less than max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),
}

/// Project config file, looked up in the working directory
pub const CONFIG_FILE: &str = "grouper.yaml";

/// Optional local overrides, usually kept out of version control
pub const LOCAL_CONFIG_FILE: &str = "grouper.local.yaml";

/// Prefix of environment overrides, `__` separates nested keys
pub const ENV_PREFIX: &str = "GROUPER_";

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. grouper.yaml
    /// 3. grouper.local.yaml
    /// 4. Environment variables (GROUPER_* prefix)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment()
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(CONFIG_FILE))
            .merge(Yaml::file(LOCAL_CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let focus = &config.focus;
        if focus.max_concurrency == 0 {
            return Err(ConfigError::InvalidMaxConcurrency(focus.max_concurrency));
        }
        if focus.max_variants == 0 {
            return Err(ConfigError::InvalidMaxVariants(focus.max_variants));
        }
        if focus.max_iterations == 0 {
            return Err(ConfigError::InvalidMaxIterations(focus.max_iterations));
        }
        if !(0.0..=1.0).contains(&focus.min_message_score) {
            return Err(ConfigError::InvalidMinMessageScore(focus.min_message_score));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        if config.llm.requests_per_second <= 0.0 || config.llm.requests_per_second.is_nan() {
            return Err(ConfigError::InvalidRateLimit(config.llm.requests_per_second));
        }

        if config.retry.max_retries == 0 {
            return Err(ConfigError::InvalidMaxRetries(config.retry.max_retries));
        }

        if config.retry.initial_backoff_ms >= config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::{
        DataConfig, FocusConfig, LlmConfig, LoggingConfig, RetryConfig,
    };

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.focus.max_iterations, 5);
        assert!((config.focus.min_message_score - 0.8).abs() < f64::EPSILON);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
focus:
  max_concurrency: 4
  max_iterations: 3
  min_message_score: 0.75
llm:
  requests_per_second: 2.5
  creative_model: claude-opus-4-1
logging:
  level: debug
  format: json
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.focus.max_concurrency, 4);
        assert_eq!(config.focus.max_iterations, 3);
        assert_eq!(config.focus.max_variants, 10);
        assert!((config.llm.requests_per_second - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.llm.creative_model, "claude-opus-4-1");
        assert_eq!(config.logging.format, "json");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config {
            focus: FocusConfig {
                max_concurrency: 2,
                max_variants: 3,
                max_iterations: 1,
                min_message_score: 1.0,
                findings_word_count: 50,
                creatives: vec![],
            },
            logging: LoggingConfig {
                level: "warn".to_string(),
                format: "json".to_string(),
                log_dir: Some("logs".to_string()),
                rotation: "never".to_string(),
            },
            llm: LlmConfig::default(),
            retry: RetryConfig {
                max_retries: 1,
                initial_backoff_ms: 10,
                max_backoff_ms: 20,
            },
            data: DataConfig::default(),
        };
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_zero_focus_limits() {
        let mut config = Config::default();
        config.focus.max_concurrency = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxConcurrency(0))
        ));

        let mut config = Config::default();
        config.focus.max_variants = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxVariants(0))
        ));

        let mut config = Config::default();
        config.focus.max_iterations = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxIterations(0))
        ));
    }

    #[test]
    fn test_validate_min_message_score_range() {
        for score in [-0.1, 1.01, f64::NAN] {
            let mut config = Config::default();
            config.focus.min_message_score = score;
            assert!(matches!(
                ConfigLoader::validate(&config),
                Err(ConfigError::InvalidMinMessageScore(_))
            ));
        }
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogFormat(format) => assert_eq!(format, "xml"),
            other => panic!("Expected InvalidLogFormat error, got {other}"),
        }
    }

    #[test]
    fn test_validate_invalid_rotation() {
        let mut config = Config::default();
        config.logging.rotation = "weekly".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidRotation(_))
        ));
    }

    #[test]
    fn test_validate_non_positive_rate_limit() {
        for rps in [0.0, -5.0] {
            let mut config = Config::default();
            config.llm.requests_per_second = rps;
            assert!(matches!(
                ConfigLoader::validate(&config),
                Err(ConfigError::InvalidRateLimit(_))
            ));
        }
    }

    #[test]
    fn test_validate_zero_max_retries() {
        let mut config = Config::default();
        config.retry.max_retries = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxRetries(0))
        ));
    }

    #[test]
    fn test_validate_invalid_backoff() {
        let mut config = Config::default();
        config.retry.initial_backoff_ms = 30000;
        config.retry.max_backoff_ms = 10000;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBackoff(30000, 10000))
        ));
    }

    #[test]
    fn test_env_override() {
        temp_env::with_vars(
            [
                ("GROUPER_FOCUS__MAX_ITERATIONS", Some("9")),
                ("GROUPER_LLM__REQUESTS_PER_SECOND", Some("1.5")),
                ("GROUPER_LOGGING__LEVEL", Some("debug")),
            ],
            || {
                let config: Config = Figment::new()
                    .merge(Serialized::defaults(Config::default()))
                    .merge(Env::prefixed(ENV_PREFIX).split("__"))
                    .extract()
                    .expect("env overrides should extract");

                assert_eq!(config.focus.max_iterations, 9);
                assert!((config.llm.requests_per_second - 1.5).abs() < f64::EPSILON);
                assert_eq!(config.logging.level, "debug");
                assert_eq!(config.focus.max_concurrency, 8);
            },
        );
    }

    #[test]
    fn test_hierarchical_merging() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "focus:\n  max_iterations: 2\nlogging:\n  level: info\n  format: json"
        )
        .unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "focus:\n  max_iterations: 7\nlogging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.focus.max_iterations, 7, "Override should win");
        assert_eq!(
            config.logging.level, "debug",
            "Override should win for nested fields"
        );
        assert_eq!(
            config.logging.format, "json",
            "Base value should persist when not overridden"
        );
        assert_eq!(config.focus.max_variants, 10, "Defaults fill the gaps");
    }

    #[test]
    fn test_load_from_file_rejects_invalid_values() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "focus:\n  max_concurrency: 0").unwrap();
        file.flush().unwrap();

        let err = ConfigLoader::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("max_concurrency"));
    }
}
