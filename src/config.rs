/// Service configuration
///
/// Loaded from a TOML file with `[logging]`, `[monitor]`, `[storage]` and
/// `[limits.<parameter>]` tables. Every field has a default, so an empty
/// file (or no file at all) yields a working simulator setup.
///
/// ```toml
/// [monitor]
/// plant = "Plant A"
/// readings_url = "http://gateway.local/api/data"
///
/// [limits."COD"]
/// min = 0.0
/// max = 200.0
/// ```

use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::logging::LogLevel;
use crate::model::MonitorError;
use crate::parameters::LimitTable;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "ETPMON_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            file: None,
            timestamps: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    pub plant: String,
    pub refresh_interval_secs: u64,
    pub cycles: usize,
    /// Gateway endpoint; the simulator is used when unset.
    pub readings_url: Option<String>,
    pub token: Option<String>,
    pub excursion_probability: f64,
    pub seed: Option<u64>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            plant: "Plant A".to_string(),
            refresh_interval_secs: 5,
            cycles: 1,
            readings_url: None,
            token: None,
            excursion_probability: 0.1,
            seed: None,
        }
    }
}

impl PollConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
        }
    }
}

impl StorageConfig {
    pub fn clients_path(&self) -> PathBuf {
        self.data_dir.join("clients.json")
    }

    pub fn tickets_path(&self) -> PathBuf {
        self.data_dir.join("tickets.json")
    }

    pub fn alerts_path(&self) -> PathBuf {
        self.data_dir.join("alerts.json")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LimitOverride {
    pub min: f64,
    pub max: f64,
}

// ---------------------------------------------------------------------------
// Top level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub logging: LoggingConfig,
    pub monitor: PollConfig,
    pub storage: StorageConfig,
    pub limits: BTreeMap<String, LimitOverride>,
}

impl MonitorConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, Path::new("<string>"))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Loads `.env`, then the file named by `ETPMON_CONFIG`. Defaults apply
    /// when the variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        match env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    /// Standard limits with the `[limits]` overrides applied.
    pub fn limit_table(&self) -> Result<LimitTable, MonitorError> {
        LimitTable::standard().with_overrides(
            self.limits
                .iter()
                .map(|(name, limit)| (name.as_str(), limit.min, limit.max)),
        )
    }

    /// Checks values TOML accepts but the service cannot use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = self.monitor.excursion_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::Invalid {
                field: "monitor.excursion_probability",
                message: format!("{} is not between 0.0 and 1.0", p),
            });
        }
        Ok(())
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = MonitorConfig::from_toml_str("").expect("empty TOML");
        assert_eq!(config, MonitorConfig::default());
        assert_eq!(config.monitor.refresh_interval(), Duration::from_secs(5));
        assert_eq!(config.storage.alerts_path(), PathBuf::from("data/alerts.json"));
    }

    #[test]
    fn test_sections_are_read() {
        let config = MonitorConfig::from_toml_str(
            r#"
            [logging]
            level = "warn"
            timestamps = true

            [monitor]
            plant = "Unit 4"
            cycles = 3
            readings_url = "http://10.0.0.5/api/data"
            seed = 11

            [storage]
            data_dir = "/var/lib/etpmon"

            [limits."COD"]
            min = 0.0
            max = 200.0
            "#,
        )
        .expect("valid TOML");

        assert_eq!(config.logging.level, LogLevel::Warning);
        assert!(config.logging.timestamps);
        assert_eq!(config.monitor.plant, "Unit 4");
        assert_eq!(config.monitor.cycles, 3);
        assert_eq!(config.monitor.refresh_interval_secs, 5, "unset field keeps its default");
        assert_eq!(config.monitor.seed, Some(11));
        assert_eq!(
            config.storage.clients_path(),
            PathBuf::from("/var/lib/etpmon/clients.json")
        );

        let limits = config.limit_table().expect("known parameter");
        assert_eq!(limits.get("COD").map(|l| l.max), Some(200.0));
        assert_eq!(limits.get("pH").map(|l| l.min), Some(6.0));
    }

    #[test]
    fn test_override_names_are_canonicalised_and_validated() {
        let config = MonitorConfig::from_toml_str(
            r#"
            [limits.ph]
            min = 6.5
            max = 8.5
            "#,
        )
        .expect("valid TOML");
        let limits = config.limit_table().expect("valid bands");
        assert_eq!(limits.get("pH").map(|l| l.min), Some(6.5));

        let unknown = MonitorConfig::from_toml_str("[limits.Ammonia]\nmin = 0.0\nmax = 5.0")
            .expect("valid TOML");
        assert_eq!(
            unknown.limit_table(),
            Err(MonitorError::UnknownParameter("Ammonia".to_string())),
            "no reading source can report a parameter outside the registry"
        );

        let inverted = MonitorConfig::from_toml_str("[limits.TSS]\nmin = 50.0\nmax = 10.0")
            .expect("valid TOML");
        assert!(matches!(
            inverted.limit_table(),
            Err(MonitorError::InvalidLimit { .. })
        ));
    }

    #[test]
    fn test_bad_toml_reports_parse_error() {
        let err = MonitorConfig::from_toml_str("[monitor\ncycles = 2").expect_err("broken table");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_excursion_probability_must_be_a_probability() {
        for value in ["nan", "inf", "1.5", "-0.1"] {
            let toml = format!("[monitor]\nexcursion_probability = {}", value);
            let err = MonitorConfig::from_toml_str(&toml).expect_err(value);
            assert!(
                matches!(err, ConfigError::Invalid { field: "monitor.excursion_probability", .. }),
                "{} gave {:?}",
                value,
                err
            );
        }
        assert!(MonitorConfig::from_toml_str("[monitor]\nexcursion_probability = 1.0").is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[monitor]\nexcursion_probability = 0.5").expect("write");
        let config = MonitorConfig::load(file.path()).expect("load");
        assert_eq!(config.monitor.excursion_probability, 0.5);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = MonitorConfig::load(dir.path().join("absent.toml")).expect_err("missing");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
