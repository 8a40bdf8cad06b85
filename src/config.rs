/*!
 * Configuration support for the CCN library
 *
 * Runtime options for batch processing and the command-line tool. The core
 * canonicalize/infer/decode functions take no configuration.
 */

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::DEFAULT_CCN_COLUMN;
use crate::{CcnError, OutputFormat, Result};

/// Environment variable prefix, e.g. `CCNS_SKIP_INVALID_RECORDS=true`
pub const ENV_PREFIX: &str = "CCNS";

/// Global configuration for the CCN library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CcnConfig {
    /// Whether to show progress bars during batch processing
    #[serde(default = "default_enable_progress_bar")]
    pub enable_progress_bar: bool,

    /// Number of threads for parallel operations (None = use all available)
    #[serde(default)]
    pub parallel_threads: Option<usize>,

    /// Whether to record invalid CCNs and keep going instead of failing
    #[serde(default)]
    pub skip_invalid_records: bool,

    /// Default export format for batch results
    #[serde(default)]
    pub default_output_format: OutputFormat,

    /// CSV column holding CCNs
    #[serde(default = "default_ccn_column")]
    pub ccn_column: String,

    /// Number of records handed to the thread pool at a time
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for CcnConfig {
    fn default() -> Self {
        Self {
            enable_progress_bar: default_enable_progress_bar(),
            parallel_threads: None,
            skip_invalid_records: false,
            default_output_format: OutputFormat::Json,
            ccn_column: default_ccn_column(),
            batch_size: default_batch_size(),
        }
    }
}

// Default value functions for serde
fn default_enable_progress_bar() -> bool {
    true
}

fn default_ccn_column() -> String {
    DEFAULT_CCN_COLUMN.to_string()
}

fn default_batch_size() -> usize {
    10_000
}

impl CcnConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| CcnError::Configuration {
                message: format!("Failed to parse config file: {}", e),
                suggestion: Some("Check that the file is valid TOML format".to_string()),
            })?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| CcnError::Configuration {
                message: format!("Failed to serialize config: {}", e),
                suggestion: None,
            })?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns `~/.config/ccns/config.toml` on Unix-like systems
    /// or `%APPDATA%\ccns\config.toml` on Windows
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "ccns")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Layer an optional TOML file and `CCNS_*` environment variables over the defaults
    ///
    /// Environment variables use the field names, e.g. `CCNS_CCN_COLUMN`,
    /// `CCNS_ENABLE_PROGRESS_BAR`, `CCNS_PARALLEL_THREADS`.
    pub fn from_sources(file: Option<&Path>) -> Result<Self> {
        let defaults = config::Config::try_from(&Self::default()).map_err(config_error)?;
        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = file {
            builder = builder.add_source(
                config::File::from(path).format(config::FileFormat::Toml).required(false),
            );
        }
        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(config_error)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self> {
        Self::from_sources(None)
    }

    /// Load configuration from the default location and the environment
    ///
    /// Priority order:
    /// 1. Environment variables
    /// 2. Default config file (if it exists)
    /// 3. Built-in defaults
    pub fn load() -> Self {
        let path = Self::default_config_path();
        Self::from_sources(path.as_deref()).unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring invalid CCN configuration");
            Self::default()
        })
    }

    /// Create a configuration optimized for throughput
    pub fn performance() -> Self {
        Self {
            enable_progress_bar: false,
            parallel_threads: None,
            skip_invalid_records: true,
            batch_size: 50_000,
            ..Self::default()
        }
    }

    /// Create a configuration that fails on the first invalid CCN
    pub fn safe() -> Self {
        Self {
            enable_progress_bar: true,
            parallel_threads: Some(1),
            skip_invalid_records: false,
            batch_size: 1_000,
            ..Self::default()
        }
    }
}

fn config_error(e: config::ConfigError) -> CcnError {
    CcnError::Configuration {
        message: e.to_string(),
        suggestion: Some(format!(
            "Check the config file and any {}_* environment variables",
            ENV_PREFIX
        )),
    }
}

lazy_static::lazy_static! {
    static ref GLOBAL_CONFIG: RwLock<Option<CcnConfig>> = RwLock::new(None);
}

/// Set the global configuration
pub fn set_global_config(config: CcnConfig) {
    let mut guard = GLOBAL_CONFIG.write().unwrap_or_else(|e| e.into_inner());
    *guard = Some(config);
}

/// Get the global configuration (or load it if not set)
pub fn global_config() -> CcnConfig {
    GLOBAL_CONFIG
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .as_ref()
        .cloned()
        .unwrap_or_else(CcnConfig::load)
}

/// Clear the global configuration
pub fn clear_global_config() {
    let mut guard = GLOBAL_CONFIG.write().unwrap_or_else(|e| e.into_inner());
    *guard = None;
}

/// Builder for customizing configuration
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: CcnConfig,
}

impl ConfigBuilder {
    /// Start building a new configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set progress bar enabled
    pub fn progress_bar(mut self, enabled: bool) -> Self {
        self.config.enable_progress_bar = enabled;
        self
    }

    /// Set number of parallel threads
    pub fn parallel_threads(mut self, threads: Option<usize>) -> Self {
        self.config.parallel_threads = threads;
        self
    }

    /// Set skip invalid records
    pub fn skip_invalid_records(mut self, skip: bool) -> Self {
        self.config.skip_invalid_records = skip;
        self
    }

    /// Set the default output format
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.config.default_output_format = format;
        self
    }

    /// Set the CSV column holding CCNs
    pub fn ccn_column(mut self, column: impl Into<String>) -> Self {
        self.config.ccn_column = column.into();
        self
    }

    /// Set batch size
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CcnConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // tests that read CCNS_* variables must not overlap with tests that set them
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_config_defaults() {
        let config = CcnConfig::default();
        assert!(config.enable_progress_bar);
        assert!(!config.skip_invalid_records);
        assert_eq!(config.ccn_column, "CCN");
        assert_eq!(config.default_output_format, OutputFormat::Json);
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .progress_bar(false)
            .parallel_threads(Some(4))
            .skip_invalid_records(true)
            .output_format(OutputFormat::Csv)
            .ccn_column("provider_ccn")
            .batch_size(20_000)
            .build();

        assert!(!config.enable_progress_bar);
        assert_eq!(config.parallel_threads, Some(4));
        assert!(config.skip_invalid_records);
        assert_eq!(config.default_output_format, OutputFormat::Csv);
        assert_eq!(config.ccn_column, "provider_ccn");
        assert_eq!(config.batch_size, 20_000);
    }

    #[test]
    fn test_toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = CcnConfig::performance();
        config.save(&path).unwrap();
        assert_eq!(CcnConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "ccn_column = \"prvdr_num\"\nskip_invalid_records = true\n").unwrap();

        let config = CcnConfig::from_sources(Some(path.as_path())).unwrap();
        assert_eq!(config.ccn_column, "prvdr_num");
        assert!(config.skip_invalid_records);
        assert_eq!(config.batch_size, 10_000);
        assert!(config.enable_progress_bar);
    }

    #[test]
    fn test_env_overrides_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "ccn_column = \"from_file\"\nbatch_size = 500\nparallel_threads = 8\n").unwrap();

        let vars = [
            ("CCNS_CCN_COLUMN", "prvdr_num"),
            ("CCNS_PARALLEL_THREADS", "3"),
            ("CCNS_SKIP_INVALID_RECORDS", "true"),
        ];
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
        let layered = CcnConfig::from_sources(Some(path.as_path()));
        let env_only = CcnConfig::from_env();
        for (key, _) in vars {
            std::env::remove_var(key);
        }

        let config = layered.unwrap();
        assert_eq!(config.ccn_column, "prvdr_num");
        assert_eq!(config.parallel_threads, Some(3));
        assert!(config.skip_invalid_records);
        // untouched by the environment
        assert_eq!(config.batch_size, 500);

        let config = env_only.unwrap();
        assert_eq!(config.ccn_column, "prvdr_num");
        assert_eq!(config.batch_size, 10_000);
    }

    #[test]
    fn test_invalid_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "batch_size = [").unwrap();
        assert!(matches!(CcnConfig::from_file(&path), Err(CcnError::Configuration { .. })));
    }
}
