use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub ingest: IngestSettings,
    #[serde(default)]
    pub translation: TranslationSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Outbound HTTP client settings
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Defaults applied to ingest jobs started through the convenience entry points
#[derive(Debug, Clone, Deserialize)]
pub struct IngestSettings {
    #[serde(default = "default_num_processes")]
    pub num_processes: usize,
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
}

/// Machine-translation service used by `translate_text`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslationSettings {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("docflow/{}", env!("CARGO_PKG_VERSION"))
}

fn default_num_processes() -> usize {
    2
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir().join("docflow")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            num_processes: default_num_processes(),
            work_dir: default_work_dir(),
        }
    }
}

impl AppConfig {
    /// Load `config/default`, `config/local`, then `DOCFLOW__*` variables
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        Self::load_from(Path::new("config"))
    }

    /// Load from a specific configuration directory
    pub fn load_from(dir: &Path) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(
                config::File::with_name(&dir.join("default").to_string_lossy()).required(false),
            )
            .add_source(
                config::File::with_name(&dir.join("local").to_string_lossy()).required(false),
            )
            .add_source(
                config::Environment::with_prefix("DOCFLOW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.ingest.num_processes, 2);
        assert!(config.translation.endpoint.is_none());
    }

    #[test]
    fn test_load_layers_local_over_default() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[logging]\nlevel = \"debug\"\nformat = \"json\"\n\n[ingest]\nnum_processes = 4\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("local.toml"),
            "[ingest]\nnum_processes = 8\n\n\
             [translation]\nendpoint = \"http://localhost:5000/translate\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(dir.path()).unwrap();

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.ingest.num_processes, 8);
        assert_eq!(
            config.translation.endpoint.as_deref(),
            Some("http://localhost:5000/translate")
        );
        assert_eq!(config.http.timeout_secs, 30);
    }

    #[test]
    fn test_missing_files_use_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load_from(dir.path()).unwrap();

        assert_eq!(config.ingest.num_processes, 2);
    }
}
