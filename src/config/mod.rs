//! Runtime configuration

mod app_config;

pub use app_config::{
    AppConfig, HttpSettings, IngestSettings, LogFormat, LoggingConfig, TranslationSettings,
};
