//! Application configuration

mod app_config;

pub use app_config::{
    AdmissionConfig, AppConfig, AuditConfig, AuditOverflowPolicy, DatabaseConfig, LogFormat,
    LoggingConfig, ServerConfig, StorageBackend,
};
