use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub http_port: u16,
    pub max_checks: usize,
    pub hashing_secret: String,
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Staging,
    Production,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Staging,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORT") {
            self.http_port = v.parse().unwrap_or(self.http_port);
        }
        if let Ok(v) = env::var("MAX_CHECKS") {
            self.max_checks = v.parse().unwrap_or(self.max_checks);
        }
        if let Ok(v) = env::var("HASHING_SECRET") {
            self.hashing_secret = v;
        }
        if let Ok(v) = env::var("DATA_DIR") {
            self.data_dir = PathBuf::from(v);
        }

        self
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            http_port: 3000,
            max_checks: 5,
            hashing_secret: "this is a secret".to_string(),
            data_dir: PathBuf::from(".data"),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            http_port: 5000,
            max_checks: 5,
            hashing_secret: "this is also a secret".to_string(),
            data_dir: PathBuf::from(".data"),
        }
    }
}

// Global singleton config - initialized once at startup, read-only thereafter
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
