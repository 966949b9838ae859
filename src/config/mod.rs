// Configuration module

pub mod server;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::DEFAULT_UPLOAD_DIR;
use crate::logging::LoggingConfig;
use crate::pipeline::PipelineConfig;
use crate::watermark::WatermarkConfig;

pub use server::ServerConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub watermark: WatermarkConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_upload_dir() -> String {
    DEFAULT_UPLOAD_DIR.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory processed uploads are written to
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
        }
    }
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        // First, check that all referenced environment variables exist
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            std::env::var(var_name).map_err(|_| {
                format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                )
            })?;
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        if substituted.trim().is_empty() {
            return Ok(Config::default());
        }

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.server.address.is_empty() {
            return Err("server.address cannot be empty".to_string());
        }
        if self.server.port == 0 {
            return Err("server.port must be greater than 0".to_string());
        }
        if self.server.request_timeout == 0 {
            return Err("server.request_timeout must be greater than 0".to_string());
        }
        if self.server.max_upload_size == 0 {
            return Err("server.max_upload_size must be greater than 0".to_string());
        }

        self.pipeline.validate()?;

        if self.watermark.path.is_empty() {
            return Err("watermark.path cannot be empty".to_string());
        }
        self.watermark
            .to_options()
            .validate()
            .map_err(|e| e.to_string())?;

        if self.storage.upload_dir.is_empty() {
            return Err("storage.upload_dir cannot be empty".to_string());
        }

        Ok(())
    }
}
