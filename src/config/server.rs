//! HTTP server configuration.
//!
//! Default values are sourced from `crate::constants`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    DEFAULT_ADDRESS, DEFAULT_INDEX_FILE, DEFAULT_MAX_UPLOAD_SIZE, DEFAULT_PORT,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};

fn default_address() -> String {
    DEFAULT_ADDRESS.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_max_upload_size() -> usize {
    DEFAULT_MAX_UPLOAD_SIZE
}

fn default_index_file() -> String {
    DEFAULT_INDEX_FILE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Seconds an upload may take before it is cancelled
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Largest accepted upload in bytes (default: 20 MiB)
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
    /// HTML page served at `/`
    #[serde(default = "default_index_file")]
    pub index_file: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            max_upload_size: default_max_upload_size(),
            index_file: default_index_file(),
        }
    }
}

impl ServerConfig {
    /// `address:port` to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}
