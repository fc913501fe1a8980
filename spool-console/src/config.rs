use std::path::PathBuf;
use std::time::Duration;

use spool_client::ClientConfig;

/// Console configuration
///
/// # Environment
///
/// Every field can be set through the environment (or a `.env` file):
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | SPOOLMAN_URL | http://localhost:7912 | REST API base |
/// | SPOOLMAN_WEB_URL | SPOOLMAN_URL | Web root for full entity links |
/// | EXPORT_DIR | ./labels | Where exported labels are written |
/// | EXPORT_DPI | 300 | Raster resolution |
/// | LOG_LEVEL | info | Log filter when RUST_LOG is unset |
/// | LOG_DIR | unset | Enables daily rotating log files |
/// | LOG_JSON | false | JSON log lines |
/// | REQUEST_TIMEOUT_MS | 30000 | REST request timeout |
#[derive(Debug, Clone)]
pub struct Config {
    pub spoolman_url: String,
    pub web_url: Option<String>,
    pub export_dir: PathBuf,
    pub export_dpi: f32,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub log_json: bool,
    pub request_timeout_ms: u64,
}

impl Config {
    /// Load from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            spoolman_url: std::env::var("SPOOLMAN_URL")
                .unwrap_or_else(|_| "http://localhost:7912".into()),
            web_url: std::env::var("SPOOLMAN_WEB_URL").ok(),
            export_dir: std::env::var("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./labels")),
            export_dpi: std::env::var("EXPORT_DPI")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300.0),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30000),
        }
    }

    /// REST client settings
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(&self.spoolman_url)
            .with_timeout(Duration::from_millis(self.request_timeout_ms));
        match &self.web_url {
            Some(url) => config.with_web_url(url),
            None => config,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
