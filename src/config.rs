//! Application configuration loaded from environment variables.

use serde::Deserialize;

use crate::upstream::UpstreamAddress;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Upstream ===
    /// Host name of Service A. Port and path are fixed.
    #[serde(default = "default_service_a_host")]
    pub service_a_host: String,

    // === Server Configuration ===
    /// HTTP port this app listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory of tera templates overriding the built-in ones.
    #[serde(default)]
    pub template_dir: Option<String>,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Emit JSON formatted log lines.
    #[serde(default)]
    pub log_json: bool,
}

fn default_service_a_host() -> String {
    "service-a".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_a_host: default_service_a_host(),
            port: default_port(),
            template_dir: None,
            rust_log: default_log_level(),
            log_json: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Build configuration from explicit `(NAME, value)` pairs instead of
    /// the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        envy::from_iter(
            vars.into_iter()
                .map(|(k, v)| -> (String, String) { (k.into(), v.into()) }),
        )
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("PORT must be non-zero".to_string());
        }

        Ok(())
    }

    /// Address of the Service A data endpoint.
    ///
    /// Computed on every call; an empty host is kept as-is.
    pub fn upstream_address(&self) -> UpstreamAddress {
        UpstreamAddress::new(&self.service_a_host)
    }
}
