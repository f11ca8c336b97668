//! Service A address resolution.

use std::fmt;

/// Port Service A listens on.
pub const SERVICE_A_PORT: u16 = 8000;

/// Path of the Service A data endpoint.
pub const DATA_PATH: &str = "/api/data/";

/// Location of the Service A data endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamAddress {
    host: String,
    port: u16,
    path: &'static str,
}

impl UpstreamAddress {
    /// Address on the fixed port and path for `host`.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: SERVICE_A_PORT,
            path: DATA_PATH,
        }
    }

    /// Same host and path on another port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Host name.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Full URL to GET.
    pub fn url(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for UpstreamAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http://{}:{}{}", self.host, self.port, self.path)
    }
}
