//! Server configuration loaded from environment variables.
//!
//! - `PCGS_HOST` - bind address (default `127.0.0.1`)
//! - `PCGS_PORT` - HTTP port (default `3000`)
//! - `PCGS_MAX_UPLOAD_BYTES` - largest accepted request body, which bounds workbook
//!   uploads (default 10 MiB)

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let host = lookup("PCGS_HOST")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);

        let port = lookup("PCGS_PORT")
            .and_then(|s| s.trim().parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let max_upload_bytes = lookup("PCGS_MAX_UPLOAD_BYTES")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(defaults.max_upload_bytes);

        Self {
            host,
            port,
            max_upload_bytes,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PCGS_HOST", "0.0.0.0"),
            ("PCGS_PORT", "8080"),
            ("PCGS_MAX_UPLOAD_BYTES", "1024"),
        ]));
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn ignores_unparseable_values() {
        let config = ServerConfig::from_lookup(lookup(&[("PCGS_PORT", "not-a-port")]));
        assert_eq!(config.port, 3000);
    }
}
