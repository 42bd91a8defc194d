use std::fmt;
use std::net::SocketAddr;

use http::HeaderValue;
use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Process configuration, read once at startup.
#[derive(Clone)]
pub struct Config {
    /// Absent means the in-memory store is used.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub run_migrations: bool,
    /// Shared secret required on `/api` routes when set.
    pub api_key: Option<String>,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_addr.parse()
            .map_err(|_| ConfigError::Invalid { name: "BIND_ADDR", value: bind_addr.clone() })?;

        let max_connections = match non_empty("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid { name: "DB_MAX_CONNECTIONS", value: raw })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let run_migrations = match non_empty("RUN_MIGRATIONS") {
            Some(raw) => raw.parse::<bool>()
                .map_err(|_| ConfigError::Invalid { name: "RUN_MIGRATIONS", value: raw })?,
            None => true,
        };

        let cors_origins: Vec<String> = non_empty("CORS_ORIGINS")
            .map(|raw| raw.split(',').map(|o| o.trim().to_string()).filter(|o| !o.is_empty()).collect())
            .unwrap_or_default();
        if let Some(bad) = cors_origins.iter().find(|o| HeaderValue::from_str(o).is_err()) {
            return Err(ConfigError::Invalid { name: "CORS_ORIGINS", value: bad.clone() });
        }

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            bind_addr,
            max_connections,
            run_migrations,
            api_key: non_empty("API_KEY"),
            cors_origins,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            run_migrations: true,
            api_key: None,
            cors_origins: Vec::new(),
        }
    }
}

// Secrets stay out of logs
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("bind_addr", &self.bind_addr)
            .field("max_connections", &self.max_connections)
            .field("run_migrations", &self.run_migrations)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert!(config.database_url.is_none());
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.max_connections, 10);
        assert!(config.run_migrations);
        assert!(config.api_key.is_none());
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_reads_values() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/prices"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DB_MAX_CONNECTIONS", "4"),
            ("RUN_MIGRATIONS", "false"),
            ("API_KEY", "s3cret"),
            ("CORS_ORIGINS", "http://localhost:5173, https://prices.example.com"),
        ]).unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/prices"));
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.max_connections, 4);
        assert!(!config.run_migrations);
        assert_eq!(config.api_key.as_deref(), Some("s3cret"));
        assert_eq!(config.cors_origins, vec!["http://localhost:5173", "https://prices.example.com"]);
    }

    #[test]
    fn test_blank_api_key_disables_auth() {
        let config = config_from(&[("API_KEY", "  ")]).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(config_from(&[("BIND_ADDR", "nowhere")]).is_err());
        assert!(config_from(&[("DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(config_from(&[("RUN_MIGRATIONS", "maybe")]).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = config_from(&[("API_KEY", "s3cret"), ("DATABASE_URL", "postgres://u:pw@db/prices")]).unwrap();
        let printed = format!("{:?}", config);

        assert!(!printed.contains("s3cret"));
        assert!(!printed.contains("pw@db"));
    }
}
