//! Configuration loading and validation

use anyhow::{Context, Result, bail};
use credo_api::MutationPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Authentication configuration
///
/// Key material given directly (from the environment) takes precedence over
/// the key paths and is never written back out.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_private_key_path")]
    pub private_key_path: String,
    #[serde(default = "default_public_key_path")]
    pub public_key_path: String,
    #[serde(skip)]
    pub private_key_pem: Option<String>,
    #[serde(skip)]
    pub public_key_pem: Option<String>,
    #[serde(default)]
    pub basic_auth_username: String,
    #[serde(default)]
    pub basic_auth_password: String,
    #[serde(default)]
    pub mutation_policy: MutationPolicy,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            private_key_path: default_private_key_path(),
            public_key_path: default_public_key_path(),
            private_key_pem: None,
            public_key_pem: None,
            basic_auth_username: String::new(),
            basic_auth_password: String::new(),
            mutation_policy: MutationPolicy::default(),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("private_key_path", &self.private_key_path)
            .field("public_key_path", &self.public_key_path)
            .field("basic_auth_username", &self.basic_auth_username)
            .field("mutation_policy", &self.mutation_policy)
            .finish_non_exhaustive()
    }
}

impl AuthConfig {
    /// PEM bytes of the signing key
    pub fn private_key(&self) -> Result<Vec<u8>> {
        read_key(self.private_key_pem.as_deref(), &self.private_key_path)
            .context("Failed to load RSA private key")
    }

    /// PEM bytes of the verification key
    pub fn public_key(&self) -> Result<Vec<u8>> {
        read_key(self.public_key_pem.as_deref(), &self.public_key_path)
            .context("Failed to load RSA public key")
    }
}

fn read_key(inline: Option<&str>, path: &str) -> Result<Vec<u8>> {
    match inline {
        Some(pem) => Ok(pem.as_bytes().to_vec()),
        None => std::fs::read(path).with_context(|| format!("Failed to read key file: {}", path)),
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Default)]
pub struct Overrides {
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub private_key: Option<String>,
    pub public_key: Option<String>,
    pub basic_auth_username: Option<String>,
    pub basic_auth_password: Option<String>,
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_db_path() -> String {
    "./data/credo.db".to_string()
}

fn default_max_connections() -> u32 {
    50
}

fn default_private_key_path() -> String {
    "./keys/private.pem".to_string()
}

fn default_public_key_path() -> String {
    "./keys/public.pem".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        // Check if config file exists
        if !config_path.exists() {
            info!("Config file not found at {}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }

    /// Apply command line and environment overrides
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(bind) = overrides.bind {
            self.server.bind_address = bind;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(pem) = overrides.private_key {
            self.auth.private_key_pem = Some(pem);
        }
        if let Some(pem) = overrides.public_key {
            self.auth.public_key_pem = Some(pem);
        }
        if let Some(username) = overrides.basic_auth_username {
            self.auth.basic_auth_username = username;
        }
        if let Some(password) = overrides.basic_auth_password {
            self.auth.basic_auth_password = password;
        }
    }

    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.auth.basic_auth_username.is_empty() || self.auth.basic_auth_password.is_empty() {
            bail!("auth.basic_auth_username and auth.basic_auth_password must be set");
        }
        if self.server.request_timeout_secs == 0 {
            bail!("server.request_timeout_secs must be greater than zero");
        }
        if self.database.max_connections == 0 {
            bail!("database.max_connections must be greater than zero");
        }
        Ok(())
    }

    /// SQLite connection URL for the configured database file
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.database.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/credo.toml").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout_secs, 10);
        assert_eq!(config.database.max_connections, 50);
        assert_eq!(config.auth.mutation_policy, MutationPolicy::Open);
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_load_file() {
        let file = write_config(
            r#"
            [server]
            port = 8080

            [database]
            path = "/tmp/users.db"

            [auth]
            basic_auth_username = "gatekeeper"
            basic_auth_password = "open-sesame"
            mutation_policy = "token"

            [logging]
            level = "debug"
            format = "json"
            "#,
        );

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.database_url(), "sqlite:/tmp/users.db?mode=rwc");
        assert_eq!(config.auth.mutation_policy, MutationPolicy::Token);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let file = write_config("[auth]\nmutation_policy = \"anyone\"\n");
        assert!(Config::load(file.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn test_empty_basic_auth_is_rejected() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(Overrides {
            bind: Some("127.0.0.1".to_string()),
            port: Some(9000),
            private_key: Some("inline private".to_string()),
            basic_auth_username: Some("gatekeeper".to_string()),
            basic_auth_password: Some("open-sesame".to_string()),
            ..Default::default()
        });

        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.auth.private_key().unwrap(), b"inline private");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_key_file_is_read() {
        let file = write_config("-----BEGIN PUBLIC KEY-----\n");
        let config = Config {
            auth: AuthConfig {
                public_key_path: file.path().to_str().unwrap().to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(config.auth.public_key().unwrap(), b"-----BEGIN PUBLIC KEY-----\n");
        assert!(config.auth.private_key().is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let mut config = Config::default();
        config.apply_overrides(Overrides {
            basic_auth_password: Some("open-sesame".to_string()),
            private_key: Some("secret pem".to_string()),
            ..Default::default()
        });
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("open-sesame"));
        assert!(!rendered.contains("secret pem"));
    }
}
