//! Harness configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Web harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// HTTP listen address
    pub listen: String,

    /// SQLite database file, or `:memory:`
    pub db_path: PathBuf,

    /// Sleep in mock endpoints to imitate network delays
    pub simulate_latency: bool,

    /// Mock login credentials
    pub credentials: Credentials,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:3000".to_string(),
            db_path: mcpbench_common::default_db_path(),
            simulate_latency: true,
            credentials: Credentials::default(),
        }
    }
}

/// The single account every mock login endpoint accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "testuser".to_string(),
            password: "password123".to_string(),
        }
    }
}

impl Credentials {
    pub fn matches(&self, username: Option<&str>, password: Option<&str>) -> bool {
        username == Some(self.username.as_str()) && password == Some(self.password.as_str())
    }
}

impl HarnessConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Parsed listen address
    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        self.listen
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid listen address {:?}: {}", self.listen, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = HarnessConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.listen, "127.0.0.1:3000");
        assert!(config.simulate_latency);
        assert_eq!(config.credentials, Credentials::default());
        assert!(config.db_path.ends_with("submissions.db"));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harness.toml");
        std::fs::write(
            &path,
            r#"
            simulate_latency = false

            [credentials]
            password = "hunter2"
            "#,
        )
        .unwrap();

        let config = HarnessConfig::load(&path).unwrap();
        assert!(!config.simulate_latency);
        assert_eq!(config.listen, "127.0.0.1:3000");
        assert_eq!(config.credentials.username, "testuser");
        assert_eq!(config.credentials.password, "hunter2");
    }

    #[test]
    fn test_listen_and_db_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("harness.toml");
        std::fs::write(
            &path,
            r#"
            listen = "0.0.0.0:8088"
            db_path = ":memory:"
            "#,
        )
        .unwrap();

        let loaded = HarnessConfig::load(&path).unwrap();
        assert_eq!(loaded.listen, "0.0.0.0:8088");
        assert_eq!(loaded.db_path, PathBuf::from(":memory:"));
        assert_eq!(loaded.listen_addr().unwrap().port(), 8088);
    }

    #[test]
    fn test_bad_listen_address() {
        let config = HarnessConfig {
            listen: "localhost".to_string(),
            ..Default::default()
        };
        assert!(config.listen_addr().is_err());
    }

    #[test]
    fn test_credentials_match() {
        let creds = Credentials::default();
        assert!(creds.matches(Some("testuser"), Some("password123")));
        assert!(!creds.matches(Some("testuser"), Some("wrong")));
        assert!(!creds.matches(None, Some("password123")));
    }
}
