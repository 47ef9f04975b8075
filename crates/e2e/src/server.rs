//! Server management - spawning and health checking the web server

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Handle to a running server process
pub struct ServerHandle {
    child: Child,
    pub base_url: String,
    pub port: u16,
}

impl ServerHandle {
    /// Spawn the mcpbench-web server
    pub async fn spawn(config: ServerConfig) -> E2eResult<Self> {
        let port = match config.port {
            Some(port) => port,
            None => find_free_port()?,
        };
        let base_url = format!("http://127.0.0.1:{}", port);

        info!("Spawning web server on port {}", port);

        let mut cmd = Command::new(&config.binary_path);
        cmd.arg("--listen")
            .arg(format!("127.0.0.1:{}", port))
            .arg("--db")
            .arg(&config.db_path);

        if !config.simulate_latency {
            cmd.arg("--no-latency");
        }

        cmd.stdout(Stdio::null());
        if config.show_server_logs {
            cmd.stderr(Stdio::inherit());
        } else {
            cmd.stderr(Stdio::null());
        }

        let child = cmd.spawn().map_err(|e| {
            E2eError::ServerStartup(format!(
                "Failed to spawn {}: {}",
                config.binary_path.display(),
                e
            ))
        })?;

        let handle = ServerHandle {
            child,
            base_url: base_url.clone(),
            port,
        };

        handle.wait_for_healthy(config.startup_timeout).await?;

        info!("Server is healthy at {}", base_url);
        Ok(handle)
    }

    /// Poll `/health` until it answers 2xx or the timeout runs out
    async fn wait_for_healthy(&self, timeout_duration: Duration) -> E2eResult<()> {
        let health_url = format!("{}/health", self.base_url);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout_duration {
            attempts += 1;

            match client.get(&health_url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return Ok(());
                }
                Ok(resp) => {
                    warn!("Health check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for server to start...");
                    }
                    // Connection refused until the listener is bound
                    if !e.is_connect() {
                        warn!("Health check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(100)).await;
        }

        Err(E2eError::ServerHealthCheck(attempts))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stop the server: SIGTERM first, then kill
    pub fn stop(&mut self) -> E2eResult<()> {
        if let Ok(Some(_)) = self.child.try_wait() {
            return Ok(());
        }

        info!("Stopping server (pid: {})", self.child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(500));
            }
        }

        let _ = self.child.kill();
        let _ = self.child.wait();

        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Configuration for spawning a server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to the mcpbench-web binary
    pub binary_path: PathBuf,

    /// Passed through as `--db`
    pub db_path: String,

    /// Port to listen on (None = find free port)
    pub port: Option<u16>,

    pub startup_timeout: Duration,

    pub simulate_latency: bool,

    /// Forward the server's stderr to ours
    pub show_server_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from("target/debug/mcpbench-web"),
            db_path: ":memory:".to_string(),
            port: None,
            startup_timeout: Duration::from_secs(30),
            simulate_latency: false,
            show_server_logs: false,
        }
    }
}

/// Ask the OS for an unused local port
pub fn find_free_port() -> E2eResult<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_free_port() {
        let port = find_free_port().unwrap();
        assert!(port > 1024);
    }

    #[test]
    fn test_default_config_uses_private_db() {
        let config = ServerConfig::default();
        assert_eq!(config.db_path, ":memory:");
        assert!(!config.simulate_latency);
        assert!(config.port.is_none());
    }

    #[tokio::test]
    async fn test_spawn_missing_binary_fails() {
        let config = ServerConfig {
            binary_path: PathBuf::from("/nonexistent/mcpbench-web"),
            ..Default::default()
        };
        match ServerHandle::spawn(config).await {
            Err(E2eError::ServerStartup(msg)) => assert!(msg.contains("/nonexistent/mcpbench-web")),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("spawn should fail"),
        }
    }
}
