//! Server management - spawning and health checking the notes server

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{E2eError, E2eResult};

/// Handle to a running server process
pub struct ServerHandle {
    /// `None` once the process has been stopped and reaped
    child: Option<Child>,
    pub base_url: String,
    pub port: u16,
}

impl ServerHandle {
    /// Spawn the notes-server binary
    pub async fn spawn(config: ServerConfig) -> E2eResult<Self> {
        let port = match config.port {
            Some(port) => port,
            None => find_free_port()?,
        };
        let base_url = format!("http://127.0.0.1:{}", port);

        info!("Spawning notes server on port {}", port);

        let mut cmd = Command::new(&config.binary_path);
        cmd.env("NOTES_SERVER_LISTEN", format!("127.0.0.1:{}", port))
            .env("NOTES_SERVER_DB", ":memory:")
            .env("NOTES_SERVER_SEED", if config.seed { "1" } else { "0" });

        if config.show_output {
            cmd.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        let child = cmd.spawn().map_err(|e| {
            E2eError::ServerStartup(format!(
                "Failed to spawn {}: {}",
                config.binary_path.display(),
                e
            ))
        })?;

        let handle = ServerHandle {
            child: Some(child),
            base_url: base_url.clone(),
            port,
        };

        // Wait for server to be healthy
        handle.wait_for_healthy(config.startup_timeout).await?;

        info!("Server is healthy at {}", base_url);
        Ok(handle)
    }

    /// Wait for the server to respond to health checks
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
                    // Connection refused is expected while server is starting
                    if !e.is_connect() {
                        warn!("Health check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(100)).await;
        }

        Err(E2eError::ServerHealthCheck(attempts))
    }

    /// Get the base URL for this server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the notes collection
    pub fn notes_url(&self) -> String {
        format!("{}/notes", self.base_url)
    }

    /// Stop the server. Later calls are no-ops.
    pub fn stop(&mut self) -> E2eResult<()> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        info!("Stopping server (pid: {})", child.id());

        // Try graceful shutdown first
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(child.id() as i32);
            if kill(pid, Signal::SIGINT).is_ok() {
                std::thread::sleep(Duration::from_millis(200));
            }
        }

        // Force kill if still running
        let _ = child.kill();
        let _ = child.wait();

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
    /// Path to the notes-server binary
    pub binary_path: PathBuf,

    /// Port to listen on (None = find free port)
    pub port: Option<u16>,

    /// Timeout for server startup
    pub startup_timeout: Duration,

    /// Start from the seed notes
    pub seed: bool,

    /// Forward the server's stdout and stderr
    pub show_output: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/../../target/debug/notes-server"
            )),
            port: None,
            startup_timeout: Duration::from_secs(30),
            seed: true,
            show_output: false,
        }
    }
}

/// Find a free port to use
fn find_free_port() -> std::io::Result<u16> {
    use std::net::TcpListener;

    Ok(TcpListener::bind("127.0.0.1:0")?.local_addr()?.port())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_free_port() {
        let port1 = find_free_port().unwrap();
        let port2 = find_free_port().unwrap();

        // Ports should be in valid range
        assert!(port1 > 1024);
        assert!(port2 > 1024);
    }

    #[cfg(unix)]
    #[test]
    fn test_stop_is_idempotent() {
        let child = Command::new("sleep").arg("30").spawn().unwrap();
        let mut handle = ServerHandle {
            child: Some(child),
            base_url: "http://127.0.0.1:9".to_string(),
            port: 9,
        };

        handle.stop().unwrap();
        assert!(handle.child.is_none());

        // second stop and the drop that follows must not signal again
        let start = std::time::Instant::now();
        handle.stop().unwrap();
        assert!(start.elapsed() < Duration::from_millis(100));
        assert!(handle.child.is_none());
    }

    #[tokio::test]
    async fn test_missing_binary_is_startup_error() {
        let config = ServerConfig {
            binary_path: PathBuf::from("/nonexistent/notes-server"),
            ..Default::default()
        };
        let result = ServerHandle::spawn(config).await;
        assert!(matches!(result, Err(E2eError::ServerStartup(_))));
    }
}
