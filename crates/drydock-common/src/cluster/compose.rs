//! Docker Compose cluster backend
//!
//! Drives `docker compose` as an external process: the compose project name
//! is the cluster name and the compose file is the cluster topology. The
//! image and license file are exported as environment variables for the
//! topology to interpolate.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::{ClusterBackend, ClusterConfig, ClusterHandle, LifecycleResult};
use crate::{Error, Result};

/// Backend identifier used in error context
pub const BACKEND_NAME: &str = "compose";

/// Environment variable carrying the cluster image into the topology
const IMAGE_ENV: &str = "DRYDOCK_IMAGE";

/// Environment variable carrying the license file path into the topology
const LICENSE_ENV: &str = "DRYDOCK_LICENSE_FILE";

/// Cluster backend backed by the `docker compose` CLI.
#[derive(Debug, Default)]
pub struct ComposeBackend;

impl ComposeBackend {
    /// Create a new Compose backend
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ClusterBackend for ComposeBackend {
    async fn connect(
        &self,
        topology: &Path,
        name: &str,
        config: &ClusterConfig,
    ) -> Result<Box<dyn ClusterHandle>> {
        // Probe the delegate once so an unreachable daemon surfaces as
        // BackendUnavailable during binding instead of as a failed
        // transition later.
        let output = Command::new("docker")
            .args(["compose", "version"])
            .output()
            .await
            .map_err(|e| {
                Error::backend_unavailable(
                    BACKEND_NAME,
                    format!("failed to run docker compose: {}", e),
                )
            })?;

        if !output.status.success() {
            return Err(Error::backend_unavailable(
                BACKEND_NAME,
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        debug!(cluster = %name, topology = %topology.display(), "Compose backend ready");

        Ok(Box::new(ComposeHandle {
            name: name.to_string(),
            topology: topology.to_path_buf(),
            config: config.clone(),
        }))
    }
}

/// Handle bound to one compose project.
#[derive(Debug)]
pub struct ComposeHandle {
    name: String,
    topology: PathBuf,
    config: ClusterConfig,
}

impl ComposeHandle {
    fn command(&self, tail: &[&str]) -> Command {
        let mut cmd = Command::new("docker");
        cmd.args(project_args(&self.name, &self.topology));
        cmd.args(tail);
        cmd.env(IMAGE_ENV, &self.config.image);
        if let Some(license) = &self.config.license_file {
            cmd.env(LICENSE_ENV, license);
        }
        cmd
    }

    /// Check whether the project still has live containers.
    ///
    /// A failing `ps` (e.g. unknown project) is treated as "nothing
    /// running" since the state can't be determined.
    async fn has_live_containers(&self) -> Result<bool> {
        let output = self.command(&["ps", "-q"]).output().await.map_err(|e| {
            Error::backend_unavailable(BACKEND_NAME, format!("failed to run docker compose: {}", e))
        })?;

        if !output.status.success() {
            debug!(
                cluster = %self.name,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "compose ps failed, assuming no live containers"
            );
            return Ok(false);
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .any(|line| !line.trim().is_empty()))
    }
}

#[async_trait]
impl ClusterHandle for ComposeHandle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn stop(&self) -> Result<LifecycleResult> {
        if !self.has_live_containers().await? {
            info!(cluster = %self.name, "Cluster already down");
            return Ok(LifecycleResult::AlreadyInTargetState);
        }

        info!(cluster = %self.name, "Tearing down cluster");
        let output = self
            .command(&["down", "--volumes", "--remove-orphans"])
            .output()
            .await
            .map_err(|e| {
                Error::backend_unavailable(
                    BACKEND_NAME,
                    format!("failed to run docker compose: {}", e),
                )
            })?;

        if !output.status.success() {
            return Ok(LifecycleResult::Failure(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        info!(cluster = %self.name, "Cluster down");
        Ok(LifecycleResult::Success)
    }

    async fn release(&self) -> Result<()> {
        // Compose keeps no server-side session for a project; there is
        // nothing to relinquish beyond the process-local handle.
        debug!(cluster = %self.name, "Released cluster handle");
        Ok(())
    }
}

/// Arguments addressing one compose project: `compose -p <name> -f <topology>`
fn project_args(name: &str, topology: &Path) -> Vec<String> {
    vec![
        "compose".to_string(),
        "-p".to_string(),
        name.to_string(),
        "-f".to_string(),
        topology.to_string_lossy().into_owned(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_args_address_one_project() {
        let args = project_args("ci-deck", Path::new("/topo/cluster.yml"));
        assert_eq!(args, ["compose", "-p", "ci-deck", "-f", "/topo/cluster.yml"]);
    }

    #[tokio::test]
    async fn handle_reports_bound_name() {
        let handle = ComposeHandle {
            name: "ci-deck".to_string(),
            topology: PathBuf::from("/topo/cluster.yml"),
            config: ClusterConfig {
                image: "x".to_string(),
                license_file: None,
            },
        };
        assert_eq!(handle.name(), "ci-deck");
        // Release holds no backend state and never fails
        handle.release().await.unwrap();
    }
}
