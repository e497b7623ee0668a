//! Cluster addressing and lifecycle
//!
//! This module provides the trait seam between the command layer and the
//! infrastructure that actually runs clusters. The [`ClusterFactory`]
//! validates and binds parameters, then delegates to a [`ClusterBackend`]
//! capability; it never provisions anything itself. Any implementation
//! (local Docker driver, cloud API, mock for tests) can satisfy the trait.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde_json::Value;
use tracing::debug;

use crate::{Error, Result};

pub mod compose;

pub use compose::ComposeBackend;

/// The subset of configuration needed to address a cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    /// Cluster image reference; must be non-empty when a handle is requested
    pub image: String,
    /// Optional license file handed through to the backend
    pub license_file: Option<PathBuf>,
}

/// Outcome of a lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleResult {
    /// The transition completed
    Success,
    /// The cluster was already in the target state; safe no-op
    AlreadyInTargetState,
    /// The backend attempted the transition and reports failure
    Failure(String),
}

/// Capability trait for the external cluster manager.
///
/// `connect` binds a handle to the named cluster described by the topology
/// file. It must not provision infrastructure; failures to respond surface
/// as [`Error::BackendUnavailable`]. Retry policy, if any, belongs to the
/// caller.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ClusterBackend: std::fmt::Debug + Send + Sync {
    /// Bind a handle to one addressable cluster
    async fn connect(
        &self,
        topology: &Path,
        name: &str,
        config: &ClusterConfig,
    ) -> Result<Box<dyn ClusterHandle>>;
}

/// In-process reference to one addressable cluster.
///
/// A handle is exclusively owned by the command for the duration of a single
/// invocation; it is never cached or reused. [`ClusterHandle::release`] must
/// run on every exit path once the handle exists.
#[async_trait]
pub trait ClusterHandle: std::fmt::Debug + Send + Sync {
    /// Name of the cluster this handle is bound to
    fn name(&self) -> &str;

    /// Execute the guarded teardown transition.
    ///
    /// Idempotent: stopping an already-stopped cluster yields
    /// [`LifecycleResult::AlreadyInTargetState`], never an error. The call
    /// may block for an externally-bounded duration; no timeout is imposed
    /// here.
    async fn stop(&self) -> Result<LifecycleResult>;

    /// Relinquish backend bookkeeping for this handle.
    ///
    /// Best-effort: callers log release errors instead of propagating them.
    async fn release(&self) -> Result<()>;
}

/// Validates cluster parameters and binds handles via a [`ClusterBackend`].
pub struct ClusterFactory {
    backend: Arc<dyn ClusterBackend>,
}

impl ClusterFactory {
    /// Create a factory wrapping the given backend
    pub fn new(backend: Arc<dyn ClusterBackend>) -> Self {
        Self { backend }
    }

    /// Produce a handle to the cluster described by `topology`.
    ///
    /// Validates that the topology file is readable and that the cluster
    /// config carries a non-empty image, then delegates binding to the
    /// backend. Exactly one handle per call; nothing is cached.
    pub async fn create_cluster(
        &self,
        topology: &Path,
        config: &ClusterConfig,
    ) -> Result<Box<dyn ClusterHandle>> {
        if config.image.trim().is_empty() {
            return Err(Error::invalid_cluster_config(
                "cluster image is empty; set --image or baseImage in config.yml",
            ));
        }

        let content = std::fs::read_to_string(topology)
            .map_err(|_| Error::cluster_config_not_found(topology))?;

        let name = cluster_name(topology, &content);
        debug!(cluster = %name, topology = %topology.display(), "Binding cluster handle");

        self.backend.connect(topology, &name, config).await
    }
}

/// Derive the cluster name from the topology document.
///
/// Uses the top-level `name` key when present, otherwise the topology file
/// stem. The rest of the document (node count, provider, sizing) is opaque
/// to drydock.
fn cluster_name(path: &Path, content: &str) -> String {
    let from_doc = serde_yaml::from_str::<Value>(content)
        .ok()
        .and_then(|doc| doc.get("name").and_then(Value::as_str).map(String::from));

    from_doc
        .or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "cluster".to_string())
}
