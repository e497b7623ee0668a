//! Down command - Bring down a cluster
//!
//! Usage: drydock down [--config <path>] [--image <ref>]
//!
//! One invocation performs one guarded teardown:
//! 1. Resolve layered configuration (`config.yml` + `config.user.yml`)
//! 2. Bind a handle to the cluster described by the topology file
//! 3. Run the stop transition and release the handle on every exit path
//!
//! The command never retries internally; re-invoking it is safe because
//! teardown is idempotent.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use tracing::{info, warn};

use drydock_common::cluster::{
    ClusterBackend, ClusterConfig, ClusterFactory, ComposeBackend, LifecycleResult,
};
use drydock_common::config::{self, EffectiveConfig, BASE_CONFIG_FILE, USER_CONFIG_FILE};

use crate::{Error, Result};

/// Bring down a cluster
#[derive(Args, Debug)]
pub struct DownArgs {
    /// Cluster configuration (topology) location; overrides the
    /// clusterConfig value from config.yml
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Cluster image; overrides the baseImage value from config.yml
    #[arg(long, env = "DRYDOCK_IMAGE")]
    pub image: Option<String>,
}

/// Orchestrates one teardown invocation.
#[derive(Debug)]
pub struct Downer {
    topology: PathBuf,
    cluster_config: ClusterConfig,
    backend: Arc<dyn ClusterBackend>,
}

impl Downer {
    /// Assemble the invocation from CLI args and the resolved configuration.
    ///
    /// CLI flags win over config-file values when both are present. Missing
    /// the topology path from both sources makes the invocation
    /// unaddressable, which is a configuration error.
    pub fn new(
        args: &DownArgs,
        effective: &EffectiveConfig,
        backend: Arc<dyn ClusterBackend>,
    ) -> Result<Self> {
        let image = args
            .image
            .clone()
            .or_else(|| effective.base_image.clone())
            .ok_or_else(|| {
                Error::invalid_cluster_config(
                    "no image configured; set --image or baseImage in config.yml",
                )
            })?;

        let topology = args
            .config
            .clone()
            .or_else(|| effective.cluster_config.clone())
            .ok_or_else(|| {
                Error::invalid_cluster_config(
                    "no cluster topology configured; set --config or clusterConfig in config.yml",
                )
            })?;

        Ok(Self {
            topology,
            cluster_config: ClusterConfig {
                image,
                license_file: effective.license_file.clone(),
            },
            backend,
        })
    }

    /// The topology path this invocation will address
    pub fn topology(&self) -> &Path {
        &self.topology
    }

    /// The assembled cluster config
    pub fn cluster_config(&self) -> &ClusterConfig {
        &self.cluster_config
    }

    /// Run the teardown transition against the bound cluster.
    pub async fn run(&self) -> Result<()> {
        let factory = ClusterFactory::new(self.backend.clone());
        let handle = factory
            .create_cluster(&self.topology, &self.cluster_config)
            .await?;

        // Release is owed from this point on, whatever the transition does.
        let outcome = handle.stop().await;
        if let Err(e) = handle.release().await {
            warn!(cluster = %handle.name(), error = %e, "Failed to release cluster handle");
        }

        match outcome? {
            LifecycleResult::Success => {
                info!(cluster = %handle.name(), "Cluster is down");
                Ok(())
            }
            LifecycleResult::AlreadyInTargetState => {
                info!(cluster = %handle.name(), "Cluster was already down");
                Ok(())
            }
            LifecycleResult::Failure(reason) => Err(Error::transition_failed(handle.name(), reason)),
        }
    }
}

/// Entry point for `drydock down`
pub async fn run(args: DownArgs) -> Result<()> {
    let effective = config::resolve(Path::new(BASE_CONFIG_FILE), Path::new(USER_CONFIG_FILE))?;
    let downer = Downer::new(&args, &effective, Arc::new(ComposeBackend::new()))?;
    downer.run().await
}
