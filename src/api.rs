//! Injected cluster API capability
//!
//! The two live-cluster touch points (listing CNPG Backup resources and
//! upserting the identity-override ConfigMap) go through the [`ClusterOps`]
//! trait rather than an ambiently constructed client, so tests can
//! substitute a fake and the actions stay pure document transformations
//! otherwise.

use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{ListParams, Patch, PatchParams};
use kube::{Api, Client};

use crate::crd::Backup;

/// Field manager name for server-side apply
pub const FIELD_MANAGER: &str = "velero-cnpg";

/// Narrow contract over the cluster API used by the item actions.
#[allow(async_fn_in_trait)]
pub trait ClusterOps {
    /// List all CNPG Backup resources in a namespace.
    async fn list_backups(&self, namespace: &str) -> kube::Result<Vec<Backup>>;

    /// Create or update a ConfigMap idempotently.
    async fn apply_config_map(
        &self,
        namespace: &str,
        name: &str,
        config_map: &ConfigMap,
    ) -> kube::Result<()>;
}

/// [`ClusterOps`] implementation backed by a real Kubernetes client.
#[derive(Clone)]
pub struct KubeClusterOps {
    client: Client,
}

impl KubeClusterOps {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl ClusterOps for KubeClusterOps {
    async fn list_backups(&self, namespace: &str) -> kube::Result<Vec<Backup>> {
        let backups: Api<Backup> = Api::namespaced(self.client.clone(), namespace);
        let list = backups.list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn apply_config_map(
        &self,
        namespace: &str,
        name: &str,
        config_map: &ConfigMap,
    ) -> kube::Result<()> {
        let config_maps: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        // Server-side apply converges to last-writer-wins, which is the
        // behavior we want when concurrent restores race on the upsert.
        let params = PatchParams::apply(FIELD_MANAGER).force();
        config_maps
            .patch(name, &params, &Patch::Apply(config_map))
            .await?;
        Ok(())
    }
}
