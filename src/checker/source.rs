//! Fetch seam for HelmRelease resources
//!
//! HelmReleases are fetched as dynamic objects and traversed as JSON, so
//! the seam hands back `DynamicObject` and leaves decoding to the
//! checker. Like the workload lister, it exists so release checks can be
//! exercised without a cluster.

use async_trait::async_trait;
use kube::api::{Api, DynamicObject, ListParams};
use kube::{Client, ResourceExt};

use crate::kube::helmrelease_resource;

/// Access to HelmRelease resources in one namespace
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetch a single HelmRelease by name
    async fn get(&self, name: &str) -> Result<DynamicObject, kube::Error>;

    /// Names of all HelmReleases in the namespace
    async fn list_names(&self) -> Result<Vec<String>, kube::Error>;
}

/// Source backed by the cluster API, scoped to one namespace
pub struct KubeReleaseSource {
    client: Client,
    namespace: String,
}

impl KubeReleaseSource {
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }

    fn api(&self) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), &self.namespace, &helmrelease_resource())
    }
}

#[async_trait]
impl ReleaseSource for KubeReleaseSource {
    async fn get(&self, name: &str) -> Result<DynamicObject, kube::Error> {
        self.api().get(name).await
    }

    async fn list_names(&self) -> Result<Vec<String>, kube::Error> {
        let releases = self.api().list(&ListParams::default()).await?;
        Ok(releases.items.iter().map(|hr| hr.name_any()).collect())
    }
}
