//! Workload collection for release-owned Deployments and DaemonSets
//!
//! helm-controller labels every workload it manages with the owning
//! release name; this module lists workloads by that label and reduces
//! them to ready/total counters. Listing sits behind a trait so release
//! checks can be exercised without a cluster.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment};
use kube::api::ListParams;
use kube::{Api, Client, ResourceExt};

use crate::models::{WorkloadKind, WorkloadStatus};

/// Label key helm-controller stamps on workloads it manages
pub const OWNER_LABEL: &str = "helm.toolkit.fluxcd.io/name";

/// Build the equality selector binding the ownership label to a release name
pub fn selector_for(release: &str) -> String {
    format!("{}={}", OWNER_LABEL, release)
}

/// Listing seam for workloads owned by a release
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkloadLister: Send + Sync {
    /// List workloads of one kind labeled as owned by `release`
    async fn list(
        &self,
        kind: WorkloadKind,
        release: &str,
    ) -> Result<Vec<WorkloadStatus>, kube::Error>;
}

/// Lister backed by the cluster API, scoped to one namespace
pub struct KubeWorkloadLister {
    client: Client,
    namespace: String,
}

impl KubeWorkloadLister {
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
        }
    }
}

#[async_trait]
impl WorkloadLister for KubeWorkloadLister {
    async fn list(
        &self,
        kind: WorkloadKind,
        release: &str,
    ) -> Result<Vec<WorkloadStatus>, kube::Error> {
        let params = ListParams::default().labels(&selector_for(release));

        let statuses: Vec<WorkloadStatus> = match kind {
            WorkloadKind::Deployment => {
                let api: Api<Deployment> = Api::namespaced(self.client.clone(), &self.namespace);
                api.list(&params)
                    .await?
                    .items
                    .into_iter()
                    .map(|dep| {
                        let ready = dep
                            .status
                            .as_ref()
                            .and_then(|s| s.ready_replicas)
                            .unwrap_or(0);
                        let total = dep.status.as_ref().and_then(|s| s.replicas).unwrap_or(0);
                        WorkloadStatus {
                            name: dep.name_any(),
                            kind,
                            ready,
                            total,
                        }
                    })
                    .collect()
            }
            WorkloadKind::DaemonSet => {
                let api: Api<DaemonSet> = Api::namespaced(self.client.clone(), &self.namespace);
                api.list(&params)
                    .await?
                    .items
                    .into_iter()
                    .map(|ds| {
                        let ready = ds.status.as_ref().map(|s| s.number_ready).unwrap_or(0);
                        let total = ds
                            .status
                            .as_ref()
                            .map(|s| s.desired_number_scheduled)
                            .unwrap_or(0);
                        WorkloadStatus {
                            name: ds.name_any(),
                            kind,
                            ready,
                            total,
                        }
                    })
                    .collect()
            }
        };

        tracing::debug!(
            "listed {} {} workload(s) for release {}",
            statuses.len(),
            kind,
            release
        );
        Ok(statuses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_for_binds_release_name() {
        assert_eq!(
            selector_for("cert-manager"),
            "helm.toolkit.fluxcd.io/name=cert-manager"
        );
    }

    #[test]
    fn test_selector_for_empty_name() {
        assert_eq!(selector_for(""), "helm.toolkit.fluxcd.io/name=");
    }
}
