//! Release checking orchestration
//!
//! A `ReleaseChecker` fetches one HelmRelease document, extracts its
//! status and history, appends workload health, and produces a single
//! `ReleaseResult`. Batches run through an order-preserving bounded
//! worker pool, so the summary lists releases in enumeration order.

pub mod source;
pub mod status;
pub mod workloads;

pub use source::{KubeReleaseSource, ReleaseSource};
pub use status::{ReleaseStatus, extract_history, extract_status};
pub use workloads::{KubeWorkloadLister, OWNER_LABEL, WorkloadLister, selector_for};

use futures::StreamExt;
use kube::Client;

use crate::models::{CheckError, ReleaseResult, WorkloadKind};

/// Default number of releases checked in parallel
pub const DEFAULT_CONCURRENCY: usize = 4;

/// What to do when listing Deployments/DaemonSets fails
///
/// Workload health is supplementary to the release's own Ready verdict,
/// so the default keeps a failed sub-query from masking it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum WorkloadErrorPolicy {
    /// Log the failure and treat the listing as empty
    #[default]
    Ignore,
    /// Record the failure as the release's error
    Record,
}

/// Checks HelmReleases in one namespace
pub struct ReleaseChecker {
    source: Box<dyn ReleaseSource>,
    lister: Box<dyn WorkloadLister>,
    policy: WorkloadErrorPolicy,
    concurrency: usize,
}

impl ReleaseChecker {
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        let source = Box::new(KubeReleaseSource::new(client.clone(), namespace.clone()));
        let lister = Box::new(KubeWorkloadLister::new(client, namespace));
        Self {
            source,
            lister,
            policy: WorkloadErrorPolicy::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_policy(mut self, policy: WorkloadErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Names of all HelmReleases in the namespace
    pub async fn list_release_names(&self) -> Result<Vec<String>, kube::Error> {
        self.source.list_names().await
    }

    /// Check a single release
    ///
    /// A failed get or malformed status is recorded on the result, never
    /// propagated; history extraction and workload collection still run
    /// after a status error so the report keeps whatever was readable.
    pub async fn check_release(&self, name: &str) -> ReleaseResult {
        tracing::debug!("checking HelmRelease {}", name);
        let mut result = ReleaseResult::new(name);

        let release = match self.source.get(name).await {
            Ok(obj) => obj,
            Err(err) => {
                result.error = Some(CheckError::Get(err));
                return result;
            }
        };
        let doc = match serde_json::to_value(&release) {
            Ok(doc) => doc,
            Err(err) => {
                result.error = Some(CheckError::Decode(err));
                return result;
            }
        };

        match extract_status(&doc) {
            Ok(status) => {
                result.ready = status.ready;
                result.conditions = status.conditions;
                result.test_hooks = status.test_hooks;
            }
            Err(err) => result.error = Some(err),
        }
        result.history = extract_history(&doc);

        collect_workloads(self.lister.as_ref(), self.policy, name, &mut result).await;
        result
    }

    /// Check every release in the namespace, or just `filter` when set
    ///
    /// Releases are checked through a bounded pool; `buffered` preserves
    /// input order, so results line up with the enumeration.
    pub async fn check_all(&self, filter: Option<&str>) -> Result<Vec<ReleaseResult>, kube::Error> {
        let names = match filter {
            Some(name) => vec![name.to_string()],
            None => self.list_release_names().await?,
        };

        let results = futures::stream::iter(names)
            .map(|name| async move { self.check_release(&name).await })
            .buffered(self.concurrency)
            .collect::<Vec<_>>()
            .await;
        Ok(results)
    }
}

/// Append workload health to a result, applying the error policy
///
/// Under `Record`, a listing failure never clobbers an earlier release
/// error; the primary verdict always wins.
pub async fn collect_workloads(
    lister: &dyn WorkloadLister,
    policy: WorkloadErrorPolicy,
    release: &str,
    result: &mut ReleaseResult,
) {
    for kind in WorkloadKind::all() {
        let statuses = match lister.list(*kind, release).await {
            Ok(statuses) => statuses,
            Err(err) => {
                tracing::warn!(
                    "failed to list {} workloads for release {}: {}",
                    kind,
                    release,
                    err
                );
                if policy == WorkloadErrorPolicy::Record && result.error.is_none() {
                    result.error = Some(CheckError::WorkloadQuery {
                        kind: *kind,
                        source: err,
                    });
                }
                Vec::new()
            }
        };
        match kind {
            WorkloadKind::Deployment => result.deployments = statuses,
            WorkloadKind::DaemonSet => result.daemon_sets = statuses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::source::MockReleaseSource;
    use super::workloads::MockWorkloadLister;
    use super::*;
    use crate::kube::helmrelease_resource;
    use crate::models::WorkloadStatus;
    use kube::api::DynamicObject;

    fn transient_error() -> kube::Error {
        kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: "the server is currently unable to handle the request".to_string(),
            reason: "ServiceUnavailable".to_string(),
            code: 503,
        })
    }

    #[tokio::test]
    async fn test_listing_failure_ignored_yields_empty_sets() {
        let mut lister = MockWorkloadLister::new();
        lister
            .expect_list()
            .returning(|_, _| Err(transient_error()));

        let mut result = ReleaseResult::new("demo");
        result.ready = true;
        collect_workloads(&lister, WorkloadErrorPolicy::Ignore, "demo", &mut result).await;

        assert!(result.deployments.is_empty());
        assert!(result.daemon_sets.is_empty());
        assert!(result.error.is_none());
        assert!(result.is_passing());
    }

    #[tokio::test]
    async fn test_listing_failure_recorded_when_policy_says_so() {
        let mut lister = MockWorkloadLister::new();
        lister
            .expect_list()
            .returning(|_, _| Err(transient_error()));

        let mut result = ReleaseResult::new("demo");
        result.ready = true;
        collect_workloads(&lister, WorkloadErrorPolicy::Record, "demo", &mut result).await;

        assert!(matches!(
            result.error,
            Some(CheckError::WorkloadQuery { .. })
        ));
        assert!(!result.is_passing());
    }

    #[tokio::test]
    async fn test_recorded_listing_failure_never_clobbers_primary_error() {
        let mut lister = MockWorkloadLister::new();
        lister
            .expect_list()
            .returning(|_, _| Err(transient_error()));

        let mut result = ReleaseResult::new("demo");
        result.error = Some(CheckError::MissingStatus);
        collect_workloads(&lister, WorkloadErrorPolicy::Record, "demo", &mut result).await;

        assert!(matches!(result.error, Some(CheckError::MissingStatus)));
    }

    #[tokio::test]
    async fn test_workloads_routed_by_kind() {
        let mut lister = MockWorkloadLister::new();
        lister.expect_list().returning(|kind, release| {
            Ok(vec![WorkloadStatus {
                name: format!("{}-{}", release, kind.as_str().to_lowercase()),
                kind,
                ready: 1,
                total: 1,
            }])
        });

        let mut result = ReleaseResult::new("demo");
        collect_workloads(&lister, WorkloadErrorPolicy::Ignore, "demo", &mut result).await;

        assert_eq!(result.deployments.len(), 1);
        assert_eq!(result.deployments[0].kind, WorkloadKind::Deployment);
        assert_eq!(result.daemon_sets.len(), 1);
        assert_eq!(result.daemon_sets[0].kind, WorkloadKind::DaemonSet);
    }

    #[tokio::test]
    async fn test_partial_listing_failure_keeps_other_kind() {
        let mut lister = MockWorkloadLister::new();
        lister.expect_list().returning(|kind, _| match kind {
            WorkloadKind::Deployment => Ok(vec![WorkloadStatus {
                name: "web".to_string(),
                kind,
                ready: 2,
                total: 2,
            }]),
            WorkloadKind::DaemonSet => Err(transient_error()),
        });

        let mut result = ReleaseResult::new("demo");
        collect_workloads(&lister, WorkloadErrorPolicy::Ignore, "demo", &mut result).await;

        assert_eq!(result.deployments.len(), 1);
        assert!(result.daemon_sets.is_empty());
        assert!(result.error.is_none());
    }

    fn ready_release_doc(name: &str) -> DynamicObject {
        let mut obj = DynamicObject::new(name, &helmrelease_resource());
        obj.data = serde_json::json!({
            "status": {
                "conditions": [
                    {"type": "Ready", "status": "True", "reason": "InstallSucceeded"}
                ]
            }
        });
        obj
    }

    fn empty_lister() -> MockWorkloadLister {
        let mut lister = MockWorkloadLister::new();
        lister.expect_list().returning(|_, _| Ok(Vec::new()));
        lister
    }

    fn checker_with(source: MockReleaseSource, lister: MockWorkloadLister) -> ReleaseChecker {
        ReleaseChecker {
            source: Box::new(source),
            lister: Box::new(lister),
            policy: WorkloadErrorPolicy::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    #[tokio::test]
    async fn test_failed_get_yields_get_error_not_ready() {
        let mut source = MockReleaseSource::new();
        source.expect_get().returning(|_| Err(transient_error()));

        let checker = checker_with(source, empty_lister());
        let result = checker.check_release("demo").await;

        assert!(matches!(result.error, Some(CheckError::Get(_))));
        assert!(!result.ready);
        assert!(result.conditions.is_empty());
        assert!(result.history.is_empty());
    }

    #[tokio::test]
    async fn test_check_all_keeps_other_releases_when_one_get_fails() {
        let mut source = MockReleaseSource::new();
        source
            .expect_list_names()
            .returning(|| Ok(vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()]));
        source.expect_get().returning(|name| match name {
            "beta" => Err(transient_error()),
            other => Ok(ready_release_doc(other)),
        });

        let checker = checker_with(source, empty_lister());
        let results = checker.check_all(None).await.unwrap();

        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
        assert!(results[0].ready);
        assert!(matches!(results[1].error, Some(CheckError::Get(_))));
        assert!(!results[1].ready);
        assert!(results[2].ready);
    }

    /// Slow early responses must not let later releases overtake them
    struct StaggeredSource;

    #[async_trait::async_trait]
    impl ReleaseSource for StaggeredSource {
        async fn get(&self, name: &str) -> Result<DynamicObject, kube::Error> {
            let delay_ms = match name {
                "alpha" => 30,
                "beta" => 15,
                _ => 1,
            };
            tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            Ok(ready_release_doc(name))
        }

        async fn list_names(&self) -> Result<Vec<String>, kube::Error> {
            Ok(vec!["alpha".to_string(), "beta".to_string(), "gamma".to_string()])
        }
    }

    #[tokio::test]
    async fn test_check_all_preserves_enumeration_order_under_concurrency() {
        let checker = ReleaseChecker {
            source: Box::new(StaggeredSource),
            lister: Box::new(empty_lister()),
            policy: WorkloadErrorPolicy::default(),
            concurrency: 3,
        };

        let results = checker.check_all(None).await.unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
    }

    #[tokio::test]
    async fn test_check_all_with_filter_skips_enumeration() {
        let mut source = MockReleaseSource::new();
        source.expect_list_names().never();
        source
            .expect_get()
            .returning(|name| Ok(ready_release_doc(name)));

        let checker = checker_with(source, empty_lister());
        let results = checker.check_all(Some("demo")).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "demo");
        assert!(results[0].ready);
    }
}
