//! Data model for HelmRelease health checks
//!
//! One `ReleaseResult` is produced per checked release and is not mutated
//! after the check completes. Derived facts (readiness of a workload,
//! pass/fail of a release) are computed on demand rather than stored, so
//! they cannot drift from the counters they are derived from.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// Workload kinds cross-referenced against a HelmRelease
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WorkloadKind {
    Deployment,
    DaemonSet,
}

impl WorkloadKind {
    /// Get the display name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => "Deployment",
            WorkloadKind::DaemonSet => "DaemonSet",
        }
    }

    /// All workload kinds a release check inspects
    pub fn all() -> &'static [Self] {
        &[WorkloadKind::Deployment, WorkloadKind::DaemonSet]
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A status condition following the Kubernetes condition convention
///
/// Fields are decoded permissively from the release document: anything
/// missing or not a string becomes `None` instead of failing the whole
/// extraction, so "field absent" stays distinguishable from a field that
/// literally contains the text `null`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub status: Option<String>,
    pub reason: Option<String>,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
}

impl Condition {
    /// True when this is a `Ready` condition reporting `True`
    ///
    /// Both matches are exact and case-sensitive; no other condition
    /// influences release readiness.
    pub fn signals_ready(&self) -> bool {
        self.type_.as_deref() == Some("Ready") && self.status.as_deref() == Some("True")
    }

    /// Whether the condition's own status is exactly `True`
    pub fn is_true(&self) -> bool {
        self.status.as_deref() == Some("True")
    }
}

/// Result of a post-install Helm test hook
#[derive(Debug, Clone, Serialize)]
pub struct TestHook {
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub status: Option<String>,
    pub message: Option<String>,
}

/// Replica readiness of a Deployment or DaemonSet owned by a release
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadStatus {
    pub name: String,
    pub kind: WorkloadKind,
    pub ready: i32,
    pub total: i32,
}

impl WorkloadStatus {
    /// Healthy iff every desired replica is ready
    ///
    /// Exact equality: a surplus of ready replicas is just as much a
    /// non-steady state as a deficit.
    pub fn is_healthy(&self) -> bool {
        self.ready == self.total
    }
}

/// A prior release revision from the HelmRelease history
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub version: i64,
    pub chart_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_hooks: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Errors recorded on a per-release result
///
/// Only client construction is fatal to the whole run (handled with
/// `anyhow` at the binary edge); everything here stays scoped to the
/// release it concerns.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The HelmRelease resource is missing or unreadable
    #[error("failed to get HelmRelease: {0}")]
    Get(kube::Error),
    /// The release document has no `status` subtree
    #[error("HelmRelease has no status")]
    MissingStatus,
    /// The `status` subtree has an unexpected shape
    #[error("malformed HelmRelease status: {0}")]
    MalformedStatus(String),
    /// Listing owned workloads failed; only surfaced under
    /// `WorkloadErrorPolicy::Record`
    #[error("failed to list {kind} workloads: {source}")]
    WorkloadQuery {
        kind: WorkloadKind,
        source: kube::Error,
    },
    /// The fetched object could not be converted to a JSON document
    #[error("failed to decode HelmRelease document: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Aggregated check outcome for a single HelmRelease
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseResult {
    pub name: String,
    pub ready: bool,
    pub conditions: Vec<Condition>,
    pub test_hooks: Vec<TestHook>,
    pub deployments: Vec<WorkloadStatus>,
    pub daemon_sets: Vec<WorkloadStatus>,
    pub history: Vec<HistoryEntry>,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<CheckError>,
}

impl ReleaseResult {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ready: false,
            conditions: Vec::new(),
            test_hooks: Vec::new(),
            deployments: Vec::new(),
            daemon_sets: Vec::new(),
            history: Vec::new(),
            error: None,
        }
    }

    /// Ready and error-free; the partition key used by the summary
    pub fn is_passing(&self) -> bool {
        self.ready && self.error.is_none()
    }

    /// Whether any owned workload is out of steady state
    pub fn has_unhealthy_workload(&self) -> bool {
        self.deployments
            .iter()
            .chain(&self.daemon_sets)
            .any(|w| !w.is_healthy())
    }

    /// Passing with every owned workload in steady state
    ///
    /// The summary partition and the process exit code key off this, so
    /// an unhealthy Deployment fails its release even when the release's
    /// own Ready condition is True.
    pub fn is_fully_healthy(&self) -> bool {
        self.is_passing() && !self.has_unhealthy_workload()
    }
}

/// Serialize the error slot as its display string for JSON output
fn serialize_error<S: Serializer>(
    error: &Option<CheckError>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}
