//! fluxcheck library
//!
//! Core functionality for the fluxcheck CLI: status extraction from
//! HelmRelease documents, workload collection, and report rendering.
//! Exposed as a library so the integration tests can exercise everything
//! below the cluster boundary.

pub mod checker;
pub mod cli;
pub mod kube;
pub mod models;
pub mod report;

// Re-export commonly used types for convenience
pub use checker::{
    ReleaseChecker, ReleaseSource, ReleaseStatus, WorkloadErrorPolicy, WorkloadLister,
    collect_workloads, extract_history, extract_status, selector_for,
};
pub use models::{
    CheckError, Condition, HistoryEntry, ReleaseResult, TestHook, WorkloadKind, WorkloadStatus,
};
pub use report::ReportFormatter;
