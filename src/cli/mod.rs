//! Command-line interface

pub mod logging;

use clap::Parser;

use crate::checker::WorkloadErrorPolicy;

/// fluxcheck - health checker for FluxCD HelmReleases and their workloads
#[derive(Parser, Debug)]
#[command(name = "fluxcheck")]
#[command(about = "Check FluxCD HelmRelease readiness and owned workload health", long_about = None)]
pub struct Args {
    /// Namespace to check (falls back to NAMESPACE env, then uk8s-core)
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// Check a single HelmRelease (falls back to HELM_RELEASE_NAME env)
    #[arg(long, short = 'r')]
    pub release: Option<String>,

    /// Render condition/hook messages and recent history
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Overall deadline for the whole batch, in seconds
    #[arg(long, default_value_t = 300)]
    pub timeout_secs: u64,

    /// Number of releases checked in parallel
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,

    /// What to do when listing Deployments/DaemonSets fails
    #[arg(long, value_enum, default_value = "ignore")]
    pub workload_errors: WorkloadErrorPolicy,

    /// Enable debug logging
    #[arg(long, short = 'd')]
    pub debug: bool,
}

/// Output rendering modes
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable report with a summary
    #[default]
    Text,
    /// Machine-readable JSON batch
    Json,
}
