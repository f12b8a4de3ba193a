//! fluxcheck - CLI health checker for FluxCD HelmReleases
//!
//! Queries HelmRelease resources in a namespace, cross-references the
//! Deployments and DaemonSets they own, and reports readiness. The
//! process exits non-zero when any release is unready, errored, or owns
//! an unhealthy workload.

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;

use fluxcheck::checker::ReleaseChecker;
use fluxcheck::cli::{Args, OutputFormat, logging};
use fluxcheck::kube::{create_client, resolve_namespace, resolve_release_filter};
use fluxcheck::models::ReleaseResult;
use fluxcheck::report::ReportFormatter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging(args.debug);

    let namespace = resolve_namespace(args.namespace.clone());
    let release = resolve_release_filter(args.release.clone());

    tracing::debug!("connecting to cluster");
    let client = create_client()
        .await
        .context("failed to create Kubernetes client")?;

    let checker = ReleaseChecker::new(client, namespace.clone())
        .with_policy(args.workload_errors)
        .with_concurrency(args.concurrency);

    // One upfront deadline bounds the whole batch; on expiry in-flight
    // calls are dropped rather than left hanging.
    let deadline = Duration::from_secs(args.timeout_secs);
    let results = tokio::time::timeout(deadline, checker.check_all(release.as_deref()))
        .await
        .with_context(|| format!("check did not finish within {}s", args.timeout_secs))?
        .context("failed to list HelmReleases")?;

    if results.is_empty() {
        println!("No HelmReleases found in namespace '{}'", namespace);
        return Ok(());
    }

    render(&args, &namespace, &results)?;

    let failed = results.iter().any(|r| !r.is_fully_healthy());
    if failed {
        std::process::exit(1);
    }
    Ok(())
}

/// Print the batch in the selected output format
fn render(args: &Args, namespace: &str, results: &[ReleaseResult]) -> Result<()> {
    match args.output {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(results).context("failed to serialize results")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            let formatter = ReportFormatter::new(args.verbose);
            println!(
                "\n🔍 Checking {} HelmRelease(s) in namespace '{}'",
                results.len(),
                namespace
            );
            for result in results {
                print!("{}", formatter.format_result(result));
            }
            print!("{}", formatter.format_summary(results));
        }
    }
    Ok(())
}
