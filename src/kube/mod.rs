//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server and resolves the
//! HelmRelease dynamic resource coordinates and runtime configuration
//! (namespace, release filter) from flags and environment variables.

use anyhow::Result;
use kube::api::ApiResource;
use kube::core::GroupVersionKind;
use kube::{Client, Config};

/// API group of the FluxCD HelmRelease custom resource
pub const HELM_RELEASE_GROUP: &str = "helm.toolkit.fluxcd.io";
/// API version the checker targets
pub const HELM_RELEASE_VERSION: &str = "v2beta1";
/// Plural resource name used for API paths
pub const HELM_RELEASE_PLURAL: &str = "helmreleases";

/// Namespace checked when neither `--namespace` nor `NAMESPACE` is set
pub const DEFAULT_NAMESPACE: &str = "uk8s-core";

/// Initialize and return a Kubernetes client
///
/// Uses the default kubeconfig loading strategy:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client() -> Result<Client> {
    let config = Config::infer().await?;
    let client = Client::try_from(config)?;
    Ok(client)
}

/// ApiResource handle for HelmRelease
///
/// The resource is addressed dynamically so the crate does not carry
/// generated helm-controller CRD types; status extraction works on the
/// JSON document instead.
pub fn helmrelease_resource() -> ApiResource {
    ApiResource::from_gvk_with_plural(
        &GroupVersionKind::gvk(HELM_RELEASE_GROUP, HELM_RELEASE_VERSION, "HelmRelease"),
        HELM_RELEASE_PLURAL,
    )
}

/// Resolve the namespace to check
///
/// Precedence: explicit flag, then the NAMESPACE environment variable,
/// then [`DEFAULT_NAMESPACE`].
pub fn resolve_namespace(flag: Option<String>) -> String {
    if let Some(ns) = flag {
        return ns;
    }
    match std::env::var("NAMESPACE") {
        Ok(ns) if !ns.is_empty() => ns,
        _ => DEFAULT_NAMESPACE.to_string(),
    }
}

/// Resolve the optional single-release filter
///
/// Precedence: explicit flag, then the HELM_RELEASE_NAME environment
/// variable. `None` means every release in the namespace is checked.
pub fn resolve_release_filter(flag: Option<String>) -> Option<String> {
    flag.or_else(|| {
        std::env::var("HELM_RELEASE_NAME")
            .ok()
            .filter(|name| !name.is_empty())
    })
}
