//! Cluster Custom Resource Definition
//!
//! A Cluster names a remote workload cluster and carries what the operator
//! needs to obtain a reader for its Node inventory: the kubeconfig Secret
//! written by the provisioning pipeline. Everything else about the workload
//! cluster is opaque to this operator.

use kube::CustomResource;
use kube::ResourceExt;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Specification for a Cluster
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "machines.dev",
    version = "v1alpha1",
    kind = "Cluster",
    plural = "clusters",
    shortname = "cl",
    status = "ClusterStatus",
    namespaced,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    /// Name of the Secret (same namespace) holding the workload cluster's
    /// kubeconfig under the `value` key. Defaults to `<name>-kubeconfig`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kubeconfig_secret_name: Option<String>,
}

/// Observed state of a Cluster
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterStatus {
    /// Human-readable message about the last reader acquisition failure,
    /// if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Cluster {
    /// Name of the kubeconfig Secret for this cluster
    pub fn kubeconfig_secret_name(&self) -> String {
        self.spec
            .kubeconfig_secret_name
            .clone()
            .unwrap_or_else(|| format!("{}-kubeconfig", self.name_any()))
    }
}
