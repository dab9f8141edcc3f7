//! Machine Custom Resource Definition
//!
//! A Machine is a declared compute request in the management cluster. An
//! external provisioning pipeline creates the backing infrastructure and
//! stamps the Machine with its provider-assigned identity; this operator
//! then binds the Machine to the matching Node in the workload cluster.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::NodeRef;

/// Specification for a Machine
#[derive(CustomResource, Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "machines.dev",
    version = "v1alpha1",
    kind = "Machine",
    plural = "machines",
    shortname = "ma",
    status = "MachineStatus",
    namespaced,
    printcolumn = r#"{"name":"Cluster","type":"string","jsonPath":".spec.clusterName"}"#,
    printcolumn = r#"{"name":"ProviderID","type":"string","jsonPath":".spec.providerID"}"#,
    printcolumn = r#"{"name":"Node","type":"string","jsonPath":".status.nodeRef.name"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct MachineSpec {
    /// Name of the Cluster (same namespace) whose workload inventory backs
    /// this Machine
    pub cluster_name: String,

    /// Provider-assigned identity of the backing infrastructure, set by the
    /// provisioning pipeline once the compute resource exists. The operator
    /// only ever reads this field.
    #[serde(
        rename = "providerID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub provider_id: Option<String>,
}

impl MachineSpec {
    /// Validate the machine specification
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.cluster_name.is_empty() {
            return Err(crate::Error::validation(
                "spec.clusterName must not be empty",
            ));
        }
        Ok(())
    }
}

/// Observed state of a Machine
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MachineStatus {
    /// Reference to the Node backing this Machine.
    ///
    /// Set exactly once, when the identity match is found; never updated or
    /// cleared afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_ref: Option<NodeRef>,
}

impl Machine {
    /// The declared provider ID, treating an empty string the same as unset
    pub fn provider_id(&self) -> Option<&str> {
        self.spec
            .provider_id
            .as_deref()
            .filter(|id| !id.is_empty())
    }

    /// Whether deletion has been requested for this Machine
    pub fn is_deleting(&self) -> bool {
        self.metadata.deletion_timestamp.is_some()
    }

    /// Whether the Machine already has a Node bound to it
    pub fn is_bound(&self) -> bool {
        self.status
            .as_ref()
            .map(|s| s.node_ref.is_some())
            .unwrap_or(false)
    }
}
