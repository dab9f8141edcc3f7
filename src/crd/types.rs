//! Supporting types shared by the Machine and Cluster CRDs

use k8s_openapi::api::core::v1::Node;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reference to the Node backing a Machine.
///
/// This is the durable record of a successful identity match. Once written
/// to `Machine.status.nodeRef` it is never changed or cleared by the
/// operator.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NodeRef {
    /// Kind of the referent (always "Node")
    pub kind: String,

    /// API version of the referent (always "v1")
    pub api_version: String,

    /// Name of the Node in the workload cluster
    pub name: String,

    /// UID of the Node at the time the match was made
    pub uid: String,
}

impl NodeRef {
    /// Build a reference from a Node record in a list response.
    ///
    /// Typed list responses do not carry per-item TypeMeta, so kind and
    /// apiVersion are fixed. Returns `None` if the record is missing a name
    /// or UID - such an entry cannot be referenced durably.
    pub fn from_node(node: &Node) -> Option<Self> {
        let name = node.metadata.name.clone()?;
        let uid = node.metadata.uid.clone()?;
        Some(Self {
            kind: "Node".to_string(),
            api_version: "v1".to_string(),
            name,
            uid,
        })
    }
}
