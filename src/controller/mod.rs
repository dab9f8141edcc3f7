//! Kubernetes controller for Machine resources
//!
//! This module wires the node reference reconciliation engine into
//! `kube::runtime::Controller`: the runtime provides per-key exclusivity
//! and concurrency across different Machines, the engine here stays a pure
//! function of (Machine, Cluster, remote inventory).

mod machine;

pub use machine::{
    error_policy, reconcile, reconcile_node_ref, Context, KubeClient, KubeClientImpl,
    NodeRefOutcome,
};
