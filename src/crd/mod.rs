//! Custom Resource Definitions for the noderef operator
//!
//! This module contains the Machine and Cluster CRDs plus their shared
//! supporting types.

mod cluster;
mod machine;
mod types;

pub use cluster::{Cluster, ClusterSpec, ClusterStatus};
pub use machine::{Machine, MachineSpec, MachineStatus};
pub use types::NodeRef;
