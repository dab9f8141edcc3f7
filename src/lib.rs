//! noderef-operator - binds Machines to the Nodes that back them
//!
//! A Machine is a declared compute request in the management cluster. At some
//! point an external provisioning pipeline brings up real infrastructure, the
//! infrastructure registers itself as a Node in the remote workload cluster,
//! and the provisioner stamps the Machine with the provider-assigned identity
//! string (`spec.providerID`). This operator closes the loop: it scans the
//! remote cluster's Node inventory for the Node reporting the same provider
//! identity and records the match as `status.nodeRef`, exactly once.
//!
//! The join key is a weak, free-form string, the remote inventory is large
//! and paginated, and the matching Node usually does not exist yet when
//! reconciliation first runs. The reconciler therefore distinguishes three
//! outcomes: terminal success (bound, or nothing to do), "no match yet"
//! (expected during node bootstrap, requeued quietly), and hard failure
//! (malformed identity or an unreachable/unreadable remote cluster).
//!
//! # Modules
//!
//! - [`crd`] - Machine and Cluster custom resource definitions
//! - [`provider_id`] - canonicalized provider identity value type
//! - [`remote`] - remote-cluster reader collaborators
//! - [`scanner`] - paginated traversal of the remote Node inventory
//! - [`resolver`] - identity matching over a scan
//! - [`controller`] - the reconciliation state machine and controller wiring
//! - [`events`] - Kubernetes Event publishing
//! - [`error`] - error types

#![deny(missing_docs)]

use std::time::Duration;

pub mod controller;
pub mod crd;
pub mod error;
pub mod events;
pub mod provider_id;
pub mod remote;
pub mod resolver;
pub mod scanner;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Policy constants
// =============================================================================

/// Requeue interval while a Machine's Node has not appeared yet.
///
/// A missing Node is the expected steady state while infrastructure boots,
/// so this is deliberately short-ish but not aggressive. It is a
/// recommendation returned to the controller runtime, never a sleep.
pub const NODE_NOT_FOUND_REQUEUE: Duration = Duration::from_secs(20);

/// Default number of Nodes fetched per inventory page.
///
/// Bounds memory to one page regardless of remote inventory size.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Controller name reported on status patches and Events
pub const CONTROLLER_NAME: &str = "noderef-operator";
