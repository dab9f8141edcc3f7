//! Error types for the noderef operator
//!
//! The taxonomy deliberately separates "the identity string is broken"
//! (permanent until the spec changes) from "the remote cluster could not be
//! reached or read" (transient, retried by the controller runtime with its
//! own backoff). "Node not found yet" is not an error at all - see
//! [`crate::controller::NodeRefOutcome`].

use thiserror::Error;

/// Main error type for noderef operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Management-cluster Kubernetes API error
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// A provider identity string failed structural parsing.
    ///
    /// Permanent: retrying without a spec change cannot succeed.
    #[error("invalid provider ID: {message}")]
    InvalidProviderId {
        /// Description of what's structurally wrong with the string
        message: String,
    },

    /// A reader for the remote workload cluster could not be obtained
    #[error("remote cluster {cluster} unavailable: {message}")]
    RemoteUnavailable {
        /// Name of the cluster we failed to reach
        cluster: String,
        /// Description of the connectivity failure
        message: String,
    },

    /// A page fetch against the remote Node inventory failed mid-scan
    #[error("remote inventory read failed: {message}")]
    RemoteRead {
        /// Description of the read failure
        message: String,
    },

    /// Validation error for CRD specs
    #[error("validation error: {0}")]
    Validation(String),
}

impl Error {
    /// Create an invalid-provider-ID error with the given message
    pub fn invalid_provider_id(msg: impl Into<String>) -> Self {
        Self::InvalidProviderId {
            message: msg.into(),
        }
    }

    /// Create a remote-unavailable error for the given cluster
    pub fn remote_unavailable(cluster: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            cluster: cluster.into(),
            message: msg.into(),
        }
    }

    /// Create a remote-read error with the given message
    pub fn remote_read(msg: impl Into<String>) -> Self {
        Self::RemoteRead {
            message: msg.into(),
        }
    }

    /// Create a validation error with the given message
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether retrying without any spec change could plausibly succeed.
    ///
    /// Used by the error policy to decide between backing off and parking
    /// the Machine until its spec changes.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::InvalidProviderId { .. } => false,
            Error::Validation(_) => false,
            Error::Kube(_) | Error::RemoteUnavailable { .. } | Error::RemoteRead { .. } => true,
        }
    }
}
