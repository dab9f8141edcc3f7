//! Remote workload-cluster collaborators
//!
//! Two seams live here, both trait-based so the reconciler can be tested
//! without a live cluster:
//!
//! - [`NodeReader`] - one page of the remote Node inventory at a time,
//!   cursor-paginated. Shared read-only across concurrent reconciliations.
//! - [`ReaderProvider`] - turns a [`Cluster`] into a [`NodeReader`], in
//!   production by reading the cluster's kubeconfig Secret and building a
//!   kube client from it. Connectivity failures surface as
//!   [`Error::RemoteUnavailable`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Node, Secret};
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config, ResourceExt};
#[cfg(test)]
use mockall::automock;

use crate::crd::Cluster;
use crate::Error;

/// Connection timeout for remote cluster clients
pub const REMOTE_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Read timeout for remote cluster clients; also bounds each page fetch
pub const REMOTE_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Key inside the kubeconfig Secret holding the kubeconfig YAML
const KUBECONFIG_SECRET_KEY: &str = "value";

/// One page of the remote Node inventory
#[derive(Clone, Debug, Default)]
pub struct NodePage {
    /// Node records in this page
    pub items: Vec<Node>,
    /// Cursor for the next page; `None` ends the traversal
    pub next_cursor: Option<String>,
}

impl NodePage {
    /// Create a page, normalizing an empty cursor string to end-of-inventory
    pub fn new(items: Vec<Node>, next_cursor: Option<String>) -> Self {
        Self {
            items,
            next_cursor: next_cursor.filter(|c| !c.is_empty()),
        }
    }
}

/// Trait for paginated, read-only access to a remote cluster's Nodes
///
/// Implementations must be safe for concurrent use; reconciliations of
/// different Machines share one reader per cluster.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NodeReader: Send + Sync {
    /// Fetch one page of Nodes.
    ///
    /// `cursor` is the continue token from the previous page, or `None` for
    /// the first page. A transport or API failure maps to
    /// [`Error::RemoteRead`]; it is not retried here.
    async fn list_nodes_page(&self, cursor: Option<String>, limit: u32)
        -> Result<NodePage, Error>;
}

/// Production [`NodeReader`] over a kube client for the workload cluster
pub struct KubeNodeReader {
    client: Client,
}

impl KubeNodeReader {
    /// Wrap a client pointed at the workload cluster
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NodeReader for KubeNodeReader {
    async fn list_nodes_page(
        &self,
        cursor: Option<String>,
        limit: u32,
    ) -> Result<NodePage, Error> {
        let api: Api<Node> = Api::all(self.client.clone());
        let params = ListParams {
            limit: Some(limit),
            continue_token: cursor,
            ..Default::default()
        };

        let list = api
            .list(&params)
            .await
            .map_err(|e| Error::remote_read(format!("failed to list nodes: {}", e)))?;

        Ok(NodePage::new(list.items, list.metadata.continue_))
    }
}

/// Trait for obtaining a [`NodeReader`] for a Cluster
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReaderProvider: Send + Sync {
    /// Obtain a reader for the given cluster's Node inventory.
    ///
    /// Failures (missing kubeconfig Secret, unparsable kubeconfig, client
    /// construction) surface as [`Error::RemoteUnavailable`] and are left
    /// to the caller's backoff.
    async fn node_reader(&self, cluster: &Cluster) -> Result<Arc<dyn NodeReader>, Error>;
}

/// [`ReaderProvider`] that builds a client from the cluster's kubeconfig
/// Secret, following the `<cluster-name>-kubeconfig` convention.
pub struct KubeconfigReaderProvider {
    client: Client,
}

impl KubeconfigReaderProvider {
    /// Create a provider using the management-cluster client to read
    /// kubeconfig Secrets
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn read_kubeconfig(&self, cluster: &Cluster) -> Result<Kubeconfig, Error> {
        let cluster_name = cluster.name_any();
        let namespace = cluster.namespace().unwrap_or_else(|| "default".to_string());
        let secret_name = cluster.kubeconfig_secret_name();

        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &namespace);
        let secret = secrets
            .get_opt(&secret_name)
            .await
            .map_err(|e| {
                Error::remote_unavailable(
                    cluster_name.as_str(),
                    format!("failed to read kubeconfig secret {}: {}", secret_name, e),
                )
            })?
            .ok_or_else(|| {
                Error::remote_unavailable(
                    cluster_name.as_str(),
                    format!("kubeconfig secret {} not found", secret_name),
                )
            })?;

        let data = secret.data.unwrap_or_default();
        let raw = data.get(KUBECONFIG_SECRET_KEY).ok_or_else(|| {
            Error::remote_unavailable(
                cluster_name.as_str(),
                format!(
                    "kubeconfig secret {} has no {:?} key",
                    secret_name, KUBECONFIG_SECRET_KEY
                ),
            )
        })?;

        let yaml = std::str::from_utf8(&raw.0).map_err(|e| {
            Error::remote_unavailable(cluster_name.as_str(), format!("kubeconfig is not UTF-8: {}", e))
        })?;

        Kubeconfig::from_yaml(yaml).map_err(|e| {
            Error::remote_unavailable(cluster_name.as_str(), format!("invalid kubeconfig: {}", e))
        })
    }
}

#[async_trait]
impl ReaderProvider for KubeconfigReaderProvider {
    async fn node_reader(&self, cluster: &Cluster) -> Result<Arc<dyn NodeReader>, Error> {
        let cluster_name = cluster.name_any();
        let kubeconfig = self.read_kubeconfig(cluster).await?;

        let mut config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| {
                Error::remote_unavailable(cluster_name.as_str(), format!("failed to load kubeconfig: {}", e))
            })?;
        config.connect_timeout = Some(REMOTE_CONNECT_TIMEOUT);
        config.read_timeout = Some(REMOTE_READ_TIMEOUT);

        let client = Client::try_from(config).map_err(|e| {
            Error::remote_unavailable(cluster_name.as_str(), format!("failed to create client: {}", e))
        })?;

        Ok(Arc::new(KubeNodeReader::new(client)))
    }
}
