//! Machine controller implementation
//!
//! Implements the node reference reconciliation state machine: guard checks
//! first (deleting, already bound, nothing declared yet), then a paginated
//! scan of the remote inventory for the Node whose provider identity equals
//! the Machine's, then a single monotonic status patch recording the match.
//!
//! The engine never sleeps and never retries internally. Every temporal
//! decision is returned to the controller runtime as an [`Action`]: "no
//! match yet" is a quiet requeue, hard failures go through [`error_policy`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kube::api::{Api, Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::runtime::events::EventType;
use kube::{Client, Resource, ResourceExt};
use tracing::{debug, info, instrument, warn};

#[cfg(test)]
use mockall::automock;

use crate::crd::{Cluster, Machine, MachineStatus, NodeRef};
use crate::events::{actions, reasons, EventPublisher, KubeEventPublisher};
use crate::provider_id::ProviderId;
use crate::remote::{KubeconfigReaderProvider, ReaderProvider};
use crate::resolver::resolve_node_ref;
use crate::{Error, CONTROLLER_NAME, DEFAULT_PAGE_SIZE, NODE_NOT_FOUND_REQUEUE};

/// Requeue delay after a transient reconciliation failure
const TRANSIENT_FAILURE_REQUEUE: Duration = Duration::from_secs(5);

/// Trait abstracting management-cluster operations for Machines
///
/// This trait allows mocking the Kubernetes client in tests while using
/// the real client in production.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait KubeClient: Send + Sync {
    /// Get a Cluster by namespace and name, `None` if it does not exist
    async fn get_cluster(&self, namespace: &str, name: &str) -> Result<Option<Cluster>, Error>;

    /// Patch the status subresource of a Machine
    async fn patch_machine_status(
        &self,
        namespace: &str,
        name: &str,
        status: &MachineStatus,
    ) -> Result<(), Error>;
}

/// Real Kubernetes client implementation
pub struct KubeClientImpl {
    client: Client,
}

impl KubeClientImpl {
    /// Create a new KubeClientImpl wrapping the given kube Client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl KubeClient for KubeClientImpl {
    async fn get_cluster(&self, namespace: &str, name: &str) -> Result<Option<Cluster>, Error> {
        let api: Api<Cluster> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get_opt(name).await?)
    }

    async fn patch_machine_status(
        &self,
        namespace: &str,
        name: &str,
        status: &MachineStatus,
    ) -> Result<(), Error> {
        let api: Api<Machine> = Api::namespaced(self.client.clone(), namespace);

        let status_patch = serde_json::json!({
            "status": status
        });

        api.patch_status(
            name,
            &PatchParams::apply(CONTROLLER_NAME),
            &Patch::Merge(&status_patch),
        )
        .await?;

        Ok(())
    }
}

/// Shared state for the Machine controller
pub struct Context {
    /// Management-cluster operations
    pub kube: Arc<dyn KubeClient>,
    /// Remote reader acquisition
    pub readers: Arc<dyn ReaderProvider>,
    /// Kubernetes Event publishing (fire-and-forget)
    pub events: Arc<dyn EventPublisher>,
    /// Inventory page size
    pub page_size: u32,
}

impl Context {
    /// Create a production context from a management-cluster client
    pub fn new(client: Client, page_size: u32) -> Self {
        Self {
            kube: Arc::new(KubeClientImpl::new(client.clone())),
            readers: Arc::new(KubeconfigReaderProvider::new(client.clone())),
            events: Arc::new(KubeEventPublisher::new(client, CONTROLLER_NAME)),
            page_size,
        }
    }

    /// Create a context with injected collaborators (for tests)
    pub fn for_testing(
        kube: Arc<dyn KubeClient>,
        readers: Arc<dyn ReaderProvider>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            kube,
            readers,
            events,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Outcome of one node reference reconciliation.
///
/// "No match yet" is modeled as [`NodeRefOutcome::Waiting`], a first-class
/// outcome rather than an error variant, so that waiting for infrastructure
/// is never logged or reported as a failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeRefOutcome {
    /// Nothing to do: deleting, already bound, or no provider ID declared yet
    Idle,
    /// No matching Node in the inventory yet; retry after
    /// [`NODE_NOT_FOUND_REQUEUE`]
    Waiting,
    /// A matching Node was found and the binding was recorded
    Bound(NodeRef),
}

/// Run the node reference state machine for one Machine.
///
/// Guards are evaluated in order and the first match short-circuits:
/// deletion requested, already bound, and no declared provider ID are all
/// terminal no-ops. A Machine that passes the guards gets its provider ID
/// parsed (permanent failure if malformed), a reader for its Cluster's
/// inventory (transient failure if unavailable), and a resolver pass over
/// the inventory.
///
/// Idempotent by construction: once `status.nodeRef` is set, re-invocation
/// returns [`NodeRefOutcome::Idle`] without touching the remote cluster.
pub async fn reconcile_node_ref(machine: &Machine, ctx: &Context) -> Result<NodeRefOutcome, Error> {
    let name = machine.name_any();
    let namespace = machine.namespace().unwrap_or_else(|| "default".to_string());

    if machine.is_deleting() {
        debug!("machine is being deleted, nothing to do");
        return Ok(NodeRefOutcome::Idle);
    }

    if machine.is_bound() {
        debug!("machine already has a node reference");
        return Ok(NodeRefOutcome::Idle);
    }

    let raw_id = match machine.provider_id() {
        Some(id) => id,
        None => {
            info!("machine doesn't have a provider ID yet");
            return Ok(NodeRefOutcome::Idle);
        }
    };

    let target = ProviderId::parse(raw_id)?;

    machine.spec.validate()?;

    let cluster_name = &machine.spec.cluster_name;
    let cluster = ctx
        .kube
        .get_cluster(&namespace, cluster_name)
        .await?
        .ok_or_else(|| Error::remote_unavailable(cluster_name.as_str(), "cluster not found"))?;

    let reader = ctx.readers.node_reader(&cluster).await?;

    match resolve_node_ref(reader.as_ref(), &target, ctx.page_size).await {
        Ok(Some(node_ref)) => {
            let status = MachineStatus {
                node_ref: Some(node_ref.clone()),
            };
            ctx.kube
                .patch_machine_status(&namespace, &name, &status)
                .await?;

            info!(node = %node_ref.name, "set machine's node reference");
            ctx.events
                .publish(
                    &machine.object_ref(&()),
                    EventType::Normal,
                    reasons::SUCCESSFUL_SET_NODE_REF,
                    actions::SET_NODE_REF,
                    Some(node_ref.name.clone()),
                )
                .await;
            Ok(NodeRefOutcome::Bound(node_ref))
        }
        Ok(None) => {
            // expected steady state while the node boots; no event, no error
            debug!(provider_id = %target, "no node with matching provider ID yet");
            Ok(NodeRefOutcome::Waiting)
        }
        Err(e) => {
            warn!(error = %e, "failed to set node reference");
            ctx.events
                .publish(
                    &machine.object_ref(&()),
                    EventType::Warning,
                    reasons::FAILED_SET_NODE_REF,
                    actions::SET_NODE_REF,
                    Some(e.to_string()),
                )
                .await;
            Err(e)
        }
    }
}

/// Reconcile a Machine resource
///
/// Entry point for `kube::runtime::Controller`. Maps the engine outcome to
/// a scheduling [`Action`]: terminal outcomes await the next spec/status
/// change, "no match yet" requeues after [`NODE_NOT_FOUND_REQUEUE`].
#[instrument(skip(machine, ctx), fields(machine = %machine.name_any()))]
pub async fn reconcile(machine: Arc<Machine>, ctx: Arc<Context>) -> Result<Action, Error> {
    info!("reconciling machine");

    match reconcile_node_ref(&machine, &ctx).await? {
        NodeRefOutcome::Idle => Ok(Action::await_change()),
        NodeRefOutcome::Bound(_) => Ok(Action::await_change()),
        NodeRefOutcome::Waiting => Ok(Action::requeue(NODE_NOT_FOUND_REQUEUE)),
    }
}

/// Error policy for the controller
///
/// Transient failures (remote unreachable, read failures, API errors) back
/// off and retry; permanent ones (malformed provider ID) park the Machine
/// until its spec changes.
pub fn error_policy(machine: Arc<Machine>, error: &Error, _ctx: Arc<Context>) -> Action {
    warn!(
        machine = %machine.name_any(),
        error = %error,
        "reconciliation failed"
    );

    if error.is_transient() {
        Action::requeue(TRANSIENT_FAILURE_REQUEUE)
    } else {
        Action::await_change()
    }
}
