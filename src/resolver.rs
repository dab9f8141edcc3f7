//! Identity matching over the remote Node inventory
//!
//! Consumes a [`NodeScan`] and returns the first Node whose parsed provider
//! identity equals the target. No ordering is assumed over the remote
//! collection; if the remote system ever reports duplicate identities the
//! first one encountered wins - that is a remote data-integrity problem this
//! operator has no authority to resolve.

use tracing::{debug, warn};

use crate::crd::NodeRef;
use crate::provider_id::ProviderId;
use crate::remote::NodeReader;
use crate::scanner::NodeScan;
use crate::Error;

/// Find the Node whose provider identity equals `target`.
///
/// Returns `Ok(Some(ref))` on a match, `Ok(None)` when the inventory holds
/// no matching Node (legitimately absent - the Node has likely not
/// registered yet), and `Err` when presence could not be determined because
/// a page fetch failed.
///
/// Nodes with a missing or unparsable provider ID are skipped with a local
/// diagnostic; one bad inventory entry must not block matching against the
/// rest. The scan short-circuits on the first match, so pages past the hit
/// are never fetched.
pub async fn resolve_node_ref(
    reader: &dyn NodeReader,
    target: &ProviderId,
    page_size: u32,
) -> Result<Option<NodeRef>, Error> {
    let mut scan = NodeScan::new(reader, page_size);

    while let Some(node) = scan.try_next().await? {
        let node_name = node.metadata.name.as_deref().unwrap_or("<unnamed>");

        let raw = match node.spec.as_ref().and_then(|s| s.provider_id.as_deref()) {
            Some(id) => id,
            None => {
                // normal while a node is still bootstrapping
                debug!(node = %node_name, "node has no provider ID yet, skipping");
                continue;
            }
        };

        let node_id = match ProviderId::parse(raw) {
            Ok(id) => id,
            Err(e) => {
                warn!(node = %node_name, provider_id = %raw, error = %e,
                      "failed to parse node provider ID, skipping");
                continue;
            }
        };

        if node_id == *target {
            match NodeRef::from_node(&node) {
                Some(node_ref) => return Ok(Some(node_ref)),
                None => {
                    warn!(node = %node_name,
                          "matching node has no name/uid, cannot reference it");
                    continue;
                }
            }
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{MockNodeReader, NodePage};
    use k8s_openapi::api::core::v1::{Node, NodeSpec};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn node(name: &str, provider_id: Option<&str>) -> Node {
        Node {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                uid: Some(format!("uid-{name}")),
                ..Default::default()
            },
            spec: Some(NodeSpec {
                provider_id: provider_id.map(String::from),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn target() -> ProviderId {
        ProviderId::parse("docker://m1").unwrap()
    }

    #[tokio::test]
    async fn finds_a_match_on_a_later_page() {
        let mut reader = MockNodeReader::new();
        reader
            .expect_list_nodes_page()
            .times(2)
            .returning(|cursor, _| match cursor.as_deref() {
                None => Ok(NodePage::new(
                    vec![node("w0", Some("docker://other"))],
                    Some("t1".to_string()),
                )),
                Some("t1") => Ok(NodePage::new(vec![node("w1", Some("docker://m1"))], None)),
                other => panic!("unexpected cursor {other:?}"),
            });

        let found = resolve_node_ref(&reader, &target(), 1)
            .await
            .expect("resolve should succeed")
            .expect("should find a match");
        assert_eq!(found.name, "w1");
        assert_eq!(found.uid, "uid-w1");
        assert_eq!(found.kind, "Node");
        assert_eq!(found.api_version, "v1");
    }

    #[tokio::test]
    async fn short_circuits_after_the_first_match() {
        let mut reader = MockNodeReader::new();
        // match is on the first page; the second page must never be fetched
        reader.expect_list_nodes_page().times(1).returning(|_, _| {
            Ok(NodePage::new(
                vec![node("w0", Some("docker://m1"))],
                Some("t1".to_string()),
            ))
        });

        let found = resolve_node_ref(&reader, &target(), 1).await.unwrap();
        assert_eq!(found.unwrap().name, "w0");
    }

    #[tokio::test]
    async fn absent_identity_is_not_an_error() {
        let mut reader = MockNodeReader::new();
        reader.expect_list_nodes_page().times(1).returning(|_, _| {
            Ok(NodePage::new(
                vec![
                    node("w0", Some("docker://other")),
                    node("w1", Some("aws://m1")),
                ],
                None,
            ))
        });

        let found = resolve_node_ref(&reader, &target(), 100).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn malformed_and_missing_identities_are_skipped() {
        let mut reader = MockNodeReader::new();
        reader.expect_list_nodes_page().times(1).returning(|_, _| {
            Ok(NodePage::new(
                vec![
                    node("bootstrapping", None),
                    node("garbled", Some("not-a-provider-id")),
                    node("w2", Some("docker://m1")),
                ],
                None,
            ))
        });

        let found = resolve_node_ref(&reader, &target(), 100).await.unwrap();
        assert_eq!(found.unwrap().name, "w2");
    }

    #[tokio::test]
    async fn identity_comparison_is_exact() {
        let mut reader = MockNodeReader::new();
        reader.expect_list_nodes_page().times(1).returning(|_, _| {
            Ok(NodePage::new(
                vec![
                    node("wrong-scheme", Some("aws://m1")),
                    node("wrong-case", Some("docker://M1")),
                ],
                None,
            ))
        });

        let found = resolve_node_ref(&reader, &target(), 100).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn page_failure_propagates_as_remote_read() {
        let mut reader = MockNodeReader::new();
        reader
            .expect_list_nodes_page()
            .times(1)
            .returning(|_, _| Err(Error::remote_read("boom")));

        let err = resolve_node_ref(&reader, &target(), 100)
            .await
            .expect_err("resolve should fail");
        assert!(matches!(err, Error::RemoteRead { .. }));
    }
}
