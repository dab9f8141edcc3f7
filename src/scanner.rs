//! Paginated traversal of the remote Node inventory
//!
//! The remote inventory is conceptually an unbounded, mutating set that can
//! only be read through cursor pagination. [`NodeScan`] exposes it as a
//! finite-per-call, pull-based sequence: each page request carries the
//! cursor returned by the previous page, memory is bounded to one page, and
//! the traversal is best-effort - a Node added after the scan started may be
//! missed until the next reconciliation.

use std::collections::VecDeque;

use k8s_openapi::api::core::v1::Node;

use crate::remote::NodeReader;
use crate::Error;

/// Lazy, one-page-at-a-time scan over a [`NodeReader`]
pub struct NodeScan<'a> {
    reader: &'a dyn NodeReader,
    page_size: u32,
    buffer: VecDeque<Node>,
    cursor: Option<String>,
    exhausted: bool,
}

impl<'a> NodeScan<'a> {
    /// Start a scan; no page is fetched until the first [`try_next`] call.
    ///
    /// [`try_next`]: NodeScan::try_next
    pub fn new(reader: &'a dyn NodeReader, page_size: u32) -> Self {
        Self {
            reader,
            page_size,
            buffer: VecDeque::new(),
            cursor: None,
            exhausted: false,
        }
    }

    /// Produce the next Node, fetching further pages as needed.
    ///
    /// Returns `Ok(None)` once the inventory is exhausted. A page fetch
    /// failure aborts the scan with [`Error::RemoteRead`]; the scan is not
    /// resumable afterwards.
    pub async fn try_next(&mut self) -> Result<Option<Node>, Error> {
        loop {
            if let Some(node) = self.buffer.pop_front() {
                return Ok(Some(node));
            }
            if self.exhausted {
                return Ok(None);
            }

            let page = match self
                .reader
                .list_nodes_page(self.cursor.take(), self.page_size)
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    // a failed scan must not be silently resumed mid-inventory
                    self.exhausted = true;
                    return Err(e);
                }
            };

            self.cursor = page.next_cursor;
            self.exhausted = self.cursor.is_none();
            self.buffer = page.items.into();
        }
    }
}
