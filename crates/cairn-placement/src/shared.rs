//! Shared ring handle for concurrent placement lookups.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::ring::{Migration, Ring};

/// A cloneable handle to one ring shared by every placement caller.
///
/// Lookups take the read lock and may run concurrently. Membership changes
/// take the write lock, so a lookup sees the ring either before or after a
/// change, never halfway through one.
#[derive(Debug, Clone, Default)]
pub struct SharedRing {
    inner: Arc<RwLock<Ring>>,
}

impl SharedRing {
    /// Create a handle to a new empty ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing ring.
    pub fn from_ring(ring: Ring) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ring)),
        }
    }

    /// Build a ring holding every address in `addresses`.
    pub fn with_nodes<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ring = Ring::new();
        for address in addresses {
            ring.add_node(address);
        }
        Self::from_ring(ring)
    }

    /// Add a node. See [`Ring::add_node`].
    pub fn add_node(&self, address: impl Into<String>) {
        self.inner.write().add_node(address);
    }

    /// Remove a node. See [`Ring::remove_node`].
    pub fn remove_node(&self, address: &str) -> bool {
        self.inner.write().remove_node(address)
    }

    /// The node that owns `key`, or `None` if the ring is empty.
    pub fn node_for_key(&self, key: &str) -> Option<String> {
        self.inner.read().node_for_key(key).map(str::to_string)
    }

    /// Up to `replicas` distinct owners of `key`. See [`Ring::nodes_for_key`].
    pub fn nodes_for_key(&self, key: &str, replicas: usize) -> Vec<String> {
        self.inner.read().nodes_for_key(key, replicas)
    }

    /// All node addresses in ring order.
    pub fn all_nodes(&self) -> Vec<String> {
        self.inner.read().all_nodes()
    }

    /// Whether `address` is a member.
    pub fn has_node(&self, address: &str) -> bool {
        self.inner.read().has_node(address)
    }

    /// Number of nodes in the ring.
    pub fn node_count(&self) -> usize {
        self.inner.read().node_count()
    }

    /// A point-in-time copy of the ring.
    pub fn snapshot(&self) -> Ring {
        self.inner.read().clone()
    }

    /// Apply a batch of membership changes atomically.
    ///
    /// `change` runs under the write lock. Returns the migrations the change
    /// causes for `keys` at `replicas` copies each.
    pub fn rebalance<K, F>(&self, keys: &[K], replicas: usize, change: F) -> Vec<Migration>
    where
        K: AsRef<str>,
        F: FnOnce(&mut Ring),
    {
        let mut ring = self.inner.write();
        let before = ring.clone();
        change(&mut *ring);
        let migrations = Ring::diff(&before, &ring, keys, replicas);
        info!(
            nodes_before = before.node_count(),
            nodes_after = ring.node_count(),
            migrations = migrations.len(),
            "ring membership changed"
        );
        migrations
    }
}
