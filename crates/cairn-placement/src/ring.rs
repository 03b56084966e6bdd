//! Consistent hashing ring implementation.

use std::collections::BTreeMap;

use tracing::{debug, warn};

/// A key whose owner set changed between two ring states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// The key (typically a chunk digest) that must move.
    pub key: String,
    /// A node that owned the key before the change and no longer does.
    pub from: String,
    /// A node that owns the key after the change and did not before.
    pub to: String,
}

/// Consistent hashing ring mapping keys to node addresses.
///
/// Each node address occupies one position, `hash_position(address)`.
/// A key is owned by the first node at or clockwise after the key's own
/// position, wrapping from the largest position back to the smallest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ring {
    /// Ring position -> node address.
    entries: BTreeMap<u64, String>,
}

impl Ring {
    /// Create a new empty ring.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node to the ring.
    ///
    /// Re-adding a present node is a no-op. If another address already
    /// occupies the same position it is replaced.
    pub fn add_node(&mut self, address: impl Into<String>) {
        let address = address.into();
        let pos = hash_position(&address);
        match self.entries.get(&pos) {
            Some(existing) if *existing == address => return,
            Some(existing) => warn!(
                position = pos,
                replaced = %existing,
                %address,
                "ring position collision, replacing node"
            ),
            None => debug!(position = pos, %address, "added node to ring"),
        }
        self.entries.insert(pos, address);
    }

    /// Remove a node from the ring.
    ///
    /// Returns `false` (and leaves the ring untouched) if the address is not
    /// a member, including when its position is held by a different address.
    /// An address displaced by a position collision never evicts the node
    /// that replaced it.
    pub fn remove_node(&mut self, address: &str) -> bool {
        let pos = hash_position(address);
        if self.entries.get(&pos).is_some_and(|a| a == address) {
            self.entries.remove(&pos);
            debug!(position = pos, address, "removed node from ring");
            true
        } else {
            false
        }
    }

    /// The node that owns `key`, or `None` if the ring is empty.
    pub fn node_for_key(&self, key: &str) -> Option<&str> {
        let pos = hash_position(key);
        self.entries
            .range(pos..)
            .next()
            .or_else(|| self.entries.iter().next())
            .map(|(_, address)| address.as_str())
    }

    /// Determine which nodes hold `key` with `replicas` copies.
    ///
    /// Walks clockwise from the key's position, collecting distinct node
    /// addresses in encounter order. Returns `min(replicas, node_count)`
    /// addresses; an empty ring or `replicas == 0` yields an empty vec.
    /// Each ring entry is visited at most once.
    pub fn nodes_for_key(&self, key: &str, replicas: usize) -> Vec<String> {
        let wanted = replicas.min(self.entries.len());
        if wanted == 0 {
            return Vec::new();
        }

        let pos = hash_position(key);
        let mut owners: Vec<String> = Vec::with_capacity(wanted);

        // BTreeMap::range gives us everything >= pos, then we wrap around.
        let after = self.entries.range(pos..);
        let before = self.entries.range(..pos);

        for (_, address) in after.chain(before) {
            if !owners.contains(address) {
                owners.push(address.clone());
                if owners.len() == wanted {
                    break;
                }
            }
        }

        owners
    }

    /// Compute which keys must migrate between two ring states.
    ///
    /// For each key, every node that gains ownership in `new` is paired with
    /// a node that lost ownership relative to `old`.
    pub fn diff<K: AsRef<str>>(
        old: &Ring,
        new: &Ring,
        keys: &[K],
        replicas: usize,
    ) -> Vec<Migration> {
        let mut migrations = Vec::new();

        for key in keys {
            let key = key.as_ref();
            let old_owners = old.nodes_for_key(key, replicas);
            let new_owners = new.nodes_for_key(key, replicas);

            let mut lost = old_owners.iter().filter(|o| !new_owners.contains(o));
            for gained in new_owners.iter().filter(|n| !old_owners.contains(n)) {
                if let Some(from) = lost.next() {
                    migrations.push(Migration {
                        key: key.to_string(),
                        from: from.clone(),
                        to: gained.clone(),
                    });
                }
            }
        }

        migrations
    }

    /// Whether `address` currently holds its ring position.
    pub fn has_node(&self, address: &str) -> bool {
        self.entries
            .get(&hash_position(address))
            .is_some_and(|a| a == address)
    }

    /// Return the number of nodes in the ring.
    pub fn node_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ring has no nodes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All node addresses in ascending ring position order.
    pub fn all_nodes(&self) -> Vec<String> {
        self.entries.values().cloned().collect()
    }

    /// `(position, address)` pairs in ascending position order.
    pub fn entries(&self) -> impl Iterator<Item = (u64, &str)> {
        self.entries.iter().map(|(pos, a)| (*pos, a.as_str()))
    }
}

/// Position of a key on the ring: the first 8 bytes of `blake3(key)` as a little-endian u64.
pub fn hash_position(key: &str) -> u64 {
    let hash = blake3::hash(key.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}
