//! Consistent hashing ring for deterministic chunk placement.
//!
//! This crate implements a consistent hash ring that maps keys (chunk
//! digests, CIDs) to node addresses. Each node sits at one position on a u64
//! ring, `blake3(address)` truncated to 8 bytes. A key is routed by walking
//! clockwise from its own position, so adding or removing a node only moves
//! the keys adjacent to it.
//!
//! [`Ring`] is the plain routing table; [`SharedRing`] is the lock-guarded
//! handle placement callers share.

mod ring;
mod shared;

pub use ring::{Migration, Ring, hash_position};
pub use shared::SharedRing;
