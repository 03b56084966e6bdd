//! Shared types and identifiers for Cairn.
//!
//! This crate defines the core types used across the Cairn workspace:
//! the content digest function ([`digest`], [`digest_hex`]),
//! identifiers ([`ChunkDigest`], [`Cid`]),
//! data structures ([`Chunk`], [`FileManifest`]),
//! and the node roster entry ([`NodeInfo`]).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

/// Default chunk boundary: 1 MiB.
pub const DEFAULT_CHUNK_SIZE: u32 = 1_048_576;

/// Current manifest format version.
pub const MANIFEST_VERSION: u8 = 1;

/// Length of a hex-encoded digest.
pub const DIGEST_HEX_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Digest function
// ---------------------------------------------------------------------------

/// SHA-256 of `data`.
pub fn digest(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// SHA-256 of `data` as 64 lowercase hex characters, most-significant byte first.
pub fn digest_hex(data: &[u8]) -> String {
    hex::encode(digest(data))
}

/// Error returned when parsing a digest from its hex form.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseDigestError {
    /// The string is not exactly 64 characters long.
    #[error("digest must be {DIGEST_HEX_LEN} hex characters, got {0}")]
    Length(usize),

    /// The string contains a non-hex character.
    #[error("invalid hex digest: {0}")]
    Hex(#[from] hex::FromHexError),
}

// ---------------------------------------------------------------------------
// ID types
// ---------------------------------------------------------------------------

macro_rules! define_digest {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        pub struct $name([u8; 32]);

        impl $name {
            /// Create an ID by hashing arbitrary data with SHA-256.
            pub fn from_data(data: &[u8]) -> Self {
                Self(digest(data))
            }

            /// Return the raw 32-byte representation.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Lowercase hex encoding, identical to the `Display` output.
            pub fn to_hex(&self) -> String {
                hex::encode(self.0)
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = ParseDigestError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if s.len() != DIGEST_HEX_LEN {
                    return Err(ParseDigestError::Length(s.len()));
                }
                let mut bytes = [0u8; 32];
                hex::decode_to_slice(s, &mut bytes)?;
                Ok(Self(bytes))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                for byte in &self.0 {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self)
            }
        }
    };
}

define_digest!(
    /// Content-addressed identifier for a chunk: `sha256(chunk_data)`.
    ChunkDigest
);

define_digest!(
    /// Root content identifier of a file: `sha256(hex(d0) ++ hex(d1) ++ ...)`
    /// over its ordered chunk digests.
    Cid
);

impl Cid {
    /// Root identifier committing to an ordered list of chunk digests.
    ///
    /// The hex strings are concatenated textually and the resulting buffer
    /// is digested. An empty list yields the digest of the empty string.
    pub fn from_chunk_digests(digests: &[ChunkDigest]) -> Self {
        let mut hasher = Sha256::new();
        for d in digests {
            hasher.update(d.to_hex().as_bytes());
        }
        Self(hasher.finalize().into())
    }
}

// ---------------------------------------------------------------------------
// Core data structures
// ---------------------------------------------------------------------------

/// A contiguous slice of a file, optionally content-addressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Zero-based position of this chunk within its source file.
    pub index: u64,
    /// `sha256(data)`, or `None` until the chunk has been hashed.
    pub digest: Option<ChunkDigest>,
    /// The raw chunk bytes.
    pub data: Vec<u8>,
}

impl Chunk {
    /// Create an undigested chunk.
    pub fn new(index: u64, data: Vec<u8>) -> Self {
        Self {
            index,
            digest: None,
            data,
        }
    }

    /// Payload length in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Metadata describing how a file was chunked, and its ordered chunk digests.
///
/// `root` depends only on `chunk_digests` and their order, never on the
/// filename or on which nodes hold the chunks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileManifest {
    /// Manifest format version.
    pub version: u8,
    /// Original file name (informational only).
    pub filename: String,
    /// Root content identifier.
    pub root: Cid,
    /// Total size of the original file in bytes.
    pub file_size: u64,
    /// Chunk boundary used when splitting (last chunk may be smaller).
    pub chunk_size: u32,
    /// Number of chunks; equals `chunk_digests.len()`.
    pub total_chunks: u64,
    /// Chunk digests in file order.
    pub chunk_digests: Vec<ChunkDigest>,
}

impl FileManifest {
    /// Whether this manifest describes a zero-length file.
    pub fn is_empty(&self) -> bool {
        self.total_chunks == 0
    }
}

// ---------------------------------------------------------------------------
// Node roster
// ---------------------------------------------------------------------------

/// One entry of the static node roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Human-readable node identifier, e.g. `"node0"`.
    pub id: String,
    /// Hostname or IP address.
    pub host: String,
    /// TCP port.
    pub port: u16,
}

impl NodeInfo {
    /// The `host:port` address used as this node's ring identity.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
