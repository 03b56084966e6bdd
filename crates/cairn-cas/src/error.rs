//! Error types for content addressing operations.

use std::path::PathBuf;

/// Errors that can occur during CAS operations.
#[derive(Debug, thiserror::Error)]
pub enum CasError {
    /// A file could not be read or written.
    #[error("io error on {}: {source}", path.display())]
    File {
        /// The file being read or written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O error occurred during streaming.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Chunk size must be at least one byte.
    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(u32),

    /// A chunk's size does not fit the boundary it is claimed to be split at.
    #[error("chunk {index} holds {size} bytes, which does not fit chunk size {chunk_size}")]
    ChunkBoundary {
        /// Index of the offending chunk.
        index: u64,
        /// Bytes the chunk holds.
        size: usize,
        /// The claimed chunk size.
        chunk_size: usize,
    },

    /// A chunk was used where a digest is required before it was hashed.
    #[error("chunk {index} has not been hashed")]
    UnhashedChunk {
        /// Index of the offending chunk.
        index: u64,
    },

    /// No chunk carries this index.
    #[error("missing chunk {index}")]
    MissingChunk {
        /// First index absent from the set.
        index: u64,
    },

    /// More than one chunk carries this index.
    #[error("duplicate chunk {index}")]
    DuplicateChunk {
        /// The repeated index.
        index: u64,
    },

    /// A chunk's index lies outside the expected range.
    #[error("unexpected chunk {index}: file has {expected} chunks")]
    UnexpectedChunk {
        /// The out-of-range index.
        index: u64,
        /// Number of chunks the file is expected to have.
        expected: u64,
    },

    /// A chunk's payload does not hash to the digest recorded for it.
    #[error("chunk {index} digest mismatch: expected {expected}, actual {actual}")]
    DigestMismatch {
        /// Index of the corrupt chunk.
        index: u64,
        /// Digest recorded in the manifest.
        expected: String,
        /// Digest of the payload actually supplied.
        actual: String,
    },

    /// Reassembled output does not have the size the manifest records.
    #[error("size mismatch: manifest says {expected} bytes, chunks hold {actual}")]
    SizeMismatch {
        /// Size recorded in the manifest.
        expected: u64,
        /// Size of the supplied payloads.
        actual: u64,
    },

    /// Manifest fields contradict each other.
    #[error("inconsistent manifest: {0}")]
    ManifestMismatch(String),

    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Manifest has an unsupported version.
    #[error("unsupported manifest version {found}, this node supports version {supported}")]
    UnsupportedVersion {
        /// Version found in the manifest.
        found: u8,
        /// Version this node supports.
        supported: u8,
    },

    /// A background hashing task panicked or was cancelled.
    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl CasError {
    /// Wrap an I/O error with the path it occurred on.
    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}
