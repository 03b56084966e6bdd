//! Manifest building, validation and serialization.
//!
//! A [`FileManifest`] records how a file was chunked and the ordered digests
//! of its chunks. It is the unit exchanged between the node that produced a
//! file and anyone reconstructing or verifying it. The binary encoding is
//! postcard.

use cairn_types::{Chunk, FileManifest, MANIFEST_VERSION};

use crate::error::CasError;
use crate::hasher::{chunk_digests, root_identifier};

/// Build a [`FileManifest`] from hashed chunks in file order.
///
/// Every chunk must already carry its digest and must have been split at
/// `chunk_size`: all chunks but the last hold exactly `chunk_size` bytes and
/// the last holds between 1 and `chunk_size`. The root identifier is derived
/// from the digests alone, so `filename` never influences it.
pub fn build_manifest(
    filename: impl Into<String>,
    chunks: &[Chunk],
    chunk_size: u32,
) -> Result<FileManifest, CasError> {
    if chunk_size == 0 {
        return Err(CasError::InvalidChunkSize(chunk_size));
    }
    check_boundaries(chunks, chunk_size)?;
    let digests = chunk_digests(chunks)?;
    let file_size = chunks.iter().map(|c| c.size() as u64).sum();

    Ok(FileManifest {
        version: MANIFEST_VERSION,
        filename: filename.into(),
        root: root_identifier(&digests),
        file_size,
        chunk_size,
        total_chunks: digests.len() as u64,
        chunk_digests: digests,
    })
}

fn check_boundaries(chunks: &[Chunk], chunk_size: u32) -> Result<(), CasError> {
    let chunk_size = chunk_size as usize;
    let last = chunks.len().saturating_sub(1);
    for (position, chunk) in chunks.iter().enumerate() {
        let size = chunk.size();
        let fits = if position == last {
            (1..=chunk_size).contains(&size)
        } else {
            size == chunk_size
        };
        if !fits {
            return Err(CasError::ChunkBoundary {
                index: chunk.index,
                size,
                chunk_size,
            });
        }
    }
    Ok(())
}

/// Check a manifest's internal consistency.
///
/// Verifies the chunk count, that the root matches the digest list, and that
/// `file_size` is achievable with `chunk_size` boundaries.
pub fn verify_manifest(manifest: &FileManifest) -> Result<(), CasError> {
    if manifest.version != MANIFEST_VERSION {
        return Err(CasError::UnsupportedVersion {
            found: manifest.version,
            supported: MANIFEST_VERSION,
        });
    }

    if manifest.chunk_digests.len() as u64 != manifest.total_chunks {
        return Err(CasError::ManifestMismatch(format!(
            "total_chunks is {} but {} digests are listed",
            manifest.total_chunks,
            manifest.chunk_digests.len()
        )));
    }

    let root = root_identifier(&manifest.chunk_digests);
    if root != manifest.root {
        return Err(CasError::ManifestMismatch(format!(
            "root {} does not match chunk digests (expected {root})",
            manifest.root
        )));
    }

    if manifest.chunk_size == 0 {
        return Err(CasError::InvalidChunkSize(0));
    }
    let chunk_size = u64::from(manifest.chunk_size);
    let expected_chunks = manifest.file_size.div_ceil(chunk_size);
    if expected_chunks != manifest.total_chunks {
        return Err(CasError::ManifestMismatch(format!(
            "{} bytes at chunk size {chunk_size} needs {expected_chunks} chunks, manifest lists {}",
            manifest.file_size, manifest.total_chunks
        )));
    }

    Ok(())
}

/// Serialize a manifest to postcard bytes.
pub fn serialize_manifest(manifest: &FileManifest) -> Result<Vec<u8>, CasError> {
    postcard::to_allocvec(manifest).map_err(|e| CasError::Serialization(e.to_string()))
}

/// Deserialize a manifest from postcard bytes.
///
/// Rejects manifests with unknown version numbers.
pub fn deserialize_manifest(bytes: &[u8]) -> Result<FileManifest, CasError> {
    let manifest: FileManifest =
        postcard::from_bytes(bytes).map_err(|e| CasError::Serialization(e.to_string()))?;
    if manifest.version != MANIFEST_VERSION {
        return Err(CasError::UnsupportedVersion {
            found: manifest.version,
            supported: MANIFEST_VERSION,
        });
    }
    Ok(manifest)
}
