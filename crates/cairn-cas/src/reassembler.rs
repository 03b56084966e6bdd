//! Reassembly of chunks back into the original byte stream.
//!
//! Reassembly always takes the expected chunk count (a manifest's
//! `total_chunks`). An empty chunk set is only a valid input when the file
//! was itself empty; otherwise it is reported as chunk 0 missing.

use std::io::Write;
use std::path::Path;

use cairn_types::{Chunk, ChunkDigest, FileManifest};
use tracing::{debug, warn};

use crate::error::CasError;
use crate::manifest::verify_manifest;

/// Sort `chunks` by index and check they are exactly `0..expected_chunks`.
///
/// Reports the first offending position.
fn order_chunks(mut chunks: Vec<Chunk>, expected_chunks: u64) -> Result<Vec<Chunk>, CasError> {
    chunks.sort_by_key(|c| c.index);

    for (position, chunk) in chunks.iter().enumerate() {
        let position = position as u64;
        if chunk.index >= expected_chunks && position >= expected_chunks {
            return Err(CasError::UnexpectedChunk {
                index: chunk.index,
                expected: expected_chunks,
            });
        }
        if chunk.index < position {
            return Err(CasError::DuplicateChunk { index: chunk.index });
        }
        if chunk.index > position {
            return Err(CasError::MissingChunk { index: position });
        }
    }

    let present = chunks.len() as u64;
    if present < expected_chunks {
        return Err(CasError::MissingChunk { index: present });
    }

    Ok(chunks)
}

/// Write already-ordered payloads to `writer`, returning the byte count.
fn write_ordered(chunks: &[Chunk], mut writer: impl Write) -> std::io::Result<u64> {
    let mut written = 0u64;
    for chunk in chunks {
        writer.write_all(&chunk.data)?;
        written += chunk.size() as u64;
    }
    writer.flush()?;
    Ok(written)
}

/// Write the payloads of a complete chunk set, in index order, to `writer`.
///
/// The set is validated before the first byte is written. Returns the number
/// of bytes written.
pub fn reassemble_to(
    chunks: Vec<Chunk>,
    expected_chunks: u64,
    writer: impl Write,
) -> Result<u64, CasError> {
    let chunks = order_chunks(chunks, expected_chunks)?;
    Ok(write_ordered(&chunks, writer)?)
}

/// Reassemble a complete chunk set into a buffer.
pub fn reassemble(chunks: Vec<Chunk>, expected_chunks: u64) -> Result<Vec<u8>, CasError> {
    let mut out = Vec::new();
    reassemble_to(chunks, expected_chunks, &mut out)?;
    Ok(out)
}

/// Reassemble a complete chunk set into the file at `path`.
///
/// Data goes to a temporary file next to `path` that is renamed into place
/// only after every chunk has been written, so a failure never leaves a
/// partial file at `path`.
pub fn reassemble_file(
    chunks: Vec<Chunk>,
    expected_chunks: u64,
    path: impl AsRef<Path>,
) -> Result<u64, CasError> {
    let path = path.as_ref();
    let chunks = order_chunks(chunks, expected_chunks)?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| CasError::file(dir, e))?;

    let writer = std::io::BufWriter::new(tmp.as_file_mut());
    let written = write_ordered(&chunks, writer).map_err(|e| CasError::file(path, e))?;

    tmp.persist(path).map_err(|e| CasError::file(path, e.error))?;
    debug!(path = %path.display(), bytes = written, "reassembled file");
    Ok(written)
}

/// Reassemble the file a manifest describes, verifying every chunk.
///
/// Each payload is re-hashed and compared with the manifest's digest for its
/// index, and the total size must match `file_size`. Nothing is returned
/// unless all checks pass.
pub fn reassemble_manifest(
    manifest: &FileManifest,
    chunks: Vec<Chunk>,
) -> Result<Vec<u8>, CasError> {
    verify_manifest(manifest)?;
    let chunks = order_chunks(chunks, manifest.total_chunks)?;

    let mut total = 0u64;
    for (chunk, expected) in chunks.iter().zip(&manifest.chunk_digests) {
        let actual = ChunkDigest::from_data(&chunk.data);
        if actual != *expected {
            warn!(index = chunk.index, %expected, %actual, "chunk digest mismatch");
            return Err(CasError::DigestMismatch {
                index: chunk.index,
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
        total += chunk.size() as u64;
    }

    if total != manifest.file_size {
        return Err(CasError::SizeMismatch {
            expected: manifest.file_size,
            actual: total,
        });
    }

    let mut out = Vec::with_capacity(total as usize);
    write_ordered(&chunks, &mut out)?;
    Ok(out)
}
