//! Chunk digesting and root identifier computation.

use cairn_types::{Chunk, ChunkDigest, Cid};

use crate::error::CasError;

/// Compute and store the digest of a single chunk.
pub fn hash_chunk(chunk: &mut Chunk) -> ChunkDigest {
    let digest = ChunkDigest::from_data(&chunk.data);
    chunk.digest = Some(digest);
    digest
}

/// Digest every chunk, preserving order.
pub fn hash_all(mut chunks: Vec<Chunk>) -> Vec<Chunk> {
    for chunk in &mut chunks {
        hash_chunk(chunk);
    }
    chunks
}

/// Digest every chunk on the blocking thread pool, preserving order.
///
/// Each chunk is independent, so each gets its own blocking task.
pub async fn hash_all_parallel(chunks: Vec<Chunk>) -> Result<Vec<Chunk>, CasError> {
    let handles: Vec<_> = chunks
        .into_iter()
        .map(|mut chunk| {
            tokio::task::spawn_blocking(move || {
                hash_chunk(&mut chunk);
                chunk
            })
        })
        .collect();

    let mut hashed = Vec::with_capacity(handles.len());
    for handle in handles {
        hashed.push(handle.await?);
    }
    Ok(hashed)
}

/// Collect the digests of already-hashed chunks, in the order given.
pub fn chunk_digests(chunks: &[Chunk]) -> Result<Vec<ChunkDigest>, CasError> {
    chunks
        .iter()
        .map(|c| {
            c.digest
                .ok_or(CasError::UnhashedChunk { index: c.index })
        })
        .collect()
}

/// Root identifier (CID) over an ordered list of chunk digests.
///
/// Hashes the textual concatenation of the hex digests. An empty list gives
/// the digest of the empty string.
pub fn root_identifier(digests: &[ChunkDigest]) -> Cid {
    Cid::from_chunk_digests(digests)
}
