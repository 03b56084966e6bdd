//! File-level helpers: manifest construction and CID comparison.

use std::path::Path;

use cairn_types::{Cid, FileManifest};
use tracing::info;

use crate::chunker::Chunker;
use crate::error::CasError;
use crate::hasher::hash_all;
use crate::manifest::build_manifest;

/// Chunk, hash and describe the file at `path`.
///
/// The manifest's filename is the final path component.
pub fn manifest_for_file(
    path: impl AsRef<Path>,
    chunk_size: u32,
) -> Result<FileManifest, CasError> {
    let path = path.as_ref();
    let chunks = hash_all(Chunker::new(chunk_size)?.split_file(path)?);
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    build_manifest(filename, &chunks, chunk_size)
}

/// Root identifier of the file at `path`.
pub fn file_cid(path: impl AsRef<Path>, chunk_size: u32) -> Result<Cid, CasError> {
    Ok(manifest_for_file(path, chunk_size)?.root)
}

/// Outcome of comparing two files by content identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    /// CID of the original file.
    pub original: Cid,
    /// CID of the copy.
    pub copy: Cid,
}

impl Verification {
    /// Whether both files have the same content.
    pub fn is_match(&self) -> bool {
        self.original == self.copy
    }
}

/// Compare two files by CID, both chunked with the same `chunk_size`.
pub fn verify_files(
    original: impl AsRef<Path>,
    copy: impl AsRef<Path>,
    chunk_size: u32,
) -> Result<Verification, CasError> {
    let verification = Verification {
        original: file_cid(original, chunk_size)?,
        copy: file_cid(copy, chunk_size)?,
    };
    info!(
        original = %verification.original,
        copy = %verification.copy,
        matched = verification.is_match(),
        "verified files"
    );
    Ok(verification)
}
