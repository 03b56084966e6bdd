//! Content addressing, chunking, manifests and reassembly.
//!
//! This crate provides:
//! - [`Chunker`] — splits data into fixed-size, indexed chunks.
//! - [`hash_all`] / [`hash_all_parallel`] — digests chunks with SHA-256.
//! - [`root_identifier`] — the file CID over the ordered chunk digests.
//! - [`build_manifest`] — constructs a [`FileManifest`](cairn_types::FileManifest).
//! - [`reassemble`] and friends — the inverse of chunking, with integrity checks.

mod chunker;
mod error;
mod file;
mod hasher;
mod manifest;
mod reassembler;

pub use chunker::Chunker;
pub use error::CasError;
pub use file::{Verification, file_cid, manifest_for_file, verify_files};
pub use hasher::{chunk_digests, hash_all, hash_all_parallel, hash_chunk, root_identifier};
pub use manifest::{build_manifest, deserialize_manifest, serialize_manifest, verify_manifest};
pub use reassembler::{reassemble, reassemble_file, reassemble_manifest, reassemble_to};
