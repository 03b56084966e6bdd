//! `cairnctl`: operator CLI for Cairn.
//!
//! Chunks files, computes content identifiers, verifies copies and shows
//! where each chunk would be placed on the configured node ring.
//!
//! # Usage
//!
//! ```text
//! cairnctl cid photo.jpg                      # print the file's CID
//! cairnctl verify photo.jpg copy.jpg          # compare two files by CID
//! cairnctl manifest photo.jpg                 # print the manifest
//! cairnctl -c cairn.toml place photo.jpg -r 2 # chunk placement on the ring
//! cairnctl roundtrip photo.jpg restored.jpg   # split, hash, reassemble, verify
//! ```

mod config;
mod telemetry;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use cairn_cas::{
    Chunker, build_manifest, deserialize_manifest, hash_all_parallel, manifest_for_file,
    reassemble_file, serialize_manifest, verify_files, verify_manifest,
};
use cairn_placement::SharedRing;
use cairn_types::FileManifest;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use config::CliConfig;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "cairnctl",
    version,
    about = "Content addressing and chunk placement for Cairn"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true, env = "CAIRN_CONFIG")]
    config: Option<PathBuf>,

    /// Override the chunk size in bytes.
    #[arg(short = 's', long, global = true)]
    chunk_size: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the content identifier of a file.
    Cid {
        /// File to identify.
        file: PathBuf,
    },

    /// Check that two files have the same content identifier.
    Verify {
        /// The original file.
        original: PathBuf,
        /// The copy to check against it.
        copy: PathBuf,
    },

    /// Print a file's manifest.
    Manifest {
        /// File to describe.
        file: PathBuf,
    },

    /// Show which nodes each chunk of a file is placed on.
    Place {
        /// File to place.
        file: PathBuf,

        /// Number of distinct nodes per chunk (defaults to config value).
        #[arg(short, long)]
        replicas: Option<usize>,
    },

    /// Split, hash and reassemble a file, then verify the result.
    Roundtrip {
        /// File to read.
        input: PathBuf,
        /// Where to write the reassembled copy.
        output: PathBuf,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    // CLI args override config file values.
    if let Some(size) = cli.chunk_size {
        config.chunking.chunk_size = Some(size);
        config.validate()?;
    }

    telemetry::init(&config.log.level);

    match cli.command {
        Commands::Cid { file } => cmd_cid(&config, &file),
        Commands::Verify { original, copy } => cmd_verify(&config, &original, &copy),
        Commands::Manifest { file } => cmd_manifest(&config, &file),
        Commands::Place { file, replicas } => {
            let replicas = replicas.unwrap_or_else(|| config.replicas());
            cmd_place(&config, &file, replicas)
        }
        Commands::Roundtrip { input, output } => cmd_roundtrip(&config, &input, &output).await,
    }
}

// -----------------------------------------------------------------------
// Commands
// -----------------------------------------------------------------------

fn cmd_cid(config: &CliConfig, file: &Path) -> Result<()> {
    let manifest = manifest_for_file(file, config.chunk_size())
        .with_context(|| format!("failed to process {}", file.display()))?;
    println!("{}", manifest.root);
    Ok(())
}

fn cmd_verify(config: &CliConfig, original: &Path, copy: &Path) -> Result<()> {
    let verification = verify_files(original, copy, config.chunk_size())?;

    println!("Original CID: {}", verification.original);
    println!("Copy CID:     {}", verification.copy);

    if !verification.is_match() {
        bail!("{} and {} differ", original.display(), copy.display());
    }
    println!("VERIFIED: files are identical");
    Ok(())
}

fn cmd_manifest(config: &CliConfig, file: &Path) -> Result<()> {
    let manifest = manifest_for_file(file, config.chunk_size())
        .with_context(|| format!("failed to process {}", file.display()))?;
    print_manifest(&manifest);
    Ok(())
}

fn cmd_place(config: &CliConfig, file: &Path, replicas: usize) -> Result<()> {
    let manifest = manifest_for_file(file, config.chunk_size())
        .with_context(|| format!("failed to process {}", file.display()))?;
    let ring = config.ring();

    println!("File:     {}", manifest.filename);
    println!("CID:      {}", manifest.root);
    println!("Nodes:    {}", ring.node_count());
    println!("Replicas: {replicas}");
    println!();

    if ring.node_count() == 0 {
        warn!("no nodes configured, placement unavailable");
        println!("no placement available: the ring has no nodes");
        return Ok(());
    }

    print_placement(&ring, &manifest, replicas);
    Ok(())
}

async fn cmd_roundtrip(config: &CliConfig, input: &Path, output: &Path) -> Result<()> {
    let chunk_size = config.chunk_size();
    let start = Instant::now();

    let chunker = Chunker::new(chunk_size)?;
    let chunks = chunker
        .split_file(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let chunks = hash_all_parallel(chunks).await?;

    let filename = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let manifest = build_manifest(filename, &chunks, chunk_size)?;

    // The manifest travels separately from the chunks; decode it the way a
    // receiving node would.
    let encoded = serialize_manifest(&manifest)?;
    let received = deserialize_manifest(&encoded)?;
    verify_manifest(&received)?;
    info!(
        cid = %received.root,
        chunks = received.total_chunks,
        manifest_bytes = encoded.len(),
        "manifest built"
    );

    let written = reassemble_file(chunks, received.total_chunks, output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    let verification = verify_files(input, output, chunk_size)?;
    let elapsed = start.elapsed();

    println!("CID:      {}", received.root);
    println!("Chunks:   {}", received.total_chunks);
    println!("Written:  {written} bytes to {}", output.display());
    println!("Elapsed:  {:.3}s", elapsed.as_secs_f64());

    if !verification.is_match() {
        bail!("reassembled file does not match the original");
    }
    println!("VERIFIED: files are identical");
    Ok(())
}

// -----------------------------------------------------------------------
// Output helpers
// -----------------------------------------------------------------------

fn print_manifest(manifest: &FileManifest) {
    println!("File:        {}", manifest.filename);
    println!("CID:         {}", manifest.root);
    println!("Size:        {} bytes", manifest.file_size);
    println!("Chunk size:  {} bytes", manifest.chunk_size);
    println!("Chunks:      {}", manifest.total_chunks);
    for (i, digest) in manifest.chunk_digests.iter().enumerate() {
        println!("  {i:>6}  {digest}");
    }
}

fn print_placement(ring: &SharedRing, manifest: &FileManifest, replicas: usize) {
    let owners = ring.nodes_for_key(&manifest.root.to_hex(), replicas);
    println!("manifest  -> {}", owners.join(", "));

    for (i, digest) in manifest.chunk_digests.iter().enumerate() {
        let owners = ring.nodes_for_key(&digest.to_hex(), replicas);
        println!("{i:>8}  {}  -> {}", &digest.to_hex()[..16], owners.join(", "));
    }
}
