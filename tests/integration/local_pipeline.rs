//! Full local write/read pipeline integration test.
//!
//! Connects cairn-cas + cairn-placement into a working pipeline without
//! any networking.

use cairn_cas::{
    CasError, Chunker, build_manifest, chunk_digests, deserialize_manifest, hash_all,
    hash_all_parallel, reassemble_file, reassemble_manifest, root_identifier, serialize_manifest,
    verify_files,
};
use cairn_integration_tests::{LocalCluster, test_data, test_data_seeded};
use cairn_placement::Ring;
use cairn_types::{Chunk, digest_hex};

#[test]
fn test_letters_scenario() {
    let data: Vec<u8> = b"ABCDEFGHIJ".iter().copied().cycle().take(25).collect();
    let chunks = hash_all(Chunker::new(10).unwrap().split(&data));

    let sizes: Vec<usize> = chunks.iter().map(Chunk::size).collect();
    let indices: Vec<u64> = chunks.iter().map(|c| c.index).collect();
    assert_eq!(sizes, vec![10, 10, 5]);
    assert_eq!(indices, vec![0, 1, 2]);

    let manifest = build_manifest("letters", &chunks, 10).unwrap();
    let restored = reassemble_manifest(&manifest, chunks).unwrap();
    assert_eq!(restored, data);
}

#[test]
fn test_empty_input_scenario() {
    let chunks = hash_all(Chunker::new(10).unwrap().split(b""));
    assert!(chunks.is_empty());

    let manifest = build_manifest("empty", &chunks, 10).unwrap();
    assert_eq!(manifest.total_chunks, 0);
    assert_eq!(manifest.root.to_string(), digest_hex(b""));
    assert!(reassemble_manifest(&manifest, Vec::new()).unwrap().is_empty());
}

#[test]
fn test_identical_bytes_identical_cid_across_chunkings_of_same_size() {
    let data = test_data(50_000);
    let a = hash_all(Chunker::new(4096).unwrap().split(&data));
    let b = hash_all(
        Chunker::new(4096)
            .unwrap()
            .split_reader(data.as_slice())
            .unwrap(),
    );
    assert_eq!(
        root_identifier(&chunk_digests(&a).unwrap()),
        root_identifier(&chunk_digests(&b).unwrap())
    );
}

#[test]
fn test_cid_independent_of_topology() {
    let data = test_data(20_000);
    let small = LocalCluster::new(3, 2);
    let large = LocalCluster::new(7, 3);

    let m1 = small.put("f", &data, 1024);
    let m2 = large.put("f", &data, 1024);
    assert_eq!(m1.root, m2.root);
    assert_eq!(m1, m2);
}

#[test]
fn test_put_get_roundtrip_across_sizes() {
    let cluster = LocalCluster::new(5, 2);
    let s = 512usize;
    for (i, len) in [0, 1, s - 1, s, s + 1, 4 * s, 4 * s + 1].into_iter().enumerate() {
        let data = test_data_seeded(len, i as u32 + 1);
        let manifest = cluster.put(&format!("file-{i}"), &data, s as u32);
        assert_eq!(cluster.get(&manifest).unwrap(), data, "len {len}");
    }
}

#[test]
fn test_replicas_survive_one_wiped_node() {
    let cluster = LocalCluster::new(4, 2);
    let data = test_data(40_000);
    let manifest = cluster.put("replicated", &data, 1000);

    let victim = cluster
        .ring()
        .node_for_key(&manifest.chunk_digests[0].to_hex())
        .unwrap();
    assert!(cluster.chunks_on(&victim) > 0);
    cluster.wipe_node(&victim);
    assert_eq!(cluster.chunks_on(&victim), 0);

    assert_eq!(cluster.get(&manifest).unwrap(), data);
}

#[test]
fn test_single_copy_lost_is_reported_missing() {
    let cluster = LocalCluster::new(3, 1);
    let data = test_data(30_000);
    let manifest = cluster.put("fragile", &data, 1000);

    let victim = cluster
        .ring()
        .node_for_key(&manifest.chunk_digests[0].to_hex())
        .unwrap();
    cluster.wipe_node(&victim);

    assert!(matches!(
        cluster.get(&manifest),
        Err(CasError::MissingChunk { index: 0 })
    ));
}

#[test]
fn test_every_chunk_placed_on_distinct_nodes() {
    let cluster = LocalCluster::new(5, 3);
    let manifest = cluster.put("spread", &test_data(64_000), 4096);

    for digest in &manifest.chunk_digests {
        let mut owners = cluster.ring().nodes_for_key(&digest.to_hex(), 3);
        assert_eq!(owners.len(), 3);
        owners.sort();
        owners.dedup();
        assert_eq!(owners.len(), 3);
    }
}

#[test]
fn test_placement_is_stable_for_same_ring() {
    let mut ring_a = Ring::new();
    let mut ring_b = Ring::new();
    for i in 0..6 {
        ring_a.add_node(format!("10.0.0.{i}:8001"));
        ring_b.add_node(format!("10.0.0.{}:8001", 5 - i));
    }

    let chunks = hash_all(Chunker::new(1000).unwrap().split(&test_data(25_000)));
    for d in chunk_digests(&chunks).unwrap() {
        assert_eq!(
            ring_a.nodes_for_key(&d.to_hex(), 3),
            ring_b.nodes_for_key(&d.to_hex(), 3)
        );
    }
}

#[test]
fn test_manifest_survives_encoding() {
    let chunks = hash_all(Chunker::new(333).unwrap().split(&test_data(5_000)));
    let manifest = build_manifest("encoded", &chunks, 333).unwrap();
    let decoded = deserialize_manifest(&serialize_manifest(&manifest).unwrap()).unwrap();
    assert_eq!(
        reassemble_manifest(&decoded, chunks).unwrap(),
        test_data(5_000)
    );
}

#[tokio::test]
async fn test_file_pipeline_with_parallel_hashing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.bin");
    let output = dir.path().join("output.bin");
    let data = test_data(100_003);
    std::fs::write(&input, &data).unwrap();

    let chunker = Chunker::new(4096).unwrap();
    let chunks = hash_all_parallel(chunker.split_file(&input).unwrap())
        .await
        .unwrap();
    let manifest = build_manifest("input.bin", &chunks, 4096).unwrap();
    assert_eq!(manifest.file_size, 100_003);

    reassemble_file(chunks, manifest.total_chunks, &output).unwrap();
    assert!(verify_files(&input, &output, 4096).unwrap().is_match());
}
