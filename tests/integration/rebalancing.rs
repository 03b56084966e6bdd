//! Integration test: rebalancing.
//!
//! Start with a small cluster, change membership, verify that only the
//! reported chunks move and that every file stays readable.

use cairn_integration_tests::{LocalCluster, test_data_seeded};
use cairn_placement::Ring;
use cairn_types::FileManifest;

fn write_files(cluster: &LocalCluster, count: usize) -> Vec<(FileManifest, Vec<u8>)> {
    (0..count)
        .map(|i| {
            let data = test_data_seeded(3000 + i * 97, i as u32 + 1);
            let manifest = cluster.put(&format!("obj-{i:03}"), &data, 512);
            (manifest, data)
        })
        .collect()
}

/// After every migration is applied, each chunk sits on all of its owners.
fn assert_fully_placed(
    cluster: &LocalCluster,
    files: &[(FileManifest, Vec<u8>)],
    replicas: usize,
) {
    for (manifest, _) in files {
        for digest in &manifest.chunk_digests {
            for owner in cluster.ring().nodes_for_key(&digest.to_hex(), replicas) {
                assert!(cluster.holds(&owner, digest), "{owner} missing {digest}");
            }
        }
    }
}

#[test]
fn test_add_node_objects_still_readable() {
    let cluster = LocalCluster::new(3, 2);
    let files = write_files(&cluster, 30);

    let migrations = cluster.add_node("127.0.0.1:9100");
    assert_eq!(cluster.ring().node_count(), 4);
    assert!(!migrations.is_empty());

    for (manifest, expected) in &files {
        assert_eq!(&cluster.get(manifest).unwrap(), expected, "{}", manifest.filename);
    }
    assert_fully_placed(&cluster, &files, 2);
}

#[test]
fn test_add_node_only_moves_onto_new_node() {
    let cluster = LocalCluster::new(4, 2);
    write_files(&cluster, 20);

    let migrations = cluster.add_node("127.0.0.1:9100");
    for m in &migrations {
        assert_eq!(m.to, "127.0.0.1:9100");
        assert_ne!(m.from, m.to);
    }
    assert_eq!(cluster.chunks_on("127.0.0.1:9100"), migrations.len());
}

#[test]
fn test_add_node_moves_a_minority_of_chunks() {
    let cluster = LocalCluster::new(6, 2);
    write_files(&cluster, 40);
    let keys = cluster.stored_keys();

    let migrations = cluster.add_node("127.0.0.1:9100");
    assert!(
        migrations.len() < keys.len(),
        "{} migrations for {} chunks",
        migrations.len(),
        keys.len()
    );
}

#[test]
fn test_remove_node_objects_still_readable() {
    let cluster = LocalCluster::new(5, 2);
    let files = write_files(&cluster, 30);

    let leaving = "127.0.0.1:9002";
    let held = cluster.chunks_on(leaving);
    let migrations = cluster.remove_node(leaving);

    assert!(!cluster.ring().has_node(leaving));
    assert_eq!(cluster.chunks_on(leaving), 0);
    assert_eq!(migrations.len(), held);
    assert!(migrations.iter().all(|m| m.from == leaving));

    for (manifest, expected) in &files {
        assert_eq!(&cluster.get(manifest).unwrap(), expected, "{}", manifest.filename);
    }
    assert_fully_placed(&cluster, &files, 2);
}

#[test]
fn test_add_then_remove_restores_placement() {
    let cluster = LocalCluster::new(4, 2);
    let files = write_files(&cluster, 15);
    let before = cluster.ring().snapshot();

    let added = cluster.add_node("127.0.0.1:9100");
    let removed = cluster.remove_node("127.0.0.1:9100");
    assert_eq!(added.len(), removed.len());
    assert_eq!(cluster.ring().snapshot(), before);

    for (manifest, expected) in &files {
        assert_eq!(&cluster.get(manifest).unwrap(), expected);
    }
}

#[test]
fn test_rebalance_without_change_moves_nothing() {
    let cluster = LocalCluster::new(3, 2);
    write_files(&cluster, 10);
    let keys = cluster.stored_keys();

    let migrations = cluster.ring().rebalance(&keys, 2, |_| {});
    assert!(migrations.is_empty());
}

#[test]
fn test_rebalance_matches_offline_diff() {
    let cluster = LocalCluster::new(5, 3);
    write_files(&cluster, 10);
    let keys = cluster.stored_keys();

    let old = cluster.ring().snapshot();
    let mut new: Ring = old.clone();
    new.add_node("127.0.0.1:9100");
    new.remove_node("127.0.0.1:9001");
    let expected = Ring::diff(&old, &new, &keys, 3);

    let migrations = cluster.ring().rebalance(&keys, 3, |ring| {
        ring.add_node("127.0.0.1:9100");
        ring.remove_node("127.0.0.1:9001");
    });
    assert_eq!(migrations, expected);
    assert_eq!(cluster.ring().snapshot(), new);
}
