use spatial_index::{Entry, EntryId, Envelope, IndexError, RTree, RTreeConfig};
use spatial_index_int_test::test_util::{brute_force, random_entries, random_path};
use std::fs;

fn sorted_ids(entries: &[Entry]) -> Vec<EntryId> {
    let mut ids: Vec<EntryId> = entries.iter().map(|e| e.id).collect();
    ids.sort_unstable();
    ids
}

struct TempFile(std::path::PathBuf);

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.0);
    }
}

#[test]
fn test_snapshot_survives_reload() {
    let file = TempFile(random_path());
    let entries = random_entries(31, 2000);

    let config = RTreeConfig::new(2).with_max_fanout(12).with_crs("EPSG:4326");
    let mut tree = RTree::with_config(config).unwrap();
    for entry in &entries {
        tree.insert(entry.clone()).unwrap();
    }
    tree.save(&file.0).unwrap();

    let loaded = RTree::load(&file.0).unwrap();
    assert_eq!(loaded.len(), tree.len());
    assert_eq!(loaded.height(), tree.height());
    assert_eq!(loaded.stats().node_count, tree.stats().node_count);
    assert_eq!(loaded.config().crs(), Some("EPSG:4326"));

    let query = Envelope::new_2d(-250.0, -250.0, 250.0, 250.0).unwrap();
    assert_eq!(
        sorted_ids(&loaded.search_collect(&query).unwrap()),
        brute_force(&entries, &query)
    );
}

#[test]
fn test_snapshot_after_removals() {
    let file = TempFile(random_path());
    let entries = random_entries(32, 800);

    let mut tree = RTree::new(2, 6).unwrap();
    for entry in &entries {
        tree.insert(entry.clone()).unwrap();
    }
    for entry in entries.iter().step_by(3) {
        assert!(tree.remove_entry(entry).unwrap());
    }
    tree.save(&file.0).unwrap();

    let mut loaded = RTree::load(&file.0).unwrap();
    let live: Vec<Entry> = entries
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 3 != 0)
        .map(|(_, e)| e.clone())
        .collect();
    assert_eq!(loaded.len(), live.len());

    let everything = Envelope::new_2d(-2000.0, -2000.0, 2000.0, 2000.0).unwrap();
    assert_eq!(
        sorted_ids(&loaded.search_collect(&everything).unwrap()),
        brute_force(&live, &everything)
    );

    // the reloaded tree keeps working as a normal tree
    for entry in &live {
        assert!(loaded.remove_entry(entry).unwrap());
    }
    assert!(loaded.is_empty());
    assert!(loaded.check_integrity().is_valid);
}

#[test]
fn test_damaged_file_is_reported_as_corrupt() {
    let file = TempFile(random_path());
    let mut tree = RTree::new(2, 4).unwrap();
    for entry in random_entries(33, 100) {
        tree.insert(entry).unwrap();
    }
    tree.save(&file.0).unwrap();

    let bytes = fs::read(&file.0).unwrap();

    fs::write(&file.0, &bytes[..bytes.len() / 2]).unwrap();
    let truncated = RTree::load(&file.0);
    assert!(matches!(truncated, Err(IndexError::CorruptIndex(_))));

    let mut flipped = bytes.clone();
    flipped[0] ^= 0xFF;
    fs::write(&file.0, &flipped).unwrap();
    let err = RTree::load(&file.0).unwrap_err();
    assert!(err.is_corruption());
}
