use spatial_index::{
    EntryId, Envelope, IndexError, IndexResult, NamedEnvelope, NamedIndex, RTree, RTreeConfig,
};
use spatial_index_int_test::test_util::random_path;
use std::collections::HashMap;
use std::fs;

fn env(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Envelope {
    Envelope::new_2d(min_x, min_y, max_x, max_y).unwrap()
}

fn city_blocks() -> IndexResult<NamedIndex> {
    let mut index = NamedIndex::new(RTreeConfig::new(2).with_max_fanout(4))?;
    for row in 0..10 {
        for col in 0..10 {
            let x = col as f64 * 10.0;
            let y = row as f64 * 10.0;
            let name = format!("block-{}-{}", row, col);
            index.insert(NamedEnvelope::new(name, env(x, y, x + 8.0, y + 8.0)))?;
        }
    }
    Ok(index)
}

fn sorted(names: Vec<&str>) -> Vec<String> {
    let mut names: Vec<String> = names.into_iter().map(String::from).collect();
    names.sort_unstable();
    names
}

#[test]
fn test_named_index_round_trip_through_snapshot() {
    let path = random_path();
    let index = city_blocks().unwrap();
    index.tree().save(&path).unwrap();

    // the host keeps the name table next to the snapshot
    let names: HashMap<EntryId, String> = index
        .names()
        .map(|(id, name)| (id, name.to_string()))
        .collect();

    let tree = RTree::load(&path).unwrap();
    let reloaded = NamedIndex::from_tree(tree, names).unwrap();
    assert_eq!(reloaded.len(), 100);

    let query = env(15.0, 15.0, 25.0, 25.0);
    assert_eq!(
        sorted(reloaded.search(&query).unwrap()),
        sorted(index.search(&query).unwrap())
    );
    assert_eq!(reloaded.get("block-3-4"), Some(&env(40.0, 30.0, 48.0, 38.0)));

    let _ = fs::remove_file(&path);
}

#[test]
fn test_from_tree_requires_every_name() {
    let index = city_blocks().unwrap();
    let mut names: HashMap<EntryId, String> = index
        .names()
        .map(|(id, name)| (id, name.to_string()))
        .collect();
    let missing = index.id_of("block-0-0").unwrap();
    names.remove(&missing);

    let result = NamedIndex::from_tree(index.tree().clone(), names);
    assert!(matches!(result, Err(IndexError::CorruptIndex(_))));
}

#[test]
fn test_new_names_after_reload_get_fresh_ids() {
    let index = city_blocks().unwrap();
    let names: Vec<(EntryId, String)> = index
        .names()
        .map(|(id, name)| (id, name.to_string()))
        .collect();
    let mut reloaded = NamedIndex::from_tree(index.tree().clone(), names).unwrap();

    let id = reloaded
        .insert(NamedEnvelope::new("park", env(200.0, 200.0, 250.0, 250.0)))
        .unwrap();
    assert!(index.id_of("park").is_none());
    assert!(index.names().all(|(existing, _)| existing != id));
    assert_eq!(reloaded.len(), 101);
}

#[test]
fn test_candidates_refined_by_predicate() {
    let index = city_blocks().unwrap();
    let query = env(0.0, 0.0, 35.0, 35.0);
    let candidates = index.search(&query).unwrap();
    assert_eq!(candidates.len(), 16);

    // keep blocks on the diagonal only
    let diagonal = index
        .search_filtered(&query, |record| {
            record.envelope.lower()[0] == record.envelope.lower()[1]
        })
        .unwrap();
    assert_eq!(
        sorted(diagonal),
        vec!["block-0-0", "block-1-1", "block-2-2", "block-3-3"]
    );
}
