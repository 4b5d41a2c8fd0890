use spatial_index::{Entry, EntryId, Envelope, QuadraticSplit, RTree, RTreeConfig, RemoveCriterion};
use spatial_index_int_test::test_util::{brute_force, random_entries};

fn sorted_ids(entries: &[Entry]) -> Vec<EntryId> {
    let mut ids: Vec<EntryId> = entries.iter().map(|e| e.id).collect();
    ids.sort_unstable();
    ids
}

fn queries() -> Vec<Envelope> {
    vec![
        Envelope::new_2d(-1000.0, -1000.0, 1030.0, 1030.0).unwrap(),
        Envelope::new_2d(-100.0, -100.0, 100.0, 100.0).unwrap(),
        Envelope::new_2d(500.0, -600.0, 520.0, -580.0).unwrap(),
        Envelope::new_2d(0.0, 0.0, 0.0, 0.0).unwrap(),
        Envelope::new_2d(2000.0, 2000.0, 3000.0, 3000.0).unwrap(),
    ]
}

fn assert_matches_brute_force(tree: &RTree, live: &[Entry]) {
    let report = tree.check_integrity();
    assert!(report.is_valid, "integrity errors: {:?}", report.errors);
    assert_eq!(tree.len(), live.len());
    for query in queries() {
        let hits = tree.search_collect(&query).unwrap();
        assert_eq!(sorted_ids(&hits), brute_force(live, &query), "query {}", query);
    }
}

#[test]
fn test_large_insert_then_drain() {
    for config in [
        RTreeConfig::new(2).with_max_fanout(4),
        RTreeConfig::new(2).with_max_fanout(16),
        RTreeConfig::new(2)
            .with_max_fanout(7)
            .with_split_strategy(QuadraticSplit),
    ] {
        let entries = random_entries(17, 3000);
        let mut tree = RTree::with_config(config).unwrap();
        for entry in &entries {
            tree.insert(entry.clone()).unwrap();
        }
        assert_matches_brute_force(&tree, &entries);

        let (gone, kept) = entries.split_at(entries.len() / 2);
        for entry in gone {
            assert!(tree.remove_entry(entry).unwrap());
        }
        assert_matches_brute_force(&tree, kept);

        for entry in kept {
            assert!(tree.remove(&RemoveCriterion::Id(entry.id)).unwrap());
        }
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert!(tree.check_integrity().is_valid);
    }
}

#[test]
fn test_removal_is_idempotent() {
    let entries = random_entries(5, 400);
    let mut tree = RTree::new(2, 6).unwrap();
    for entry in &entries {
        tree.insert(entry.clone()).unwrap();
    }

    let victim = &entries[123];
    assert!(tree.remove_entry(victim).unwrap());
    let after_first = sorted_ids(&tree.iter().cloned().collect::<Vec<_>>());

    assert!(!tree.remove_entry(victim).unwrap());
    let after_second = sorted_ids(&tree.iter().cloned().collect::<Vec<_>>());
    assert_eq!(after_first, after_second);
    assert_eq!(tree.len(), 399);
}

#[test]
fn test_leaves_share_one_depth() {
    let entries = random_entries(99, 5000);
    let mut tree = RTree::new(2, 5).unwrap();
    for (i, entry) in entries.iter().enumerate() {
        tree.insert(entry.clone()).unwrap();
        if i % 1000 == 999 {
            assert!(tree.check_integrity().is_valid);
        }
    }
    let stats = tree.stats();
    assert_eq!(stats.total_entries, 5000);
    // height grows logarithmically with min fanout 2
    assert!(stats.tree_height as f64 <= (5000f64).log2().ceil());
}

#[test]
fn test_higher_dimension_workload() {
    let mut tree = RTree::new(4, 8).unwrap();
    let mut live = Vec::new();
    for id in 0..1000u64 {
        let base = (id % 37) as f64 * 3.0;
        let lower = vec![base, base + 1.0, (id % 11) as f64, (id % 5) as f64];
        let upper = lower.iter().map(|c| c + 2.0).collect();
        let entry = Entry::new(Envelope::new(lower, upper).unwrap(), id);
        tree.insert(entry.clone()).unwrap();
        live.push(entry);
    }
    let query = Envelope::new(vec![10.0, 10.0, 0.0, 0.0], vec![20.0, 20.0, 3.0, 1.0]).unwrap();
    let hits = tree.search_collect(&query).unwrap();
    assert_eq!(sorted_ids(&hits), brute_force(&live, &query));
    assert!(tree.check_integrity().is_valid);
}
