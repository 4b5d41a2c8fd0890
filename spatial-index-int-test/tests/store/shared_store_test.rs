use spatial_index::{Envelope, IndexError, RTreeConfig, SharedRTree, SpatialIndex};
use spatial_index_int_test::test_util::{
    brute_force, cleanup, create_test_context, create_test_context_with, random_entries, run_test,
    sorted_keys,
};

#[test]
fn test_add_and_query() {
    run_test(
        create_test_context,
        |ctx| {
            let index = ctx.index();
            for entry in random_entries(1, 500) {
                index.add(&entry.envelope, entry.id)?;
            }
            assert_eq!(index.size(), 500);

            let query = Envelope::new_2d(-300.0, -300.0, 300.0, 300.0)?;
            let expected = brute_force(&random_entries(1, 500), &query);
            assert_eq!(sorted_keys(&index, &query)?, expected);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_close_and_reopen() {
    run_test(
        create_test_context,
        |ctx| {
            let entries = random_entries(2, 300);
            let index = ctx.index();
            for entry in &entries {
                index.add(&entry.envelope, entry.id)?;
            }
            for entry in entries.iter().take(100) {
                assert!(index.remove(&entry.envelope, entry.id)?);
            }
            index.close()?;
            assert!(matches!(
                index.find_intersecting_keys(&entries[0].envelope),
                Err(IndexError::Closed)
            ));

            let reopened = SharedRTree::open(ctx.path())?;
            assert_eq!(reopened.size(), 200);
            let query = Envelope::new_2d(-1000.0, -1000.0, 1030.0, 1030.0)?;
            assert_eq!(sorted_keys(&reopened, &query)?, brute_force(&entries[100..], &query));
            assert!(reopened.check_integrity()?.is_valid);
            reopened.close()
        },
        cleanup,
    )
}

#[test]
fn test_flush_writes_snapshot() {
    run_test(
        create_test_context,
        |ctx| {
            let index = ctx.index();
            index.add(&Envelope::new_2d(0.0, 0.0, 1.0, 1.0)?, 42)?;
            assert!(index.is_dirty());
            index.flush()?;
            assert!(!index.is_dirty());

            // a second handle on the same file sees the flushed state
            let other = SharedRTree::open(ctx.path())?;
            assert_eq!(other.find_intersecting_keys(&Envelope::new_2d(0.5, 0.5, 0.6, 0.6)?)?, vec![42]);
            other.close()
        },
        cleanup,
    )
}

#[test]
fn test_clear_persists_empty_index() {
    run_test(
        create_test_context,
        |ctx| {
            let index = ctx.index();
            for entry in random_entries(3, 50) {
                index.add(&entry.envelope, entry.id)?;
            }
            index.clear()?;
            index.close()?;

            let reopened = SharedRTree::open(ctx.path())?;
            assert_eq!(reopened.size(), 0);
            reopened.close()
        },
        cleanup,
    )
}

#[test]
fn test_nearest_in_three_dimensions() {
    run_test(
        || create_test_context_with(RTreeConfig::new(3).with_max_fanout(6)),
        |ctx| {
            let index = ctx.index();
            for i in 0..20u64 {
                let c = i as f64 * 10.0;
                index.add(&Envelope::point(vec![c, c, c])?, i)?;
            }
            let nearest = index.find_nearest(&[41.0, 41.0, 41.0], 2, None)?;
            assert_eq!(nearest.len(), 2);
            assert_eq!(nearest[0].0, 4);
            assert_eq!(nearest[1].0, 5);
            assert!((nearest[0].1 - 3f64.sqrt()).abs() < 1e-9);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_drop_index_removes_file() {
    run_test(
        create_test_context,
        |ctx| {
            let index = ctx.index();
            index.add(&Envelope::new_2d(0.0, 0.0, 1.0, 1.0)?, 1)?;
            index.drop_index()?;
            assert!(!ctx.path().exists());
            assert!(index.is_closed());
            Ok(())
        },
        cleanup,
    )
}
