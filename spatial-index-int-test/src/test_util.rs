use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use spatial_index::{
    Entry, EntryId, Envelope, IndexResult, RTreeConfig, SharedRTree, SpatialIndex,
};
use std::backtrace::Backtrace;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use std::{env, fs, thread};

/// Runs a test with retry logic and error handling.
/// Tests run on the current thread to avoid thread exhaustion when running many tests in parallel.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> IndexResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> IndexResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> IndexResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;
    let mut last_backtrace: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            match before() {
                Ok(ctx) => match test(ctx.clone()) {
                    Ok(_) => match after(ctx) {
                        Ok(_) => Ok(()),
                        Err(e) => Err((
                            format!("After run failed: {:?}", e),
                            backtrace.to_string(),
                        )),
                    },
                    Err(e) => {
                        let _ = after(ctx);
                        Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                    }
                },
                Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
            }
        });

        let elapsed = start_time.elapsed();

        match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, bt))) => {
                last_error = Some(e.clone());
                last_backtrace = Some(bt);
                if attempt < MAX_RETRIES {
                    eprintln!(
                        "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                        attempt, MAX_RETRIES, elapsed
                    );
                    eprintln!("Error: {}", e);
                    eprintln!("Retrying in {}ms...\n", 100 * attempt);
                    thread::sleep(Duration::from_millis(100 * attempt as u64));
                }
            }
            Err(panic_err) => {
                let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };

                let message = format!("Panic: {}", err_msg);
                last_backtrace = Some(Backtrace::capture().to_string());

                if attempt < MAX_RETRIES {
                    eprintln!(
                        "\n========== Test Attempt {}/{} Panicked (took {:?}) ==========",
                        attempt, MAX_RETRIES, elapsed
                    );
                    eprintln!("{}", message);
                    eprintln!("Retrying in {}ms...\n", 100 * attempt);
                    thread::sleep(Duration::from_millis(100 * attempt as u64));
                }
                last_error = Some(message);
            }
        }
    }

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {} attempts", MAX_RETRIES);
    eprintln!("Last error: {}", last_error.as_deref().unwrap_or("Unknown"));
    if let Some(bt) = &last_backtrace {
        if !bt.is_empty() && !bt.contains("disabled") {
            eprintln!("\nBacktrace:\n{}", bt);
        }
    }
    eprintln!("=====================================================\n");

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

#[derive(Clone)]
pub struct TestContext {
    path: PathBuf,
    index: SharedRTree,
}

impl TestContext {
    pub fn new(path: PathBuf, index: SharedRTree) -> Self {
        Self { path, index }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index(&self) -> SharedRTree {
        self.index.clone()
    }
}

/// A fresh, not yet existing snapshot path in the temp directory.
pub fn random_path() -> PathBuf {
    let id = uuid::Uuid::new_v4();
    env::temp_dir().join(format!("spatial_{}.rtree", id))
}

pub fn test_config() -> RTreeConfig {
    RTreeConfig::new(2).with_max_fanout(8)
}

pub fn create_test_context() -> IndexResult<TestContext> {
    create_test_context_with(test_config())
}

pub fn create_test_context_with(config: RTreeConfig) -> IndexResult<TestContext> {
    let path = random_path();
    let index = SharedRTree::create(&path, config)?;
    Ok(TestContext::new(path, index))
}

/// Closes the index and removes its snapshot, tolerating files that are
/// already gone.
pub fn cleanup(ctx: TestContext) -> IndexResult<()> {
    if let Err(e) = ctx.index().close() {
        eprintln!("Warning: Failed to close index: {:?}", e);
    }

    let mut staging = ctx.path().as_os_str().to_owned();
    staging.push(".tmp");
    for path in [ctx.path().to_path_buf(), PathBuf::from(staging)] {
        match fs::remove_file(&path) {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                eprintln!("Warning: Failed to remove {:?}: {:?}", path, e);
            }
        }
    }
    Ok(())
}

/// Deterministic pseudo-random 2-D boxes with ids `0..count`.
pub fn random_entries(seed: u64, count: u64) -> Vec<Entry> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|id| {
            let x: f64 = rng.random_range(-1000.0..1000.0);
            let y: f64 = rng.random_range(-1000.0..1000.0);
            let w: f64 = rng.random_range(0.0..30.0);
            let h: f64 = rng.random_range(0.0..30.0);
            let envelope = Envelope::new_2d(x, y, x + w, y + h).expect("valid box");
            Entry::new(envelope, id)
        })
        .collect()
}

/// Ids intersecting `query`, computed without an index.
pub fn brute_force(entries: &[Entry], query: &Envelope) -> Vec<EntryId> {
    let mut ids: Vec<EntryId> = entries
        .iter()
        .filter(|e| e.envelope.intersects(query))
        .map(|e| e.id)
        .collect();
    ids.sort_unstable();
    ids
}

pub fn sorted_keys(index: &dyn SpatialIndex, query: &Envelope) -> IndexResult<Vec<EntryId>> {
    let mut ids = index.find_intersecting_keys(query)?;
    ids.sort_unstable();
    Ok(ids)
}
