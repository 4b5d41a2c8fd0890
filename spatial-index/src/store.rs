//! Thread-safe, optionally file-backed index handle.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::RTreeConfig;
use crate::entry::{Entry, EntryId};
use crate::envelope::Envelope;
use crate::errors::{IndexError, IndexResult};
use crate::rtree::{IntegrityReport, RTree, RTreeStats, RemoveCriterion};

/// Operations every shareable spatial index offers.
///
/// Implementations take `&self` and synchronize internally, so a handle can
/// be shared between threads.
pub trait SpatialIndex: Send + Sync {
    /// Adds an entry.
    fn add(&self, envelope: &Envelope, id: EntryId) -> IndexResult<()>;

    /// Removes the entry with this envelope and id.
    fn remove(&self, envelope: &Envelope, id: EntryId) -> IndexResult<bool>;

    /// Ids of entries whose envelope intersects `query`.
    fn find_intersecting_keys(&self, query: &Envelope) -> IndexResult<Vec<EntryId>>;

    /// Ids of entries whose envelope lies inside `query`.
    fn find_contained_keys(&self, query: &Envelope) -> IndexResult<Vec<EntryId>>;

    /// The `k` entries nearest to `point` with their distances.
    fn find_nearest(
        &self,
        point: &[f64],
        k: usize,
        max_distance: Option<f64>,
    ) -> IndexResult<Vec<(EntryId, f64)>>;

    /// Every entry within `distance` of `point`, closest first.
    fn find_within_distance(
        &self,
        point: &[f64],
        distance: f64,
    ) -> IndexResult<Vec<(EntryId, f64)>> {
        self.find_nearest(point, usize::MAX, Some(distance))
    }

    /// Number of entries.
    fn size(&self) -> u64;

    /// Persists pending changes, if the index has a backing file.
    fn flush(&self) -> IndexResult<()>;

    /// Flushes and closes the index. Closing twice is a no-op.
    fn close(&self) -> IndexResult<()>;

    /// Removes all entries.
    fn clear(&self) -> IndexResult<()>;

    /// Closes the index and deletes its backing file.
    fn drop_index(&self) -> IndexResult<()>;
}

/// A cloneable handle to an [`RTree`] guarded by a read-write lock.
///
/// Searches take the read lock and run in parallel; mutations take the write
/// lock. A file-backed handle writes a snapshot on [`flush`](SpatialIndex::flush),
/// on [`close`](SpatialIndex::close) and, best effort, when the last handle
/// is dropped with unsaved changes.
///
/// # Example
///
/// ```rust
/// use spatial_index::{Envelope, RTreeConfig, SharedRTree, SpatialIndex};
///
/// let index = SharedRTree::in_memory(RTreeConfig::new(2)).unwrap();
/// index.add(&Envelope::new_2d(0.0, 0.0, 1.0, 1.0).unwrap(), 7).unwrap();
///
/// let query = Envelope::new_2d(0.5, 0.5, 2.0, 2.0).unwrap();
/// assert_eq!(index.find_intersecting_keys(&query).unwrap(), vec![7]);
/// ```
#[derive(Clone)]
pub struct SharedRTree {
    inner: Arc<SharedRTreeInner>,
}

struct SharedRTreeInner {
    tree: RwLock<RTree>,
    path: Option<PathBuf>,
    closed: RwLock<bool>,
    /// Set by mutations, cleared by a successful snapshot.
    dirty: AtomicBool,
}

impl SharedRTree {
    fn from_tree(tree: RTree, path: Option<PathBuf>, dirty: bool) -> Self {
        Self {
            inner: Arc::new(SharedRTreeInner {
                tree: RwLock::new(tree),
                path,
                closed: RwLock::new(false),
                dirty: AtomicBool::new(dirty),
            }),
        }
    }

    /// An index without a backing file.
    pub fn in_memory(config: RTreeConfig) -> IndexResult<Self> {
        let tree = RTree::with_config(config)?;
        Ok(Self::from_tree(tree, None, false))
    }

    /// Creates an empty index at `path`, replacing any existing file.
    pub fn create(path: impl AsRef<Path>, config: RTreeConfig) -> IndexResult<Self> {
        let path = path.as_ref();
        log::debug!("Creating new spatial index at {:?}", path);
        let tree = RTree::with_config(config)?;
        tree.save(path)?;
        Ok(Self::from_tree(tree, Some(path.to_path_buf()), false))
    }

    /// Opens the snapshot stored at `path`.
    pub fn open(path: impl AsRef<Path>) -> IndexResult<Self> {
        let path = path.as_ref();
        log::debug!("Opening existing spatial index at {:?}", path);
        let tree = RTree::load(path)?;
        Ok(Self::from_tree(tree, Some(path.to_path_buf()), false))
    }

    /// Opens `path` when it exists, otherwise creates it from `config`.
    ///
    /// An existing file keeps its own dimension and fanout; `config` only
    /// applies to a new file.
    pub fn open_or_create(path: impl AsRef<Path>, config: RTreeConfig) -> IndexResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::open(path)
        } else {
            Self::create(path, config)
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.inner.path.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        *self.inner.closed.read()
    }

    /// True when there are changes not yet written to the backing file.
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.load(Ordering::Acquire)
    }

    /// Runs `f` with shared access to the tree.
    pub fn read<R>(&self, f: impl FnOnce(&RTree) -> R) -> IndexResult<R> {
        let closed = self.inner.closed.read();
        if *closed {
            return Err(IndexError::Closed);
        }
        let tree = self.inner.tree.read();
        Ok(f(&tree))
    }

    /// Runs `f` with exclusive access to the tree. The index is marked dirty
    /// only when `f` succeeds.
    pub fn write<R>(&self, f: impl FnOnce(&mut RTree) -> IndexResult<R>) -> IndexResult<R> {
        let closed = self.inner.closed.read();
        if *closed {
            return Err(IndexError::Closed);
        }
        let mut tree = self.inner.tree.write();
        let result = f(&mut tree)?;
        self.inner.dirty.store(true, Ordering::Release);
        Ok(result)
    }

    pub fn insert(&self, entry: Entry) -> IndexResult<()> {
        self.write(|tree| tree.insert(entry))
    }

    pub fn remove_matching(&self, criterion: &RemoveCriterion) -> IndexResult<bool> {
        self.write(|tree| tree.remove(criterion))
    }

    pub fn search_collect(&self, query: &Envelope) -> IndexResult<Vec<Entry>> {
        self.read(|tree| tree.search_collect(query))?
    }

    pub fn stats(&self) -> IndexResult<RTreeStats> {
        self.read(RTree::stats)
    }

    pub fn check_integrity(&self) -> IndexResult<IntegrityReport> {
        self.read(RTree::check_integrity)
    }
}

impl SharedRTreeInner {
    /// Writes a snapshot if there is a backing file and unsaved changes.
    fn flush(&self) -> IndexResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let tree = self.tree.read();
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(());
        }
        if let Err(err) = tree.save(path) {
            self.dirty.store(true, Ordering::Release);
            return Err(err);
        }
        log::debug!("Flushed spatial index at {:?} ({} entries)", path, tree.len());
        Ok(())
    }
}

impl SpatialIndex for SharedRTree {
    fn add(&self, envelope: &Envelope, id: EntryId) -> IndexResult<()> {
        self.insert(Entry::new(envelope.clone(), id))
    }

    fn remove(&self, envelope: &Envelope, id: EntryId) -> IndexResult<bool> {
        let criterion = RemoveCriterion::Exact(Entry::new(envelope.clone(), id));
        self.remove_matching(&criterion)
    }

    fn find_intersecting_keys(&self, query: &Envelope) -> IndexResult<Vec<EntryId>> {
        let entries = self.search_collect(query)?;
        Ok(entries.into_iter().map(|e| e.id).collect())
    }

    fn find_contained_keys(&self, query: &Envelope) -> IndexResult<Vec<EntryId>> {
        let entries = self.read(|tree| tree.search_contained_collect(query))??;
        Ok(entries.into_iter().map(|e| e.id).collect())
    }

    fn find_nearest(
        &self,
        point: &[f64],
        k: usize,
        max_distance: Option<f64>,
    ) -> IndexResult<Vec<(EntryId, f64)>> {
        let nearest = self.read(|tree| tree.nearest(point, k, max_distance))??;
        Ok(nearest
            .into_iter()
            .map(|(entry, distance)| (entry.id, distance))
            .collect())
    }

    fn size(&self) -> u64 {
        self.inner.tree.read().len() as u64
    }

    fn flush(&self) -> IndexResult<()> {
        let closed = self.inner.closed.read();
        if *closed {
            return Err(IndexError::Closed);
        }
        self.inner.flush()
    }

    fn close(&self) -> IndexResult<()> {
        let mut closed = self.inner.closed.write();
        if *closed {
            return Ok(());
        }
        self.inner.flush()?;
        *closed = true;
        log::debug!("Closed spatial index at {:?}", self.inner.path);
        Ok(())
    }

    fn clear(&self) -> IndexResult<()> {
        self.write(|tree| {
            tree.clear();
            Ok(())
        })
    }

    fn drop_index(&self) -> IndexResult<()> {
        let mut closed = self.inner.closed.write();
        self.inner.tree.write().clear();
        self.inner.dirty.store(false, Ordering::Release);
        if let Some(path) = &self.inner.path {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            log::debug!("Dropped spatial index at {:?}", path);
        }
        *closed = true;
        Ok(())
    }
}

impl Drop for SharedRTreeInner {
    fn drop(&mut self) {
        if !*self.closed.read() {
            if let Err(err) = self.flush() {
                log::debug!("Flush on drop failed for {:?}: {}", self.path, err);
            }
        }
    }
}
