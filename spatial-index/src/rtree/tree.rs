//! The R-tree proper.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use crate::config::RTreeConfig;
use crate::entry::{Entry, EntryId};
use crate::envelope::Envelope;
use crate::errors::{IndexError, IndexResult};
use crate::visitor::{CollectingVisitor, CountingVisitor, Visitor};

use super::node::{Node, NodeArena, NodeId, NodeKind};
use super::split::Partition;

/// What [`RTree::remove`] should look for.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoveCriterion {
    /// An entry with this envelope and id.
    Exact(Entry),
    /// Any entry with exactly this envelope.
    Envelope(Envelope),
    /// Any entry with this id. Cannot prune, so every leaf may be visited.
    Id(EntryId),
}

impl RemoveCriterion {
    fn envelope(&self) -> Option<&Envelope> {
        match self {
            RemoveCriterion::Exact(entry) => Some(&entry.envelope),
            RemoveCriterion::Envelope(envelope) => Some(envelope),
            RemoveCriterion::Id(_) => None,
        }
    }

    fn matches(&self, entry: &Entry) -> bool {
        match self {
            RemoveCriterion::Exact(target) => {
                target.id == entry.id && target.envelope.same_bounds(&entry.envelope)
            }
            RemoveCriterion::Envelope(envelope) => envelope.same_bounds(&entry.envelope),
            RemoveCriterion::Id(id) => entry.id == *id,
        }
    }
}

impl From<Entry> for RemoveCriterion {
    fn from(entry: Entry) -> Self {
        RemoveCriterion::Exact(entry)
    }
}

/// Shape statistics of a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RTreeStats {
    pub total_entries: u64,
    pub node_count: u64,
    pub leaf_count: u64,
    /// Number of levels; a lone root leaf has height 1.
    pub tree_height: u32,
    pub dimension: usize,
    pub max_fanout: usize,
    pub min_fanout: usize,
    /// Average leaf occupancy relative to `max_fanout` (0.0 - 1.0).
    pub leaf_fill_ratio: f64,
}

/// An N-dimensional R-tree over [`Entry`] values.
///
/// The tree owns all nodes in an arena. Each node caches the union of its
/// children's envelopes; mutations clear the cache on the path to the root
/// and the next reader recomputes it. [`refresh_bounds`](Self::refresh_bounds)
/// recomputes and stores, [`node_bounds`](Self::node_bounds) computes without
/// storing so that searches can run on a shared reference.
///
/// The tree is a single-writer structure: `insert`, `remove` and `clear` need
/// `&mut self`; searches take `&self` and may run concurrently when nothing
/// mutates the tree.
///
/// # Example
///
/// ```rust
/// use spatial_index::{Entry, Envelope, RTree};
///
/// let mut tree = RTree::new(2, 8).unwrap();
/// tree.insert(Entry::new(Envelope::new_2d(0.0, 0.0, 1.0, 1.0).unwrap(), 1)).unwrap();
/// tree.insert(Entry::new(Envelope::new_2d(5.0, 5.0, 6.0, 6.0).unwrap(), 2)).unwrap();
///
/// let query = Envelope::new_2d(-1.0, -1.0, 2.0, 2.0).unwrap();
/// let hits = tree.search_collect(&query).unwrap();
/// assert_eq!(hits.len(), 1);
/// assert_eq!(hits[0].id, 1);
/// ```
#[derive(Clone)]
pub struct RTree {
    config: RTreeConfig,
    /// Tag carried by every stored envelope, shared with the config's CRS.
    crs: Option<Arc<str>>,
    pub(crate) arena: NodeArena,
    root: NodeId,
    size: usize,
}

impl RTree {
    /// Creates an empty tree using the default split strategy and
    /// `min_fanout = max(1, max_fanout / 2)`.
    pub fn new(dimension: usize, max_fanout: usize) -> IndexResult<Self> {
        Self::with_config(RTreeConfig::new(dimension).with_max_fanout(max_fanout))
    }

    /// Creates an empty tree from a full configuration.
    pub fn with_config(config: RTreeConfig) -> IndexResult<Self> {
        config.validate()?;
        let mut arena = NodeArena::new();
        let root = arena.alloc(Node::leaf(Vec::new()));
        Ok(Self {
            crs: config.crs().map(Arc::from),
            config,
            arena,
            root,
            size: 0,
        })
    }

    /// Assembles a tree from an already built arena.
    pub(crate) fn from_parts(
        config: RTreeConfig,
        arena: NodeArena,
        root: NodeId,
        size: usize,
    ) -> Self {
        Self {
            crs: config.crs().map(Arc::from),
            config,
            arena,
            root,
            size,
        }
    }

    pub fn config(&self) -> &RTreeConfig {
        &self.config
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension()
    }

    pub fn max_fanout(&self) -> usize {
        self.config.max_fanout()
    }

    pub fn min_fanout(&self) -> usize {
        self.config.min_fanout()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.arena.get(id)
    }

    /// Number of levels from the root down to the leaves.
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut current = self.root;
        while let NodeKind::Internal(children) = &self.arena[current].kind {
            match children.first() {
                Some(&child) => current = child,
                None => break,
            }
            height += 1;
        }
        height
    }

    /// Removes every entry, leaving an empty root leaf.
    pub fn clear(&mut self) {
        self.arena = NodeArena::new();
        self.root = self.arena.alloc(Node::leaf(Vec::new()));
        self.size = 0;
    }

    /// Iterates over all entries in tree order.
    pub fn iter(&self) -> Entries<'_> {
        Entries {
            tree: self,
            stack: vec![self.root],
            current: [].iter(),
        }
    }

    // ------------------------------------------------------------------
    // Bounds
    // ------------------------------------------------------------------

    /// Bounds of the whole tree, `None` when empty.
    pub fn bounds(&self) -> Option<Envelope> {
        self.node_bounds(self.root).map(Cow::into_owned)
    }

    /// The bounds of a node: the cached value when valid, otherwise computed
    /// from the children without touching the cache.
    pub fn node_bounds(&self, id: NodeId) -> Option<Cow<'_, Envelope>> {
        match &self.arena[id].bounds {
            Some(bounds) => Some(Cow::Borrowed(bounds)),
            None => self.compute_bounds(id).map(Cow::Owned),
        }
    }

    /// Recomputes dirty bounds of a node (and of its dirty descendants),
    /// stores them and returns the now valid cached value.
    pub fn refresh_bounds(&mut self, id: NodeId) -> Option<&Envelope> {
        if self.arena[id].bounds.is_none() {
            let children = self.arena[id].children().to_vec();
            for child in children {
                self.refresh_bounds(child);
            }
            let computed = self.compute_bounds(id);
            self.arena[id].bounds = computed;
        }
        self.arena[id].bounds.as_ref()
    }

    /// Union of the direct children/entries, `None` for an empty node.
    pub(crate) fn compute_bounds(&self, id: NodeId) -> Option<Envelope> {
        match &self.arena[id].kind {
            NodeKind::Leaf(entries) => Envelope::union_all(entries.iter().map(|e| &e.envelope)),
            NodeKind::Internal(children) => {
                let mut bounds: Option<Envelope> = None;
                for &child in children {
                    if let Some(child_bounds) = self.node_bounds(child) {
                        bounds = Some(match bounds {
                            Some(mut acc) => {
                                acc.expand(&child_bounds);
                                acc
                            }
                            None => child_bounds.into_owned(),
                        });
                    }
                }
                bounds
            }
        }
    }

    /// Clears cached bounds from `id` up to the root.
    fn invalidate(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(node) = current {
            self.arena[node].bounds = None;
            current = self.arena[node].parent;
        }
    }

    // ------------------------------------------------------------------
    // Insert
    // ------------------------------------------------------------------

    /// Adds an entry. Fails with `DimensionMismatch` if the envelope does
    /// not have the tree's dimensionality.
    ///
    /// The stored envelope carries the tree's working coordinate system tag,
    /// or no tag when the tree has none. An envelope tagged with a different
    /// system is rejected with `InvalidEnvelope`.
    pub fn insert(&mut self, entry: Entry) -> IndexResult<()> {
        let envelope = self.stored_envelope(entry.envelope)?;
        self.insert_entry(Entry::new(envelope, entry.id));
        self.size += 1;
        Ok(())
    }

    /// Checks an envelope for storage and gives it the tree's tag.
    pub(crate) fn stored_envelope(&self, envelope: Envelope) -> IndexResult<Envelope> {
        envelope.check_dimension(self.dimension())?;
        if let (Some(tagged), Some(working)) = (envelope.crs(), self.config.crs()) {
            if tagged != working {
                return Err(IndexError::InvalidEnvelope(format!(
                    "envelope is in coordinate system {}, the tree works in {}",
                    tagged, working
                )));
            }
        }
        Ok(envelope.retagged(self.crs.as_ref()))
    }

    /// Places an entry in a leaf and splits upwards as needed; does not
    /// touch `size`.
    pub(crate) fn insert_entry(&mut self, entry: Entry) {
        let leaf = self.choose_leaf(&entry.envelope);
        self.arena[leaf].entries_mut().push(entry);
        self.invalidate(leaf);
        self.resolve_overflow(leaf);
    }

    /// Descends from the root picking the child needing the least area
    /// enlargement, ties going to the smallest resulting area.
    fn choose_leaf(&mut self, envelope: &Envelope) -> NodeId {
        let mut current = self.root;
        loop {
            let children = match &self.arena[current].kind {
                NodeKind::Leaf(_) => return current,
                NodeKind::Internal(children) => children.clone(),
            };

            let mut best: Option<(NodeId, f64, f64)> = None;
            for child in children {
                let bounds = self
                    .refresh_bounds(child)
                    .expect("non-root nodes are never empty");
                let enlargement = bounds.enlargement(envelope);
                let area = bounds.area() + enlargement;
                let better = match best {
                    None => true,
                    Some((_, best_enlargement, best_area)) => {
                        enlargement < best_enlargement
                            || (enlargement == best_enlargement && area < best_area)
                    }
                };
                if better {
                    best = Some((child, enlargement, area));
                }
            }

            current = best.expect("internal nodes always have children").0;
        }
    }

    /// Splits `node` while it overflows, pushing the new siblings upwards and
    /// growing a new root when the old one splits.
    fn resolve_overflow(&mut self, mut node: NodeId) {
        while self.arena[node].fanout() > self.max_fanout() {
            let sibling = self.split_node(node);
            match self.arena[node].parent {
                Some(parent) => {
                    self.arena[sibling].parent = Some(parent);
                    self.arena[parent].children_mut().push(sibling);
                    self.invalidate(parent);
                    node = parent;
                }
                None => {
                    let root = self.arena.alloc(Node::internal(vec![node, sibling]));
                    self.arena[node].parent = Some(root);
                    self.arena[sibling].parent = Some(root);
                    self.root = root;
                    break;
                }
            }
        }
    }

    /// Divides an overflowing node. The node keeps the first group, a newly
    /// allocated sibling of the same kind receives the second; both get fresh
    /// bounds. Returns the sibling, which is not yet attached to a parent.
    fn split_node(&mut self, id: NodeId) -> NodeId {
        let kind = std::mem::replace(&mut self.arena[id].kind, NodeKind::Leaf(Vec::new()));
        match kind {
            NodeKind::Leaf(entries) => {
                let boxes: Vec<Envelope> = entries.iter().map(|e| e.envelope.clone()).collect();
                let partition = self.plan_split(&boxes);
                let (first, second) = distribute(entries, &partition);

                self.arena[id].kind = NodeKind::Leaf(first);
                self.arena[id].bounds = group_bounds(&boxes, &partition.first);

                let mut sibling = Node::leaf(second);
                sibling.bounds = group_bounds(&boxes, &partition.second);
                self.arena.alloc(sibling)
            }
            NodeKind::Internal(children) => {
                let boxes: Vec<Envelope> = children
                    .iter()
                    .map(|&child| {
                        self.refresh_bounds(child)
                            .cloned()
                            .expect("non-root nodes are never empty")
                    })
                    .collect();
                let partition = self.plan_split(&boxes);
                let (first, second) = distribute(children, &partition);

                self.arena[id].kind = NodeKind::Internal(first);
                self.arena[id].bounds = group_bounds(&boxes, &partition.first);

                let moved = second.clone();
                let mut sibling = Node::internal(second);
                sibling.bounds = group_bounds(&boxes, &partition.second);
                let sibling = self.arena.alloc(sibling);
                for child in moved {
                    self.arena[child].parent = Some(sibling);
                }
                sibling
            }
        }
    }

    fn plan_split(&self, boxes: &[Envelope]) -> Partition {
        let splitter = self.config.splitter();
        let partition = splitter.partition(boxes, self.min_fanout());
        assert!(
            partition.is_valid(boxes.len(), self.min_fanout()),
            "split strategy '{}' returned an invalid partition",
            splitter.name()
        );
        partition
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    /// Visits every entry whose envelope intersects `query`.
    ///
    /// Subtrees whose bounds miss the query are skipped. Sibling order is
    /// unspecified. The visitor can end the traversal early by returning
    /// `ControlFlow::Break`.
    pub fn search(&self, query: &Envelope, visitor: &mut dyn Visitor) -> IndexResult<()> {
        query.check_dimension(self.dimension())?;
        let accept = |envelope: &Envelope| envelope.intersects(query);
        let _ = self.visit_matching(self.root, query, &accept, visitor);
        Ok(())
    }

    /// All entries intersecting `query`.
    pub fn search_collect(&self, query: &Envelope) -> IndexResult<Vec<Entry>> {
        let mut visitor = CollectingVisitor::new();
        self.search(query, &mut visitor)?;
        Ok(visitor.into_entries())
    }

    /// Number of entries intersecting `query`.
    pub fn count(&self, query: &Envelope) -> IndexResult<usize> {
        let mut visitor = CountingVisitor::new();
        self.search(query, &mut visitor)?;
        Ok(visitor.count())
    }

    /// Visits every entry whose envelope lies entirely inside `query`.
    pub fn search_contained(&self, query: &Envelope, visitor: &mut dyn Visitor) -> IndexResult<()> {
        query.check_dimension(self.dimension())?;
        // a contained entry can sit in a child that only partially overlaps
        let accept = |envelope: &Envelope| query.contains(envelope);
        let _ = self.visit_matching(self.root, query, &accept, visitor);
        Ok(())
    }

    pub fn search_contained_collect(&self, query: &Envelope) -> IndexResult<Vec<Entry>> {
        let mut visitor = CollectingVisitor::new();
        self.search_contained(query, &mut visitor)?;
        Ok(visitor.into_entries())
    }

    fn visit_matching(
        &self,
        id: NodeId,
        query: &Envelope,
        accept: &dyn Fn(&Envelope) -> bool,
        visitor: &mut dyn Visitor,
    ) -> ControlFlow<()> {
        match &self.arena[id].kind {
            NodeKind::Leaf(entries) => {
                for entry in entries {
                    if accept(&entry.envelope) {
                        visitor.visit(entry)?;
                    }
                }
            }
            NodeKind::Internal(children) => {
                for &child in children {
                    let overlaps = self
                        .node_bounds(child)
                        .is_some_and(|bounds| bounds.intersects(query));
                    if overlaps {
                        self.visit_matching(child, query, accept, visitor)?;
                    }
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// The `k` entries nearest to `point`, closest first, as
    /// `(entry, distance)` pairs. Distance is measured to the nearest point
    /// of each entry's envelope (zero when the point is inside). Entries
    /// further away than `max_distance` are ignored; a negative or NaN
    /// `max_distance` matches nothing.
    pub fn nearest(
        &self,
        point: &[f64],
        k: usize,
        max_distance: Option<f64>,
    ) -> IndexResult<Vec<(Entry, f64)>> {
        if point.len() != self.dimension() {
            return Err(IndexError::dimension_mismatch(self.dimension(), point.len()));
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        if max_distance.is_some_and(|d| d.is_nan() || d < 0.0) {
            return Ok(Vec::new());
        }

        let limit = max_distance.map_or(f64::INFINITY, |d| d * d);
        let mut queue = BinaryHeap::new();
        queue.push(Candidate {
            distance_sq: 0.0,
            item: Item::Node(self.root),
        });

        let mut results = Vec::with_capacity(k.min(self.size));
        while let Some(Candidate { distance_sq, item }) = queue.pop() {
            if distance_sq > limit {
                break;
            }
            match item {
                Item::Entry(entry) => {
                    results.push((entry.clone(), distance_sq.sqrt()));
                    if results.len() == k {
                        break;
                    }
                }
                Item::Node(id) => match &self.arena[id].kind {
                    NodeKind::Leaf(entries) => {
                        for entry in entries {
                            let distance_sq = entry.envelope.min_distance_sq(point);
                            if distance_sq <= limit {
                                queue.push(Candidate {
                                    distance_sq,
                                    item: Item::Entry(entry),
                                });
                            }
                        }
                    }
                    NodeKind::Internal(children) => {
                        for &child in children {
                            if let Some(bounds) = self.node_bounds(child) {
                                let distance_sq = bounds.min_distance_sq(point);
                                if distance_sq <= limit {
                                    queue.push(Candidate {
                                        distance_sq,
                                        item: Item::Node(child),
                                    });
                                }
                            }
                        }
                    }
                },
            }
        }
        Ok(results)
    }

    // ------------------------------------------------------------------
    // Remove
    // ------------------------------------------------------------------

    /// Removes one entry matching `criterion`.
    ///
    /// Returns `Ok(false)` and leaves the tree untouched when nothing
    /// matches. Leaves that drop below the minimum fanout are dissolved and
    /// their surviving entries reinserted from the root.
    pub fn remove(&mut self, criterion: &RemoveCriterion) -> IndexResult<bool> {
        if let Some(envelope) = criterion.envelope() {
            envelope.check_dimension(self.dimension())?;
        }

        let Some((leaf, position)) = self.find_entry(self.root, criterion) else {
            return Ok(false);
        };

        self.arena[leaf].entries_mut().remove(position);
        self.size -= 1;
        self.invalidate(leaf);
        self.condense(leaf);
        Ok(true)
    }

    /// Removes the entry with this exact envelope and id.
    pub fn remove_entry(&mut self, entry: &Entry) -> IndexResult<bool> {
        self.remove(&RemoveCriterion::Exact(entry.clone()))
    }

    /// Removes one entry carrying `id`.
    pub fn remove_id(&mut self, id: EntryId) -> IndexResult<bool> {
        self.remove(&RemoveCriterion::Id(id))
    }

    fn find_entry(&self, id: NodeId, criterion: &RemoveCriterion) -> Option<(NodeId, usize)> {
        match &self.arena[id].kind {
            NodeKind::Leaf(entries) => entries
                .iter()
                .position(|entry| criterion.matches(entry))
                .map(|position| (id, position)),
            NodeKind::Internal(children) => children.iter().find_map(|&child| {
                if let Some(envelope) = criterion.envelope() {
                    // an entry lies inside the bounds of every ancestor
                    let covers = self
                        .node_bounds(child)
                        .is_some_and(|bounds| bounds.contains(envelope));
                    if !covers {
                        return None;
                    }
                }
                self.find_entry(child, criterion)
            }),
        }
    }

    /// Walks from a shrunken leaf to the root, dissolving every non-root node
    /// below the minimum fanout, then collapses single-child roots and
    /// reinserts the orphaned entries.
    fn condense(&mut self, start: NodeId) {
        let min_fanout = self.min_fanout();
        let mut orphans = Vec::new();
        let mut current = start;

        while let Some(parent) = self.arena[current].parent {
            if self.arena[current].fanout() < min_fanout {
                let siblings = self.arena[parent].children_mut();
                let position = siblings
                    .iter()
                    .position(|&child| child == current)
                    .expect("a child is listed by its parent");
                siblings.remove(position);
                self.invalidate(parent);
                self.release_subtree(current, &mut orphans);
            }
            current = parent;
        }

        self.shrink_root();
        for entry in orphans {
            self.insert_entry(entry);
        }
    }

    /// Frees a detached subtree, collecting its entries.
    fn release_subtree(&mut self, id: NodeId, out: &mut Vec<Entry>) {
        match self.arena.release(id).kind {
            NodeKind::Leaf(entries) => out.extend(entries),
            NodeKind::Internal(children) => {
                for child in children {
                    self.release_subtree(child, out);
                }
            }
        }
    }

    /// Replaces an internal root that has one child by that child, and an
    /// internal root with no children by an empty leaf.
    fn shrink_root(&mut self) {
        loop {
            let root = self.root;
            let only_child = match &self.arena[root].kind {
                NodeKind::Internal(children) if children.is_empty() => {
                    self.arena[root].kind = NodeKind::Leaf(Vec::new());
                    self.arena[root].bounds = None;
                    return;
                }
                NodeKind::Internal(children) if children.len() == 1 => children[0],
                _ => return,
            };
            self.arena.release(root);
            self.arena[only_child].parent = None;
            self.root = only_child;
        }
    }

    // ------------------------------------------------------------------
    // Statistics
    // ------------------------------------------------------------------

    pub fn stats(&self) -> RTreeStats {
        let mut node_count = 0u64;
        let mut leaf_count = 0u64;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            node_count += 1;
            match &self.arena[id].kind {
                NodeKind::Leaf(_) => leaf_count += 1,
                NodeKind::Internal(children) => stack.extend(children.iter().copied()),
            }
        }

        let leaf_fill_ratio = if leaf_count > 0 && self.size > 0 {
            self.size as f64 / (leaf_count as f64 * self.max_fanout() as f64)
        } else {
            0.0
        };

        RTreeStats {
            total_entries: self.size as u64,
            node_count,
            leaf_count,
            tree_height: self.height() as u32,
            dimension: self.dimension(),
            max_fanout: self.max_fanout(),
            min_fanout: self.min_fanout(),
            leaf_fill_ratio,
        }
    }
}

impl fmt::Debug for RTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RTree")
            .field("config", &self.config)
            .field("size", &self.size)
            .field("height", &self.height())
            .field("nodes", &self.arena.len())
            .finish()
    }
}

impl<'a> IntoIterator for &'a RTree {
    type Item = &'a Entry;
    type IntoIter = Entries<'a>;

    fn into_iter(self) -> Entries<'a> {
        self.iter()
    }
}

/// Iterator over all entries of a tree, see [`RTree::iter`].
pub struct Entries<'a> {
    tree: &'a RTree,
    stack: Vec<NodeId>,
    current: std::slice::Iter<'a, Entry>,
}

impl<'a> Iterator for Entries<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<&'a Entry> {
        loop {
            if let Some(entry) = self.current.next() {
                return Some(entry);
            }
            let id = self.stack.pop()?;
            let tree = self.tree;
            match &tree.arena[id].kind {
                NodeKind::Leaf(entries) => self.current = entries.iter(),
                NodeKind::Internal(children) => self.stack.extend(children.iter().rev()),
            }
        }
    }
}

/// Splits `items` into the two groups named by `partition`.
fn distribute<T>(items: Vec<T>, partition: &Partition) -> (Vec<T>, Vec<T>) {
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut take = |indices: &[usize]| -> Vec<T> {
        indices
            .iter()
            .map(|&i| slots[i].take().expect("partition indices are unique"))
            .collect()
    };
    let first = take(&partition.first);
    let second = take(&partition.second);
    (first, second)
}

fn group_bounds(boxes: &[Envelope], group: &[usize]) -> Option<Envelope> {
    Envelope::union_all(group.iter().map(|&i| &boxes[i]))
}

enum Item<'a> {
    Node(NodeId),
    Entry(&'a Entry),
}

/// Nearest-first queue element.
struct Candidate<'a> {
    distance_sq: f64,
    item: Item<'a>,
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.distance_sq.total_cmp(&other.distance_sq) == Ordering::Equal
    }
}

impl Eq for Candidate<'_> {}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate<'_> {
    // reversed: BinaryHeap is a max-heap
    fn cmp(&self, other: &Self) -> Ordering {
        other.distance_sq.total_cmp(&self.distance_sq)
    }
}
