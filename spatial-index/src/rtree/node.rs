//! Arena-allocated tree nodes.
//!
//! Nodes live in a [`NodeArena`] and refer to each other by [`NodeId`]. The
//! parent link is a plain index used to walk towards the root when cached
//! bounds must be invalidated; ownership of every node stays with the arena.

use std::ops::{Index, IndexMut};

use crate::entry::Entry;
use crate::envelope::Envelope;

/// Handle of a node inside a tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Contents of a node: entries for a leaf, child handles for an internal node.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Leaf(Vec<Entry>),
    Internal(Vec<NodeId>),
}

/// A node of the R-tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) kind: NodeKind,
    /// Union of the children's envelopes; `None` when dirty or empty.
    pub(crate) bounds: Option<Envelope>,
    pub(crate) parent: Option<NodeId>,
}

impl Node {
    pub(crate) fn leaf(entries: Vec<Entry>) -> Self {
        Self {
            kind: NodeKind::Leaf(entries),
            bounds: None,
            parent: None,
        }
    }

    pub(crate) fn internal(children: Vec<NodeId>) -> Self {
        Self {
            kind: NodeKind::Internal(children),
            bounds: None,
            parent: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// Number of entries (leaf) or children (internal).
    pub fn fanout(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf(entries) => entries.len(),
            NodeKind::Internal(children) => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fanout() == 0
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The cached bounds, if they are currently valid.
    pub fn cached_bounds(&self) -> Option<&Envelope> {
        self.bounds.as_ref()
    }

    pub fn entries(&self) -> &[Entry] {
        match &self.kind {
            NodeKind::Leaf(entries) => entries,
            NodeKind::Internal(_) => &[],
        }
    }

    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Internal(children) => children,
            NodeKind::Leaf(_) => &[],
        }
    }

    pub(crate) fn entries_mut(&mut self) -> &mut Vec<Entry> {
        match &mut self.kind {
            NodeKind::Leaf(entries) => entries,
            NodeKind::Internal(_) => unreachable!("internal node has no entries"),
        }
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<NodeId> {
        match &mut self.kind {
            NodeKind::Internal(children) => children,
            NodeKind::Leaf(_) => unreachable!("leaf node has no children"),
        }
    }
}

/// Slot storage for nodes with free-slot reuse.
#[derive(Debug, Clone, Default)]
pub(crate) struct NodeArena {
    slots: Vec<Option<Node>>,
    free: Vec<usize>,
}

impl NodeArena {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                debug_assert!(self.slots[index].is_none());
                self.slots[index] = Some(node);
                NodeId(index)
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Frees a slot and hands back its node.
    pub(crate) fn release(&mut self, id: NodeId) -> Node {
        let node = self.slots[id.0]
            .take()
            .unwrap_or_else(|| panic!("double release of node {:?}", id));
        self.free.push(id.0);
        node
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}

impl Index<NodeId> for NodeArena {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        self.slots[id.0]
            .as_ref()
            .unwrap_or_else(|| panic!("dangling node handle {:?}", id))
    }
}

impl IndexMut<NodeId> for NodeArena {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        self.slots[id.0]
            .as_mut()
            .unwrap_or_else(|| panic!("dangling node handle {:?}", id))
    }
}
