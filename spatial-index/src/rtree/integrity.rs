//! Structural self-check of a tree.

use std::collections::HashSet;

use super::node::{NodeId, NodeKind};
use super::tree::RTree;

/// Result of [`RTree::check_integrity`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrityReport {
    pub nodes_checked: u64,
    pub entries_checked: u64,
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    fn new() -> Self {
        Self {
            is_valid: true,
            ..Default::default()
        }
    }

    fn fail(&mut self, message: String) {
        self.is_valid = false;
        self.errors.push(message);
    }
}

struct Walk {
    report: IntegrityReport,
    visited: HashSet<NodeId>,
    leaf_depth: Option<usize>,
}

impl RTree {
    /// Walks the whole tree and reports every broken invariant: parent
    /// links, fanout bounds, equal leaf depth, cached bounds that differ
    /// from the union of their children, entry dimensions, the entry count
    /// and unreachable nodes.
    pub fn check_integrity(&self) -> IntegrityReport {
        let mut walk = Walk {
            report: IntegrityReport::new(),
            visited: HashSet::new(),
            leaf_depth: None,
        };

        if self.node(self.root()).is_none() {
            walk.report.fail(format!("root {:?} is not allocated", self.root()));
            return walk.report;
        }
        self.check_node(self.root(), None, 1, &mut walk);

        let mut report = walk.report;
        if report.entries_checked != self.len() as u64 {
            report.fail(format!(
                "tree reports {} entries but {} are reachable",
                self.len(),
                report.entries_checked
            ));
        }
        if walk.visited.len() != self.arena.len() {
            report.fail(format!(
                "{} nodes are allocated but {} are reachable",
                self.arena.len(),
                walk.visited.len()
            ));
        }
        report
    }

    fn check_node(&self, id: NodeId, parent: Option<NodeId>, depth: usize, walk: &mut Walk) {
        if !walk.visited.insert(id) {
            walk.report.fail(format!("node {:?} is reachable more than once", id));
            return;
        }
        let Some(node) = self.node(id) else {
            walk.report.fail(format!("node {:?} is not allocated", id));
            return;
        };
        walk.report.nodes_checked += 1;

        if node.parent() != parent {
            walk.report.fail(format!(
                "node {:?} links to parent {:?}, expected {:?}",
                id,
                node.parent(),
                parent
            ));
        }

        let fanout = node.fanout();
        let is_root = parent.is_none();
        if fanout > self.max_fanout() {
            walk.report.fail(format!(
                "node {:?} holds {} items, max is {}",
                id,
                fanout,
                self.max_fanout()
            ));
        }
        if !is_root && fanout < self.min_fanout() {
            walk.report.fail(format!(
                "node {:?} holds {} items, min is {}",
                id,
                fanout,
                self.min_fanout()
            ));
        }
        if is_root && !node.is_leaf() && fanout == 0 {
            walk.report.fail("internal root has no children".to_string());
        }

        if let Some(cached) = node.cached_bounds() {
            match self.compute_bounds(id) {
                Some(actual) if actual.same_bounds(cached) => {}
                actual => walk.report.fail(format!(
                    "node {:?} caches bounds {} but its children cover {:?}",
                    id, cached, actual
                )),
            }
            for &child in node.children() {
                let child_cached = self
                    .node(child)
                    .is_some_and(|c| c.cached_bounds().is_some());
                if !child_cached {
                    walk.report.fail(format!(
                        "node {:?} has cached bounds above dirty child {:?}",
                        id, child
                    ));
                }
            }
        }

        match &node.kind {
            NodeKind::Leaf(entries) => {
                match walk.leaf_depth {
                    None => walk.leaf_depth = Some(depth),
                    Some(expected) if expected != depth => walk.report.fail(format!(
                        "leaf {:?} at depth {}, other leaves at depth {}",
                        id, depth, expected
                    )),
                    Some(_) => {}
                }
                for entry in entries {
                    walk.report.entries_checked += 1;
                    if entry.envelope.dimension() != self.dimension() {
                        walk.report.fail(format!(
                            "entry {} in leaf {:?} has dimension {}",
                            entry.id,
                            id,
                            entry.envelope.dimension()
                        ));
                    }
                }
            }
            NodeKind::Internal(children) => {
                for &child in children {
                    self.check_node(child, Some(id), depth + 1, walk);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::entry::Entry;
    use crate::envelope::Envelope;
    use crate::rtree::tree::RTree;

    fn filled(count: u64) -> RTree {
        let mut tree = RTree::new(2, 4).unwrap();
        for id in 0..count {
            let x = id as f64;
            let envelope = Envelope::new_2d(x, x, x + 1.0, x + 1.0).unwrap();
            tree.insert(Entry::new(envelope, id)).unwrap();
        }
        tree
    }

    #[test]
    fn test_valid_tree() {
        let tree = filled(40);
        let report = tree.check_integrity();
        assert!(report.is_valid, "{:?}", report.errors);
        assert_eq!(report.entries_checked, 40);
        assert_eq!(report.nodes_checked, tree.stats().node_count);
    }

    #[test]
    fn test_detects_stale_bounds() {
        let mut tree = filled(40);
        let root = tree.root();
        tree.refresh_bounds(root);
        let leaf = {
            let mut current = root;
            while !tree.arena[current].is_leaf() {
                current = tree.arena[current].children()[0];
            }
            current
        };
        tree.arena[leaf].bounds = Some(Envelope::new_2d(-9.0, -9.0, -8.0, -8.0).unwrap());

        let report = tree.check_integrity();
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("caches bounds")));
    }

    #[test]
    fn test_detects_overfull_node() {
        let mut tree = filled(3);
        let root = tree.root();
        for id in 10..13 {
            let envelope = Envelope::new_2d(0.0, 0.0, 1.0, 1.0).unwrap();
            tree.arena[root].entries_mut().push(Entry::new(envelope, id));
        }
        let report = tree.check_integrity();
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("max is 4")));
        assert!(report.errors.iter().any(|e| e.contains("reachable")));
    }

    #[test]
    fn test_detects_broken_parent_link() {
        let mut tree = filled(20);
        let root = tree.root();
        let child = tree.arena[root].children()[0];
        tree.arena[child].parent = None;
        let report = tree.check_integrity();
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.contains("links to parent")));
    }
}
