use std::io::Write;

use serde::Serialize;

use crate::errors::IndexResult;
use crate::rtree::{NodeId, NodeKind, RTree};

use super::format::{codec, FileHeader, HeaderExtension, FORMAT_VERSION, MAGIC, NODE_INTERNAL, NODE_LEAF};

/// Serializes a tree into a byte sink.
///
/// The writer reads bounds through [`RTree::node_bounds`], so a tree with
/// dirty caches can be written from a shared reference.
pub struct TreeWriter<W> {
    sink: W,
    nodes_written: u64,
}

impl<W: Write> TreeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            nodes_written: 0,
        }
    }

    /// Writes the header followed by the whole node stream.
    pub fn write(&mut self, tree: &RTree) -> IndexResult<()> {
        let config = tree.config();
        let crs = config.crs().unwrap_or_default().as_bytes();

        self.put(FileHeader {
            magic: MAGIC,
            version: FORMAT_VERSION,
            dimension: tree.dimension() as u16,
            max_fanout: tree.max_fanout() as u32,
            entry_count: tree.len() as u64,
        })?;
        self.put(HeaderExtension {
            min_fanout: tree.min_fanout() as u32,
            crs_len: crs.len() as u16,
        })?;
        self.sink.write_all(crs)?;

        self.nodes_written = 0;
        self.write_node(tree, tree.root())?;
        self.sink.flush()?;

        log::trace!(
            "wrote {} nodes holding {} entries",
            self.nodes_written,
            tree.len()
        );
        Ok(())
    }

    /// Nodes emitted by the last [`write`](Self::write).
    pub fn nodes_written(&self) -> u64 {
        self.nodes_written
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn write_node(&mut self, tree: &RTree, id: NodeId) -> IndexResult<()> {
        let node = &tree.arena[id];
        self.nodes_written += 1;

        let kind = if node.is_leaf() { NODE_LEAF } else { NODE_INTERNAL };
        self.put(kind)?;
        match tree.node_bounds(id) {
            Some(bounds) => {
                self.put_coords(bounds.lower())?;
                self.put_coords(bounds.upper())?;
            }
            None => {
                for _ in 0..2 * tree.dimension() {
                    self.put(0.0f64)?;
                }
            }
        }
        self.put(node.fanout() as u32)?;

        match &node.kind {
            NodeKind::Leaf(entries) => {
                for entry in entries {
                    self.put(entry.id)?;
                    self.put_coords(entry.envelope.lower())?;
                    self.put_coords(entry.envelope.upper())?;
                }
            }
            NodeKind::Internal(children) => {
                for &child in children {
                    self.write_node(tree, child)?;
                }
            }
        }
        Ok(())
    }

    fn put_coords(&mut self, coords: &[f64]) -> IndexResult<()> {
        for coord in coords {
            self.put(*coord)?;
        }
        Ok(())
    }

    fn put<T: Serialize>(&mut self, value: T) -> IndexResult<()> {
        bincode::serde::encode_into_std_write(value, &mut self.sink, codec())?;
        Ok(())
    }
}
