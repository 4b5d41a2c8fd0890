use std::io::{self, Read};
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::RTreeConfig;
use crate::entry::Entry;
use crate::envelope::Envelope;
use crate::errors::{IndexError, IndexResult};
use crate::rtree::node::{Node, NodeArena, NodeId};
use crate::rtree::RTree;

use super::format::{
    codec, FileHeader, HeaderExtension, FORMAT_VERSION, MAGIC, MAX_NODE_DEPTH, NODE_INTERNAL,
    NODE_LEAF,
};

fn corrupt(message: impl Into<String>) -> IndexError {
    IndexError::CorruptIndex(message.into())
}

/// Parameters of the stream being decoded.
struct Layout {
    dimension: usize,
    max_fanout: usize,
    /// Working coordinate system; entries are stored without their own tag.
    crs: Option<Arc<str>>,
}

/// Rebuilds a tree from a byte source written by
/// [`TreeWriter`](super::TreeWriter).
///
/// Every field is validated: header constants, node kinds and counts, entry
/// envelopes, and stored node bounds, which must equal the union of what the
/// node holds. The finished tree must then pass
/// [`RTree::check_integrity`]. Any failure yields
/// [`IndexError::CorruptIndex`] and no tree.
///
/// The split strategy is not part of the format; loaded trees use the
/// default one.
pub struct TreeReader<R> {
    source: R,
    nodes_read: u64,
}

impl<R: Read> TreeReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            nodes_read: 0,
        }
    }

    pub fn read(&mut self) -> IndexResult<RTree> {
        let header: FileHeader = self.get()?;
        if header.magic != MAGIC {
            return Err(corrupt(format!("bad magic {:?}", header.magic)));
        }
        if header.version != FORMAT_VERSION {
            return Err(corrupt(format!(
                "unsupported format version {}",
                header.version
            )));
        }
        let extension: HeaderExtension = self.get()?;
        let mut crs = vec![0u8; extension.crs_len as usize];
        self.fill(&mut crs)?;
        let crs = String::from_utf8(crs)
            .map_err(|_| corrupt("coordinate system id is not valid utf-8"))?;

        let mut config = RTreeConfig::new(header.dimension as usize)
            .with_max_fanout(header.max_fanout as usize)
            .with_min_fanout(extension.min_fanout as usize);
        if !crs.is_empty() {
            config = config.with_crs(crs);
        }
        config
            .validate()
            .map_err(|e| corrupt(format!("invalid header: {}", e)))?;
        let size = usize::try_from(header.entry_count)
            .map_err(|_| corrupt("entry count does not fit in memory"))?;

        let layout = Layout {
            dimension: config.dimension(),
            max_fanout: config.max_fanout(),
            crs: config.crs().map(Arc::from),
        };
        let mut arena = NodeArena::new();
        self.nodes_read = 0;
        let root = self.read_node(&mut arena, &layout, None, 0)?;

        let tree = RTree::from_parts(config, arena, root, size);
        let report = tree.check_integrity();
        if !report.is_valid {
            return Err(corrupt(report.errors.join("; ")));
        }

        log::trace!(
            "read {} nodes holding {} entries",
            self.nodes_read,
            tree.len()
        );
        Ok(tree)
    }

    /// Nodes decoded by the last [`read`](Self::read).
    pub fn nodes_read(&self) -> u64 {
        self.nodes_read
    }

    pub fn into_inner(self) -> R {
        self.source
    }

    fn read_node(
        &mut self,
        arena: &mut NodeArena,
        layout: &Layout,
        parent: Option<NodeId>,
        depth: usize,
    ) -> IndexResult<NodeId> {
        if depth >= MAX_NODE_DEPTH {
            return Err(corrupt(format!("nodes nested deeper than {}", MAX_NODE_DEPTH)));
        }

        let kind: u8 = self.get()?;
        let stored_lower = self.get_coords(layout.dimension)?;
        let stored_upper = self.get_coords(layout.dimension)?;
        let count: u32 = self.get()?;
        let count = count as usize;
        if count > layout.max_fanout {
            return Err(corrupt(format!(
                "node holds {} items, max fanout is {}",
                count, layout.max_fanout
            )));
        }
        self.nodes_read += 1;

        let id = match kind {
            NODE_LEAF => {
                let mut entries = Vec::new();
                for _ in 0..count {
                    let entry_id: u64 = self.get()?;
                    let lower = self.get_coords(layout.dimension)?;
                    let upper = self.get_coords(layout.dimension)?;
                    let envelope = Envelope::new(lower, upper)
                        .map_err(|e| corrupt(format!("entry {}: {}", entry_id, e)))?
                        .retagged(layout.crs.as_ref());
                    entries.push(Entry::new(envelope, entry_id));
                }
                arena.alloc(Node::leaf(entries))
            }
            NODE_INTERNAL => {
                let id = arena.alloc(Node::internal(Vec::new()));
                for _ in 0..count {
                    let child = self.read_node(arena, layout, Some(id), depth + 1)?;
                    arena[id].children_mut().push(child);
                }
                id
            }
            other => return Err(corrupt(format!("unknown node kind {}", other))),
        };
        arena[id].parent = parent;

        let computed = {
            let node = &arena[id];
            let child_bounds = node
                .children()
                .iter()
                .filter_map(|&child| arena[child].bounds.as_ref());
            let entry_bounds = node.entries().iter().map(|e| &e.envelope);
            Envelope::union_all(child_bounds.chain(entry_bounds))
        };
        match computed {
            Some(bounds) => {
                if bounds.lower() != stored_lower.as_slice()
                    || bounds.upper() != stored_upper.as_slice()
                {
                    return Err(corrupt(format!(
                        "stored node bounds differ from the union of its contents {}",
                        bounds
                    )));
                }
                arena[id].bounds = Some(bounds);
            }
            None => {
                if stored_lower.iter().chain(&stored_upper).any(|&c| c != 0.0) {
                    return Err(corrupt("empty node with non-zero bounds"));
                }
            }
        }
        Ok(id)
    }

    fn get_coords(&mut self, dimension: usize) -> IndexResult<Vec<f64>> {
        (0..dimension).map(|_| self.get::<f64>()).collect()
    }

    fn get<T: DeserializeOwned>(&mut self) -> IndexResult<T> {
        Ok(bincode::serde::decode_from_std_read(&mut self.source, codec())?)
    }

    fn fill(&mut self, buffer: &mut [u8]) -> IndexResult<()> {
        self.source.read_exact(buffer).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => corrupt("unexpected end of stream"),
            _ => IndexError::Io(e),
        })
    }
}
