//! # Spatial Index - N-dimensional R*-tree
//!
//! This crate provides a bounding-box spatial index of the R-tree family:
//! "which stored regions overlap this query region" in logarithmic time,
//! with a compact binary snapshot format so an index does not have to be
//! rebuilt on every process start.
//!
//! ## Features
//!
//! - **Any Dimension**: envelopes with 1 to 65535 axes
//! - **R\* Splits**: margin/overlap/area split heuristics, Guttman's quadratic split as an alternative
//! - **Cached Bounds**: node bounds are cleared on mutation and recomputed on the next read
//! - **Visitors**: callbacks per match with early termination
//! - **Snapshots**: versioned little-endian file format preserving the exact tree topology
//! - **Thread Safe Handle**: `SharedRTree` for concurrent readers and a single writer
//! - **Named Entries**: string-keyed facade with coordinate system normalization
//!
//! ## Quick Start
//!
//! ```rust
//! use spatial_index::{Entry, Envelope, RTree, RemoveCriterion};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tree = RTree::new(2, 10)?;
//! tree.insert(Entry::new(Envelope::new_2d(5.0, 10.0, 10.0, 15.0)?, 1))?;
//! tree.insert(Entry::new(Envelope::new_2d(30.0, 0.0, 50.0, 15.0)?, 2))?;
//!
//! let query = Envelope::new_2d(-20.0, -20.0, 20.0, 20.0)?;
//! let hits = tree.search_collect(&query)?;
//! assert_eq!(hits.len(), 1);
//!
//! assert!(tree.remove(&RemoveCriterion::Id(2))?);
//! assert_eq!(tree.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Persistence
//!
//! ```rust,no_run
//! use spatial_index::RTree;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tree = RTree::new(3, 16)?;
//! tree.save("regions.rtree")?;
//! let restored = RTree::load("regions.rtree")?;
//! assert_eq!(restored.dimension(), 3);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entry;
pub mod envelope;
pub mod errors;
pub mod named;
pub mod persistence;
pub mod rtree;
pub mod store;
pub mod visitor;

// Re-export core types
pub use config::{RTreeConfig, DEFAULT_MAX_FANOUT};
pub use entry::{Entry, EntryId, NamedEnvelope};
pub use envelope::Envelope;
pub use errors::{IndexError, IndexResult};

// Re-export tree types
pub use rtree::{
    Entries, IntegrityReport, Node, NodeId, NodeKind, Partition, QuadraticSplit, RTree,
    RTreeStats, RemoveCriterion, SplitStrategy, StarSplit,
};
pub use visitor::{CollectingVisitor, CountingVisitor, LimitVisitor, Visitor};

// Re-export persistence
pub use persistence::{read_tree, write_tree, TreeReader, TreeWriter};

// Re-export the shared handle and the search-engine boundary
pub use named::{CrsTransform, NamedIndex};
pub use store::{SharedRTree, SpatialIndex};
