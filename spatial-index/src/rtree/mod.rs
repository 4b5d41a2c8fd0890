pub mod integrity;
pub mod node;
pub mod split;
pub mod tree;

pub use integrity::IntegrityReport;
pub use node::{Node, NodeId, NodeKind};
pub use split::{Partition, QuadraticSplit, SplitStrategy, StarSplit};
pub use tree::{Entries, RTree, RTreeStats, RemoveCriterion};
