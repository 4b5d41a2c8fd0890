//! On-disk layout.
//!
//! All scalars are little endian with fixed width (`bincode` legacy
//! configuration).
//!
//! ```text
//! MAGIC(4) | VERSION(u16) | DIMENSION(u16) | MAX_FANOUT(u32) | ENTRY_COUNT(u64)
//! MIN_FANOUT(u32) | CRS_LEN(u16) | CRS(utf8, CRS_LEN bytes)
//! NODE_STREAM
//! ```
//!
//! The node stream is the root record; records nest in pre-order:
//!
//! ```text
//! KIND(u8) | LOWER[D](f64) | UPPER[D](f64) | COUNT(u32) | items
//! ```
//!
//! A leaf's items are `ID(u64) | LOWER[D] | UPPER[D]`, an internal node's
//! items are its child records. An empty root leaf stores zero bounds.

use bincode::config::{Configuration, Fixint, LittleEndian, NoLimit};
use serde::{Deserialize, Serialize};

/// File signature
pub const MAGIC: [u8; 4] = *b"SPRT";

/// Current format version
pub const FORMAT_VERSION: u16 = 1;

pub const NODE_LEAF: u8 = 0;
pub const NODE_INTERNAL: u8 = 1;

/// Deepest node nesting accepted by the reader
pub const MAX_NODE_DEPTH: usize = 64;

pub(crate) type Codec = Configuration<LittleEndian, Fixint, NoLimit>;

pub(crate) fn codec() -> Codec {
    bincode::config::legacy()
}

/// Fixed part of the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct FileHeader {
    pub magic: [u8; 4],
    pub version: u16,
    pub dimension: u16,
    pub max_fanout: u32,
    pub entry_count: u64,
}

/// Header fields following the fixed part; the CRS bytes come right after.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct HeaderExtension {
    pub min_fanout: u32,
    pub crs_len: u16,
}

/// Size in bytes of `FileHeader` followed by `HeaderExtension`.
pub const HEADER_LEN: usize = 4 + 2 + 2 + 4 + 8 + 4 + 2;
