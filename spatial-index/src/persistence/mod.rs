//! Binary snapshot format.
//!
//! A snapshot captures the exact topology of a tree, so a tree read back has
//! the same nodes, the same leaf assignment and the same height as the one
//! written. See [`format`] for the layout.

pub mod format;
mod reader;
mod writer;

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::errors::{IndexError, IndexResult};
use crate::rtree::RTree;

pub use reader::TreeReader;
pub use writer::TreeWriter;

/// Writes a snapshot of `tree` to `sink`.
pub fn write_tree<W: Write>(tree: &RTree, sink: W) -> IndexResult<()> {
    TreeWriter::new(sink).write(tree)
}

/// Reads one snapshot from `source`. Bytes after the node stream are left
/// unread.
pub fn read_tree<R: Read>(source: R) -> IndexResult<RTree> {
    TreeReader::new(source).read()
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

impl RTree {
    /// Writes a snapshot to `path`.
    ///
    /// The bytes go to a sibling `.tmp` file which is synced and then renamed
    /// over `path`, so an interrupted save leaves the previous snapshot in
    /// place.
    pub fn save(&self, path: impl AsRef<Path>) -> IndexResult<()> {
        let path = path.as_ref();
        let staging = staging_path(path);

        let result = (|| -> IndexResult<()> {
            let file = File::create(&staging)?;
            let mut writer = TreeWriter::new(BufWriter::new(file));
            writer.write(self)?;
            let file = writer
                .into_inner()
                .into_inner()
                .map_err(|e| IndexError::Io(e.into_error()))?;
            file.sync_all()?;
            Ok(())
        })();

        if let Err(err) = result {
            let _ = fs::remove_file(&staging);
            return Err(err);
        }
        fs::rename(&staging, path)?;
        log::trace!("saved {} entries to {}", self.len(), path.display());
        Ok(())
    }

    /// Reads a snapshot written by [`save`](Self::save). The file must hold
    /// exactly one snapshot; trailing bytes are reported as corruption.
    pub fn load(path: impl AsRef<Path>) -> IndexResult<RTree> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = TreeReader::new(BufReader::new(file));
        let tree = reader.read()?;

        let mut probe = [0u8; 1];
        if reader.into_inner().read(&mut probe)? != 0 {
            return Err(IndexError::CorruptIndex(
                "trailing data after node stream".into(),
            ));
        }
        log::trace!("loaded {} entries from {}", tree.len(), path.display());
        Ok(tree)
    }
}
