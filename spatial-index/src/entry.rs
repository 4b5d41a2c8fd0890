//! The unit of data stored in the index.

use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;

/// Caller-supplied identifier of an indexed region (e.g. a document id).
///
/// The index attaches no meaning to it; uniqueness is the caller's
/// responsibility.
pub type EntryId = u64;

/// A stored `(envelope, id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entry {
    pub envelope: Envelope,
    pub id: EntryId,
}

impl Entry {
    pub fn new(envelope: Envelope, id: EntryId) -> Self {
        Self { envelope, id }
    }
}

/// An envelope associated with an external, string-valued identifier.
///
/// This is the shape in which a search engine hands regions to the index;
/// see [`NamedIndex`](crate::named::NamedIndex) for the mapping from names to
/// [`EntryId`]s.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedEnvelope {
    pub name: String,
    pub envelope: Envelope,
}

impl NamedEnvelope {
    pub fn new(name: impl Into<String>, envelope: Envelope) -> Self {
        Self {
            name: name.into(),
            envelope,
        }
    }

    /// Converts into an index entry under the given id.
    pub fn into_entry(self, id: EntryId) -> Entry {
        Entry::new(self.envelope, id)
    }
}
