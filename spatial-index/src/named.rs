//! String-keyed facade for search engines.
//!
//! A search engine identifies documents by name and may describe regions in
//! several coordinate systems. [`NamedIndex`] assigns each name an
//! [`EntryId`], projects foreign envelopes into the tree's working system
//! through a caller-supplied [`CrsTransform`], and lets the engine apply its
//! exact geometric predicates to the bounding-box candidates.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::RTreeConfig;
use crate::entry::{Entry, EntryId, NamedEnvelope};
use crate::envelope::Envelope;
use crate::errors::{IndexError, IndexResult};
use crate::rtree::{RTree, RemoveCriterion};

/// Reprojects envelopes between coordinate systems.
///
/// The index never interprets coordinate system ids; it only compares them
/// and hands mismatching envelopes to this trait.
pub trait CrsTransform: Send + Sync {
    /// Returns the envelope covering `envelope` (given in `from`) in `to`.
    fn project(&self, envelope: &Envelope, from: &str, to: &str) -> IndexResult<Envelope>;
}

/// An [`RTree`] whose entries are addressed by name.
///
/// Names are unique: inserting an existing name replaces its envelope.
pub struct NamedIndex {
    tree: RTree,
    ids: HashMap<String, EntryId>,
    records: HashMap<EntryId, NamedEnvelope>,
    /// `None` once `EntryId::MAX` has been handed out.
    next_id: Option<EntryId>,
    transform: Option<Arc<dyn CrsTransform>>,
}

impl NamedIndex {
    pub fn new(config: RTreeConfig) -> IndexResult<Self> {
        Ok(Self {
            tree: RTree::with_config(config)?,
            ids: HashMap::new(),
            records: HashMap::new(),
            next_id: Some(0),
            transform: None,
        })
    }

    /// Rebuilds the name mapping over an existing tree, e.g. one read from
    /// a snapshot. Every entry in the tree needs a name.
    pub fn from_tree<I>(tree: RTree, names: I) -> IndexResult<Self>
    where
        I: IntoIterator<Item = (EntryId, String)>,
    {
        let names: HashMap<EntryId, String> = names.into_iter().collect();
        let mut ids = HashMap::with_capacity(tree.len());
        let mut records = HashMap::with_capacity(tree.len());
        let mut next_id = Some(0);

        for entry in tree.iter() {
            let name = names.get(&entry.id).ok_or_else(|| {
                IndexError::CorruptIndex(format!("entry {} has no name", entry.id))
            })?;
            if ids.insert(name.clone(), entry.id).is_some() {
                return Err(IndexError::CorruptIndex(format!(
                    "name '{}' is used by more than one entry",
                    name
                )));
            }
            records.insert(entry.id, NamedEnvelope::new(name.clone(), entry.envelope.clone()));
            next_id = match (next_id, entry.id.checked_add(1)) {
                (Some(next), Some(after)) => Some(next.max(after)),
                _ => None,
            };
        }

        Ok(Self {
            tree,
            ids,
            records,
            next_id,
            transform: None,
        })
    }

    /// Installs the projection used for envelopes in a foreign coordinate
    /// system.
    #[must_use]
    pub fn with_transform<T: CrsTransform + 'static>(mut self, transform: T) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    pub fn tree(&self) -> &RTree {
        &self.tree
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(name)
    }

    pub fn id_of(&self, name: &str) -> Option<EntryId> {
        self.ids.get(name).copied()
    }

    /// The stored (normalized) envelope of `name`.
    pub fn get(&self, name: &str) -> Option<&Envelope> {
        let id = self.ids.get(name)?;
        self.records.get(id).map(|record| &record.envelope)
    }

    /// `(id, name)` pairs, suitable for [`from_tree`](Self::from_tree).
    pub fn names(&self) -> impl Iterator<Item = (EntryId, &str)> + '_ {
        self.records
            .iter()
            .map(|(&id, record)| (id, record.name.as_str()))
    }

    /// Indexes `named`, replacing an earlier envelope under the same name.
    /// Returns the id the entry is stored under.
    pub fn insert(&mut self, named: NamedEnvelope) -> IndexResult<EntryId> {
        let envelope = self.normalize(&named.envelope)?.into_owned();
        let envelope = self.tree.stored_envelope(envelope)?;
        let id = self.next_id.ok_or(IndexError::IdsExhausted)?;

        if let Some(&old) = self.ids.get(&named.name) {
            self.remove_id(old)?;
        }

        self.tree.insert(Entry::new(envelope.clone(), id))?;
        self.next_id = id.checked_add(1);
        self.ids.insert(named.name.clone(), id);
        self.records.insert(id, NamedEnvelope::new(named.name, envelope));
        Ok(id)
    }

    /// Removes `name`; `Ok(false)` if it was not indexed.
    pub fn remove(&mut self, name: &str) -> IndexResult<bool> {
        match self.ids.get(name) {
            Some(&id) => self.remove_id(id),
            None => Ok(false),
        }
    }

    fn remove_id(&mut self, id: EntryId) -> IndexResult<bool> {
        let Some(record) = self.records.remove(&id) else {
            return Ok(false);
        };
        self.ids.remove(&record.name);
        let entry = Entry::new(record.envelope, id);
        self.tree.remove(&RemoveCriterion::Exact(entry))
    }

    /// Names whose envelope intersects `query`.
    pub fn search(&self, query: &Envelope) -> IndexResult<Vec<&str>> {
        self.search_filtered(query, |_| true)
    }

    /// Names whose envelope intersects `query` and that pass `predicate`.
    ///
    /// The bounding-box search only yields candidates; `predicate` is where
    /// a caller applies the exact geometry test.
    pub fn search_filtered<P>(&self, query: &Envelope, mut predicate: P) -> IndexResult<Vec<&str>>
    where
        P: FnMut(&NamedEnvelope) -> bool,
    {
        let query = self.normalize(query)?;
        let candidates = self.tree.search_collect(&query)?;
        Ok(candidates
            .iter()
            .filter_map(|entry| self.records.get(&entry.id))
            .filter(|record| predicate(*record))
            .map(|record| record.name.as_str())
            .collect())
    }

    /// Projects `envelope` into the tree's coordinate system when both carry
    /// a system id and the ids differ.
    fn normalize<'a>(&self, envelope: &'a Envelope) -> IndexResult<Cow<'a, Envelope>> {
        let (Some(from), Some(to)) = (envelope.crs(), self.tree.config().crs()) else {
            return Ok(Cow::Borrowed(envelope));
        };
        if from == to {
            return Ok(Cow::Borrowed(envelope));
        }
        let transform = self.transform.as_ref().ok_or_else(|| {
            IndexError::Transform(format!("no transform available from {} to {}", from, to))
        })?;
        let projected = transform.project(envelope, from, to)?;
        Ok(Cow::Owned(projected.with_crs(to)))
    }
}
