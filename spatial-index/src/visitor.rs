//! Search callbacks.
//!
//! A search hands every matching entry to a [`Visitor`]. The visitor decides
//! what to do with it and whether the traversal should continue; returning
//! `ControlFlow::Break(())` abandons the rest of the search.

use std::ops::ControlFlow;

use crate::entry::{Entry, EntryId};

/// Callback invoked once per matching entry.
pub trait Visitor {
    fn visit(&mut self, entry: &Entry) -> ControlFlow<()>;
}

impl<F> Visitor for F
where
    F: FnMut(&Entry) -> ControlFlow<()>,
{
    fn visit(&mut self, entry: &Entry) -> ControlFlow<()> {
        self(entry)
    }
}

/// Accumulates clones of every visited entry.
#[derive(Debug, Default, Clone)]
pub struct CollectingVisitor {
    entries: Vec<Entry>,
}

impl CollectingVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    pub fn ids(&self) -> Vec<EntryId> {
        self.entries.iter().map(|e| e.id).collect()
    }
}

impl Visitor for CollectingVisitor {
    fn visit(&mut self, entry: &Entry) -> ControlFlow<()> {
        self.entries.push(entry.clone());
        ControlFlow::Continue(())
    }
}

/// Counts matches without storing them.
#[derive(Debug, Default, Clone, Copy)]
pub struct CountingVisitor {
    count: usize,
}

impl CountingVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

impl Visitor for CountingVisitor {
    fn visit(&mut self, _entry: &Entry) -> ControlFlow<()> {
        self.count += 1;
        ControlFlow::Continue(())
    }
}

/// Collects at most `limit` entries, then stops the traversal.
///
/// A limit of one turns a search into an existence check.
#[derive(Debug, Clone)]
pub struct LimitVisitor {
    limit: usize,
    entries: Vec<Entry>,
}

impl LimitVisitor {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            entries: Vec::with_capacity(limit.min(64)),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    /// True once the limit has been reached.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.limit
    }
}

impl Visitor for LimitVisitor {
    fn visit(&mut self, entry: &Entry) -> ControlFlow<()> {
        if self.is_full() {
            return ControlFlow::Break(());
        }
        self.entries.push(entry.clone());
        if self.is_full() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}
