//! # Closure Resolution
//!
//! Computes every file reachable from a root file by following reference
//! lines, including the root itself.
//!
//! ## Invariants
//!
//! - The closure is keyed by [`LogicalFileName`]. A file reachable along
//!   several paths appears once.
//! - Each name is looked up at most once per computation. A name already
//!   visited contributes nothing further, which also terminates reference
//!   cycles.
//! - A name that cannot be resolved is omitted. If the root itself cannot
//!   be resolved the closure is empty.
//!
//! The walk uses an explicit work stack, so deeply nested libraries do not
//! grow the call stack.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use ldb_core::{extract_references, LogicalFileName};

use crate::store::{FileSource, ResolvedFile};

/// The files of a closure, keyed and ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Closure {
    files: BTreeMap<LogicalFileName, Vec<u8>>,
}

impl Closure {
    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the closure holds no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Whether a file of this name is part of the closure.
    pub fn contains(&self, name: &LogicalFileName) -> bool {
        self.files.contains_key(name)
    }

    /// Content of a file in the closure.
    pub fn get(&self, name: &LogicalFileName) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }

    /// File names in order.
    pub fn names(&self) -> impl Iterator<Item = &LogicalFileName> {
        self.files.keys()
    }

    /// `(name, content)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&LogicalFileName, &[u8])> {
        self.files.iter().map(|(name, data)| (name, data.as_slice()))
    }

    /// Total content size in bytes.
    pub fn total_bytes(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }
}

/// Resolve the closure of `root`, keeping file contents.
pub fn resolve_files<S: FileSource + ?Sized>(store: &S, root: &LogicalFileName) -> Closure {
    let mut files = BTreeMap::new();
    walk(store, root, |file| {
        files.insert(file.name, file.data);
    });
    Closure { files }
}

/// Resolve the closure of `root`, keeping only names.
pub fn resolve_names<S: FileSource + ?Sized>(
    store: &S,
    root: &LogicalFileName,
) -> BTreeSet<LogicalFileName> {
    let mut names = BTreeSet::new();
    walk(store, root, |file| {
        names.insert(file.name);
    });
    names
}

/// Depth-first walk calling `visit` once for every resolvable file.
fn walk<S, F>(store: &S, root: &LogicalFileName, mut visit: F)
where
    S: FileSource + ?Sized,
    F: FnMut(ResolvedFile),
{
    let mut seen: HashSet<LogicalFileName> = HashSet::new();
    let mut pending = vec![root.clone()];

    while let Some(name) = pending.pop() {
        if !seen.insert(name.clone()) {
            continue;
        }
        let Some(file) = store.resolve(&name) else {
            tracing::debug!(name = %name, "reference unresolved");
            continue;
        };
        pending.extend(
            extract_references(&file.data)
                .into_iter()
                .filter(|reference| !seen.contains(reference)),
        );
        visit(file);
    }
}
