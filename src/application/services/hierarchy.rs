//! Curriculum hierarchy service
//!
//! Owns the in-memory tree. Every edit runs against a copy, the copy is
//! persisted, and only then does it replace the held tree. A failed save
//! leaves the previous tree in place.

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::ApplicationResult;
use crate::domain::{CurriculumTree, DomainResult, Edit, NodePath};
use crate::infrastructure::traits::CurriculumStore;

/// Service for editing the curriculum hierarchy.
pub struct HierarchyService {
    store: Arc<dyn CurriculumStore>,
    tree: CurriculumTree,
}

impl HierarchyService {
    /// Load the tree from `store` (which seeds it if nothing is stored yet).
    pub fn open(store: Arc<dyn CurriculumStore>) -> ApplicationResult<Self> {
        let tree = store.load()?;
        debug!(
            "open: {} classes from {}",
            tree.classes().len(),
            store.location()
        );
        Ok(Self { store, tree })
    }

    pub fn tree(&self) -> &CurriculumTree {
        &self.tree
    }

    /// Replace the held tree with the stored one.
    pub fn reload(&mut self) -> ApplicationResult<()> {
        self.tree = self.store.load()?;
        Ok(())
    }

    /// Append `name` at the level addressed by `path`. Duplicates are ignored
    /// at map levels and rejected in a subtopic list.
    #[instrument(skip(self))]
    pub fn add(&mut self, path: &NodePath, name: &str) -> ApplicationResult<Edit> {
        self.commit(|tree| tree.add(path, name))
    }

    /// Rename a node in place. Fails on a sibling name clash.
    #[instrument(skip(self))]
    pub fn rename(&mut self, path: &NodePath, old: &str, new: &str) -> ApplicationResult<Edit> {
        self.commit(|tree| tree.rename(path, old, new))
    }

    /// Delete a node and its subtree. Confirmation is up to the caller.
    #[instrument(skip(self))]
    pub fn delete(&mut self, path: &NodePath, name: &str) -> ApplicationResult<Edit> {
        self.commit(|tree| Ok(tree.remove(path, name)))
    }

    /// Move the sibling at `from` to `to` (0-based).
    #[instrument(skip(self))]
    pub fn reorder(&mut self, path: &NodePath, from: usize, to: usize) -> ApplicationResult<Edit> {
        self.commit(|tree| Ok(tree.reorder(path, from, to)))
    }

    fn commit<F>(&mut self, op: F) -> ApplicationResult<Edit>
    where
        F: FnOnce(&mut CurriculumTree) -> DomainResult<Edit>,
    {
        let mut candidate = self.tree.clone();
        let edit = op(&mut candidate)?;
        if !edit.is_change() {
            debug!("commit: nothing changed, skipping save");
            return Ok(edit);
        }
        self.store.save(&candidate)?;
        self.tree = candidate;
        debug!("commit: saved {:?}", edit);
        Ok(edit)
    }
}
