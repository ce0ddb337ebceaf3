//! Editing session: hierarchy edits plus persisted selection cursors
//!
//! Each successful edit is followed by `Selection::apply`, and the selection
//! is written back only when a cursor actually moved. Once the tree is saved
//! the edit stands: a failed selection write is logged, not returned.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::services::HierarchyService;
use crate::application::ApplicationResult;
use crate::domain::{CurriculumTree, Edit, Level, NodePath, Selection};
use crate::infrastructure::traits::{CurriculumStore, SelectionStore};

pub struct EditorSession {
    hierarchy: HierarchyService,
    selection: Selection,
    selection_store: Arc<dyn SelectionStore>,
}

impl EditorSession {
    /// Load tree and selection. Cursors that no longer chain into the tree
    /// are dropped (and the cleaned selection saved).
    pub fn open(
        store: Arc<dyn CurriculumStore>,
        selection_store: Arc<dyn SelectionStore>,
    ) -> ApplicationResult<Self> {
        let hierarchy = HierarchyService::open(store)?;
        let mut selection = selection_store.load()?;
        if selection.prune(hierarchy.tree()) {
            debug!("open: pruned stale selection to {}", selection.path());
            selection_store.save(&selection)?;
        }
        Ok(Self {
            hierarchy,
            selection,
            selection_store,
        })
    }

    pub fn tree(&self) -> &CurriculumTree {
        self.hierarchy.tree()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Ancestor path for `level` taken from the current selection.
    pub fn context_for(&self, level: Level) -> Option<NodePath> {
        self.selection.context_for(level)
    }

    pub fn add(&mut self, path: &NodePath, name: &str) -> ApplicationResult<Edit> {
        let edit = self.hierarchy.add(path, name)?;
        self.follow(&edit);
        Ok(edit)
    }

    pub fn rename(&mut self, path: &NodePath, old: &str, new: &str) -> ApplicationResult<Edit> {
        let edit = self.hierarchy.rename(path, old, new)?;
        self.follow(&edit);
        Ok(edit)
    }

    pub fn delete(&mut self, path: &NodePath, name: &str) -> ApplicationResult<Edit> {
        let edit = self.hierarchy.delete(path, name)?;
        self.follow(&edit);
        Ok(edit)
    }

    pub fn reorder(&mut self, path: &NodePath, from: usize, to: usize) -> ApplicationResult<Edit> {
        let edit = self.hierarchy.reorder(path, from, to)?;
        self.follow(&edit);
        Ok(edit)
    }

    /// Select `name` under `path` and persist the selection.
    ///
    /// Returns `false` (and saves nothing) if the node does not exist or sits
    /// at the subtopic level.
    pub fn select(&mut self, path: &NodePath, name: &str) -> ApplicationResult<bool> {
        if !self.tree().contains(&path.child(name)) {
            return Ok(false);
        }
        let mut next = self.selection.clone();
        if !next.select(path, name) {
            return Ok(false);
        }
        self.selection_store.save(&next)?;
        self.selection = next;
        Ok(true)
    }

    /// Clear cursors from `level` down and persist the selection.
    pub fn deselect(&mut self, level: Level) -> ApplicationResult<()> {
        let mut next = self.selection.clone();
        next.clear_from(level);
        if next != self.selection {
            self.selection_store.save(&next)?;
            self.selection = next;
        }
        Ok(())
    }

    fn follow(&mut self, edit: &Edit) {
        if !self.selection.apply(edit) {
            return;
        }
        debug!("follow: selection now {}", self.selection.path());
        if let Err(e) = self.selection_store.save(&self.selection) {
            warn!("follow: could not save selection: {}", e);
        }
    }
}
