//! Selection cursors into the curriculum tree
//!
//! A cursor at one level only means something while every cursor above it is
//! set and the whole chain exists in the tree. Edits never touch a
//! `Selection` directly: callers feed the returned [`Edit`] to
//! [`Selection::apply`].

use serde::{Deserialize, Serialize};

use crate::domain::level::{Level, NodePath};
use crate::domain::tree::{CurriculumTree, Edit};

/// Currently selected class, subject, chapter and topic.
///
/// Subtopics are leaves and are never selected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    pub class: Option<String>,
    pub subject: Option<String>,
    pub chapter: Option<String>,
    pub topic: Option<String>,
}

impl Selection {
    fn slot(&self, level: Level) -> Option<&Option<String>> {
        match level {
            Level::Class => Some(&self.class),
            Level::Subject => Some(&self.subject),
            Level::Chapter => Some(&self.chapter),
            Level::Topic => Some(&self.topic),
            Level::Subtopic => None,
        }
    }

    fn slot_mut(&mut self, level: Level) -> Option<&mut Option<String>> {
        match level {
            Level::Class => Some(&mut self.class),
            Level::Subject => Some(&mut self.subject),
            Level::Chapter => Some(&mut self.chapter),
            Level::Topic => Some(&mut self.topic),
            Level::Subtopic => None,
        }
    }

    /// Selected name at `level`.
    pub fn get(&self, level: Level) -> Option<&str> {
        self.slot(level).and_then(|s| s.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.class.is_none()
    }

    /// Selected chain from the class down to the first unset cursor.
    pub fn path(&self) -> NodePath {
        NodePath::new(
            Level::ALL
                .into_iter()
                .map_while(|level| self.get(level))
                .map(str::to_string),
        )
    }

    /// Ancestor path for working at `level`, if enough cursors are set.
    pub fn context_for(&self, level: Level) -> Option<NodePath> {
        let path = self.path();
        (path.len() >= level.depth())
            .then(|| NodePath::new(path.segments()[..level.depth()].iter().cloned()))
    }

    /// Select `name` at the level addressed by `path`.
    ///
    /// Cursors above are set from `path`, cursors below are cleared. Returns
    /// `false` for the subtopic level, which has no cursor.
    pub fn select(&mut self, path: &NodePath, name: &str) -> bool {
        let Some(level) = path.level().filter(|l| !l.is_leaf()) else {
            return false;
        };
        let chain = path.child(name);
        for (level, value) in Level::ALL.into_iter().zip(chain.segments()) {
            if let Some(slot) = self.slot_mut(level) {
                *slot = Some(value.clone());
            }
        }
        if let Some(below) = level.child() {
            self.clear_from(below);
        }
        true
    }

    /// Clear the cursor at `level` and every cursor below it.
    pub fn clear_from(&mut self, level: Level) {
        for l in Level::ALL.into_iter().skip(level.depth()) {
            if let Some(slot) = self.slot_mut(l) {
                *slot = None;
            }
        }
    }

    pub fn clear(&mut self) {
        self.clear_from(Level::Class);
    }

    /// Follow a rename or drop cursors into a removed subtree.
    ///
    /// Only cursors whose chain runs through the edited level are affected.
    /// Returns whether anything changed.
    pub fn apply(&mut self, edit: &Edit) -> bool {
        match edit {
            Edit::Renamed { path, from, to } => {
                let Some(level) = self.pointing_at(path, from) else {
                    return false;
                };
                if let Some(slot) = self.slot_mut(level) {
                    *slot = Some(to.clone());
                }
                true
            }
            Edit::Removed { path, name } => {
                let Some(level) = self.pointing_at(path, name) else {
                    return false;
                };
                self.clear_from(level);
                true
            }
            Edit::Unchanged | Edit::Added { .. } | Edit::Reordered { .. } => false,
        }
    }

    /// Level whose cursor names `name` under exactly `path`.
    fn pointing_at(&self, path: &NodePath, name: &str) -> Option<Level> {
        let level = path.level()?;
        let selected = self.get(level)?;
        (selected == name && self.context_for(level).as_ref() == Some(path)).then_some(level)
    }

    /// Drop cursors that do not chain into `tree`, or that follow a gap.
    ///
    /// Returns whether anything changed.
    pub fn prune(&mut self, tree: &CurriculumTree) -> bool {
        let before = self.clone();
        let mut path = NodePath::root();
        for level in [Level::Class, Level::Subject, Level::Chapter, Level::Topic] {
            match self.get(level) {
                Some(name) if tree.contains(&path.child(name)) => {
                    path = path.child(name);
                }
                _ => {
                    self.clear_from(level);
                    break;
                }
            }
        }
        *self != before
    }
}
