//! JSON document stores
//!
//! The curriculum is one JSON object nested four levels deep, subtopics as
//! string arrays, keys in display order. The selection lives in a small
//! sidecar document next to it.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{debug, info};

use crate::application::hash::content_hash;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{CurriculumTree, Selection};
use crate::infrastructure::traits::{CurriculumStore, FileSystem, SelectionStore};

fn render<T: Serialize>(value: &T, pretty: bool, path: &Path) -> ApplicationResult<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.map(|s| s + "\n")
        .map_err(|e| ApplicationError::OperationFailed {
            context: format!("serialize {}", path.display()),
            source: Box::new(e),
        })
}

/// Curriculum document on disk.
///
/// Remembers the revision it last read or wrote and refuses to save over a
/// document that has changed since, so two processes editing the same file
/// cannot silently overwrite each other.
pub struct JsonFileStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
    pretty: bool,
    seed: bool,
    revision: Mutex<Option<String>>,
}

impl JsonFileStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
            pretty: true,
            seed: true,
            revision: Mutex::new(None),
        }
    }

    /// Pretty-print (default) or write compact JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Seed the built-in curriculum (default) or start empty when no document exists.
    pub fn with_seed(mut self, seed: bool) -> Self {
        self.seed = seed;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Revision of the document as last read or written by this store.
    pub fn revision(&self) -> Option<String> {
        self.revision
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_revision(&self, revision: String) {
        *self.revision.lock().unwrap_or_else(|e| e.into_inner()) = Some(revision);
    }

    fn write(&self, tree: &CurriculumTree) -> ApplicationResult<()> {
        let content = render(tree, self.pretty, &self.path)?;
        self.fs
            .ensure_parent(&self.path)
            .with_path_context("create data directory", &self.path)?;
        self.fs
            .write_atomic(&self.path, &content)
            .with_path_context("write curriculum", &self.path)?;
        self.set_revision(content_hash(content.as_bytes()));
        Ok(())
    }

    fn check_not_stale(&self) -> ApplicationResult<()> {
        if !self.fs.exists(&self.path) {
            return Ok(());
        }
        let on_disk = self
            .fs
            .read_to_string(&self.path)
            .with_path_context("read curriculum", &self.path)?;
        let current = content_hash(on_disk.as_bytes());
        match self.revision() {
            Some(expected) if expected == current => Ok(()),
            _ => Err(ApplicationError::StaleDocument(self.path.clone())),
        }
    }
}

impl CurriculumStore for JsonFileStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> ApplicationResult<CurriculumTree> {
        if !self.fs.exists(&self.path) {
            let tree = if self.seed {
                CurriculumTree::seed()
            } else {
                CurriculumTree::new()
            };
            info!("no curriculum at {}, initializing", self.path.display());
            self.write(&tree)?;
            return Ok(tree);
        }

        let content = self
            .fs
            .read_to_string(&self.path)
            .with_path_context("read curriculum", &self.path)?;
        let tree: CurriculumTree =
            serde_json::from_str(&content).map_err(|e| ApplicationError::Malformed {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        self.set_revision(content_hash(content.as_bytes()));
        debug!("load: {} revision {:?}", self.path.display(), self.revision());
        Ok(tree)
    }

    fn save(&self, tree: &CurriculumTree) -> ApplicationResult<()> {
        self.check_not_stale()?;
        self.write(tree)
    }

    fn reset(&self, tree: &CurriculumTree) -> ApplicationResult<()> {
        debug!("reset: overwriting {}", self.path.display());
        self.write(tree)
    }
}

/// Selection cursors in a JSON sidecar file.
pub struct JsonSelectionStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl JsonSelectionStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }
}

impl SelectionStore for JsonSelectionStore {
    fn load(&self) -> ApplicationResult<Selection> {
        if !self.fs.exists(&self.path) {
            return Ok(Selection::default());
        }
        let content = self
            .fs
            .read_to_string(&self.path)
            .with_path_context("read selection", &self.path)?;
        serde_json::from_str(&content).map_err(|e| ApplicationError::Malformed {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn save(&self, selection: &Selection) -> ApplicationResult<()> {
        let content = render(selection, true, &self.path)?;
        self.fs
            .ensure_parent(&self.path)
            .with_path_context("create data directory", &self.path)?;
        self.fs
            .write_atomic(&self.path, &content)
            .with_path_context("write selection", &self.path)
    }
}
