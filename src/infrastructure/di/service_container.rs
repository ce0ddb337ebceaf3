//! Service container for dependency injection
//!
//! Wires settings, stores and the interactive collaborators together.

use std::sync::Arc;

use crate::application::services::EditorSession;
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::infrastructure::store::{JsonFileStore, JsonSelectionStore};
use crate::infrastructure::traits::{
    Confirmer, CurriculumStore, FileSystem, RealFileSystem, SelectionStore, TerminalConfirmer,
};

/// Container holding all application collaborators.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Curriculum document
    pub curriculum: Arc<dyn CurriculumStore>,

    /// Selection sidecar
    pub selection: Arc<dyn SelectionStore>,

    /// Delete confirmation prompt
    pub confirmer: Arc<dyn Confirmer>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(TerminalConfirmer),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        confirmer: Arc<dyn Confirmer>,
    ) -> Self {
        let curriculum = Arc::new(
            JsonFileStore::new(fs.clone(), settings.curriculum_path())
                .with_pretty(settings.pretty)
                .with_seed(settings.seed.enabled),
        );
        let selection = Arc::new(JsonSelectionStore::new(
            fs.clone(),
            settings.selection_path(),
        ));

        Self {
            settings: Arc::new(settings),
            fs,
            curriculum,
            selection,
            confirmer,
        }
    }

    /// Open an editing session over the configured documents.
    pub fn session(&self) -> ApplicationResult<EditorSession> {
        EditorSession::open(self.curriculum.clone(), self.selection.clone())
    }
}
