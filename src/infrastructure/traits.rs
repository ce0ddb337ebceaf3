//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::application::ApplicationResult;
use crate::domain::{CurriculumTree, Selection};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Write via a temp file in the same directory, then rename over `path`.
    /// Readers see either the old or the new content, never a mix.
    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Persistence collaborator for the curriculum tree.
pub trait CurriculumStore: Send + Sync {
    /// Human-readable location of the stored document.
    fn location(&self) -> String;

    /// Load the stored tree, seeding the default one if nothing is stored.
    fn load(&self) -> ApplicationResult<CurriculumTree>;

    /// Persist `tree`. Returns only after the write completed or failed.
    fn save(&self, tree: &CurriculumTree) -> ApplicationResult<()>;

    /// Replace whatever is stored with `tree`, regardless of its revision.
    /// A failed write leaves the previous document in place.
    fn reset(&self, tree: &CurriculumTree) -> ApplicationResult<()>;
}

/// Persistence for selection cursors between invocations.
pub trait SelectionStore: Send + Sync {
    /// Load the saved selection, empty if none was saved.
    fn load(&self) -> ApplicationResult<Selection>;

    fn save(&self, selection: &Selection) -> ApplicationResult<()>;
}

/// Interactive yes/no confirmation before destructive edits.
pub trait Confirmer: Send + Sync {
    /// Returns `true` only on an explicit yes.
    fn confirm(&self, prompt: &str) -> io::Result<bool>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn write_atomic(&self, path: &Path, content: &str) -> io::Result<()> {
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Real confirmer: asks on stdout, reads one line from stdin.
#[derive(Debug, Default)]
pub struct TerminalConfirmer;

impl Confirmer for TerminalConfirmer {
    fn confirm(&self, prompt: &str) -> io::Result<bool> {
        crate::cli::output::prompt(&format!("{prompt} [y/N]"));
        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(is_yes(&answer))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn given_answers_when_parsing_then_only_explicit_yes_confirms() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes("\n"));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn given_existing_file_when_writing_atomically_then_content_is_replaced() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.json");
        let fs = RealFileSystem;
        fs.write(&path, "old").unwrap();

        fs.write_atomic(&path, "new").unwrap();

        assert_eq!(fs.read_to_string(&path).unwrap(), "new");
        // no temp files left behind
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn given_nested_path_when_ensuring_parent_then_directories_exist() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a/b/doc.json");
        RealFileSystem.ensure_parent(&path).unwrap();
        assert!(temp.path().join("a/b").is_dir());
    }
}
