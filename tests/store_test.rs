//! JSON document stores on a real (temporary) filesystem.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use curtree::application::ApplicationError;
use curtree::domain::{CurriculumTree, Level, NodePath, Selection};
use curtree::infrastructure::store::{JsonFileStore, JsonSelectionStore};
use curtree::infrastructure::traits::{CurriculumStore, RealFileSystem, SelectionStore};

fn store_at(path: &PathBuf) -> JsonFileStore {
    JsonFileStore::new(Arc::new(RealFileSystem), path.clone())
}

fn doc_path(temp: &TempDir) -> PathBuf {
    temp.path().join("data").join("curriculum.json")
}

// ============================================================
// First load
// ============================================================

#[test]
fn given_missing_document_when_loading_then_seed_is_returned_and_persisted() {
    let temp = TempDir::new().unwrap();
    let path = doc_path(&temp);
    let store = store_at(&path);

    let tree = store.load().unwrap();

    assert_eq!(tree, CurriculumTree::seed());
    assert!(path.exists(), "seed should be written on first load");
    let reread = store_at(&path).load().unwrap();
    assert_eq!(reread, tree);
    assert!(store.revision().is_some());
}

#[test]
fn given_seed_disabled_when_loading_missing_document_then_empty_object_is_written() {
    let temp = TempDir::new().unwrap();
    let path = doc_path(&temp);
    let store = store_at(&path).with_seed(false);

    let tree = store.load().unwrap();

    assert!(tree.is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap(), "{}\n");
}

// ============================================================
// Round trips and format
// ============================================================

#[test]
fn given_loaded_tree_when_saved_twice_then_bytes_are_identical() {
    let temp = TempDir::new().unwrap();
    let path = doc_path(&temp);
    let store = store_at(&path);
    let tree = store.load().unwrap();

    store.save(&tree).unwrap();
    let first = fs::read(&path).unwrap();
    store.save(&store.load().unwrap()).unwrap();
    let second = fs::read(&path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn given_hand_written_order_when_loading_then_document_order_is_kept() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("curriculum.json");
    fs::write(
        &path,
        r#"{"Zeta": {"Beta": {}, "Alpha": {}}, "Alpha": {}}"#,
    )
    .unwrap();

    let tree = store_at(&path).load().unwrap();

    assert_eq!(tree.children(&NodePath::root()).unwrap(), ["Zeta", "Alpha"]);
    assert_eq!(
        tree.children(&NodePath::new(["Zeta"])).unwrap(),
        ["Beta", "Alpha"]
    );
}

#[test]
fn given_compact_store_when_saving_then_single_line_document() {
    let temp = TempDir::new().unwrap();
    let path = doc_path(&temp);
    let store = store_at(&path).with_pretty(false);

    store.load().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 1);
    assert!(content.starts_with(r#"{"Class 9":{"Science":{"Physics":{"Motion":["Speed and Velocity""#));
}

#[test]
fn given_pretty_store_when_saving_then_document_is_indented() {
    let temp = TempDir::new().unwrap();
    let path = doc_path(&temp);

    store_at(&path).load().unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.lines().count() > 1);
    assert!(content.contains("\n  \"Class 9\": {"));
    assert!(content.ends_with("}\n"));
}

// ============================================================
// Failure modes
// ============================================================

#[test]
fn given_invalid_json_when_loading_then_malformed_error_names_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("curriculum.json");
    fs::write(&path, "{ not json").unwrap();

    let err = store_at(&path).load().unwrap_err();

    match err {
        ApplicationError::Malformed { path: p, .. } => assert_eq!(p, path),
        other => panic!("expected Malformed, got {other:?}"),
    }
}

#[test]
fn given_duplicate_keys_when_loading_then_malformed_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("curriculum.json");
    fs::write(&path, r#"{"Class 9": {}, "Class 9": {}}"#).unwrap();

    let err = store_at(&path).load().unwrap_err();

    assert!(matches!(err, ApplicationError::Malformed { .. }));
    assert!(err.to_string().contains("duplicate key: Class 9"));
}

#[test]
fn given_wrong_shape_when_loading_then_malformed_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("curriculum.json");
    fs::write(&path, r#"{"Class 9": ["not", "a", "map"]}"#).unwrap();

    let err = store_at(&path).load().unwrap_err();

    assert!(matches!(err, ApplicationError::Malformed { .. }));
}

#[test]
fn given_document_changed_by_other_writer_when_saving_then_stale_and_file_untouched() {
    let temp = TempDir::new().unwrap();
    let path = doc_path(&temp);
    let mine = store_at(&path);
    let theirs = store_at(&path);
    let mut my_tree = mine.load().unwrap();
    let mut their_tree = theirs.load().unwrap();

    their_tree.add(&NodePath::root(), "Class 11").unwrap();
    theirs.save(&their_tree).unwrap();
    let after_theirs = fs::read_to_string(&path).unwrap();

    my_tree.add(&NodePath::root(), "Class 12").unwrap();
    let err = mine.save(&my_tree).unwrap_err();

    assert!(matches!(err, ApplicationError::StaleDocument(ref p) if *p == path));
    assert_eq!(fs::read_to_string(&path).unwrap(), after_theirs);

    // reloading picks up the other write and allows saving again
    let mut reloaded = mine.load().unwrap();
    reloaded.add(&NodePath::root(), "Class 12").unwrap();
    mine.save(&reloaded).unwrap();
    assert_eq!(
        store_at(&path).load().unwrap().children(&NodePath::root()).unwrap(),
        ["Class 9", "Class 10", "Class 11", "Class 12"]
    );
}

#[test]
fn given_store_that_never_loaded_when_saving_over_existing_file_then_stale() {
    let temp = TempDir::new().unwrap();
    let path = doc_path(&temp);
    store_at(&path).load().unwrap();

    let err = store_at(&path).save(&CurriculumTree::new()).unwrap_err();

    assert!(matches!(err, ApplicationError::StaleDocument(_)));
}

#[test]
fn given_unwritable_location_when_loading_then_operation_failed() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("file");
    fs::write(&blocker, "").unwrap();
    let path = blocker.join("curriculum.json");

    let err = store_at(&path).load().unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
}

// ============================================================
// Selection sidecar
// ============================================================

#[test]
fn given_missing_selection_when_loading_then_empty() {
    let temp = TempDir::new().unwrap();
    let store = JsonSelectionStore::new(Arc::new(RealFileSystem), temp.path().join("sel.json"));

    let selection = store.load().unwrap();

    assert!(selection.is_empty());
}

#[test]
fn given_saved_selection_when_loading_then_cursors_are_restored() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("sel.json");
    let store = JsonSelectionStore::new(Arc::new(RealFileSystem), path.clone());
    let mut selection = Selection::default();
    selection.select(&NodePath::new(["Class 9", "Science"]), "Physics");

    store.save(&selection).unwrap();
    let loaded = store.load().unwrap();

    assert_eq!(loaded, selection);
    assert_eq!(loaded.get(Level::Chapter), Some("Physics"));
    assert_eq!(loaded.get(Level::Topic), None);
}

#[test]
fn given_partial_selection_document_when_loading_then_missing_cursors_are_unset() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("sel.json");
    fs::write(&path, r#"{"class": "Class 10"}"#).unwrap();
    let store = JsonSelectionStore::new(Arc::new(RealFileSystem), path);

    let loaded = store.load().unwrap();

    assert_eq!(loaded.get(Level::Class), Some("Class 10"));
    assert_eq!(loaded.get(Level::Subject), None);
}
