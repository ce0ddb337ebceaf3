//! The curriculum tree: Class -> Subject -> Chapter -> Topic -> [Subtopic]

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::level::{Level, NodePath};
use crate::domain::ordered_map::OrderedMap;

pub type SubtopicList = Vec<String>;
pub type TopicMap = OrderedMap<SubtopicList>;
pub type ChapterMap = OrderedMap<TopicMap>;
pub type SubjectMap = OrderedMap<ChapterMap>;

/// Ordered, four-level curriculum hierarchy with subtopic lists as leaves.
///
/// Serializes as a plain nested JSON object, keys in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurriculumTree {
    classes: OrderedMap<SubjectMap>,
}

/// Outcome of a tree mutation.
///
/// Callers use it to decide whether to persist and to update their
/// [`Selection`](crate::domain::Selection) via `Selection::apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Nothing changed (duplicate add, missing name, same-index move).
    Unchanged,
    Added {
        path: NodePath,
        name: String,
    },
    Renamed {
        path: NodePath,
        from: String,
        to: String,
    },
    /// `name` and its whole subtree were removed.
    Removed {
        path: NodePath,
        name: String,
    },
    Reordered {
        path: NodePath,
        from: usize,
        to: usize,
    },
}

impl Edit {
    pub fn is_change(&self) -> bool {
        !matches!(self, Edit::Unchanged)
    }
}

/// Owned view of one node and its descendants, for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    pub children: Vec<TreeNode>,
}

/// One chapter/topic pair of a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRow {
    pub chapter: String,
    pub topic: String,
    pub subtopics: usize,
}

/// Sibling set at one level: a map for class..topic, a list for subtopics.
trait Siblings {
    fn names(&self) -> Vec<&str>;
    fn len(&self) -> usize;
    fn contains(&self, name: &str) -> bool;
    fn add(&mut self, name: &str) -> bool;
    fn rename(&mut self, old: &str, new: &str) -> bool;
    fn remove(&mut self, name: &str) -> bool;
    fn move_index(&mut self, from: usize, to: usize);
    fn node(&self, name: &str) -> Option<TreeNode>;
}

impl<V: Default + Children> Siblings for OrderedMap<V> {
    fn names(&self) -> Vec<&str> {
        self.keys().collect()
    }

    fn len(&self) -> usize {
        OrderedMap::len(self)
    }

    fn contains(&self, name: &str) -> bool {
        self.contains_key(name)
    }

    fn add(&mut self, name: &str) -> bool {
        self.insert(name, V::default())
    }

    fn rename(&mut self, old: &str, new: &str) -> bool {
        self.rename_key(old, new)
    }

    fn remove(&mut self, name: &str) -> bool {
        OrderedMap::remove(self, name).is_some()
    }

    fn move_index(&mut self, from: usize, to: usize) {
        OrderedMap::move_index(self, from, to)
    }

    fn node(&self, name: &str) -> Option<TreeNode> {
        self.get(name).map(|v| TreeNode {
            name: name.to_string(),
            children: v.child_nodes(),
        })
    }
}

impl Siblings for SubtopicList {
    fn names(&self) -> Vec<&str> {
        self.iter().map(String::as_str).collect()
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn contains(&self, name: &str) -> bool {
        self.iter().any(|s| s == name)
    }

    fn add(&mut self, name: &str) -> bool {
        if Siblings::contains(self, name) {
            return false;
        }
        self.push(name.to_string());
        true
    }

    fn rename(&mut self, old: &str, new: &str) -> bool {
        if Siblings::contains(self, new) {
            return false;
        }
        match self.iter_mut().find(|s| *s == old) {
            Some(slot) => {
                *slot = new.to_string();
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, name: &str) -> bool {
        let before = Vec::len(self);
        self.retain(|s| s != name);
        Vec::len(self) != before
    }

    fn move_index(&mut self, from: usize, to: usize) {
        let item = Vec::remove(self, from);
        self.insert(to, item);
    }

    fn node(&self, name: &str) -> Option<TreeNode> {
        Siblings::contains(self, name).then(|| TreeNode {
            name: name.to_string(),
            children: Vec::new(),
        })
    }
}

/// Rendering support for every value type stored in the tree.
trait Children {
    fn child_nodes(&self) -> Vec<TreeNode>;
}

impl<V: Children> Children for OrderedMap<V> {
    fn child_nodes(&self) -> Vec<TreeNode> {
        self.iter()
            .map(|(k, v)| TreeNode {
                name: k.to_string(),
                children: v.child_nodes(),
            })
            .collect()
    }
}

impl Children for SubtopicList {
    fn child_nodes(&self) -> Vec<TreeNode> {
        self.iter()
            .map(|s| TreeNode {
                name: s.clone(),
                children: Vec::new(),
            })
            .collect()
    }
}

impl CurriculumTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classes(&self) -> &OrderedMap<SubjectMap> {
        &self.classes
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn siblings(&self, path: &NodePath) -> Option<&dyn Siblings> {
        let p = path.segments();
        let c = &self.classes;
        Some(match p.len() {
            0 => c as &dyn Siblings,
            1 => c.get(&p[0])? as &dyn Siblings,
            2 => c.get(&p[0])?.get(&p[1])? as &dyn Siblings,
            3 => c.get(&p[0])?.get(&p[1])?.get(&p[2])? as &dyn Siblings,
            4 => c.get(&p[0])?.get(&p[1])?.get(&p[2])?.get(&p[3])? as &dyn Siblings,
            _ => return None,
        })
    }

    fn siblings_mut(&mut self, path: &NodePath) -> Option<&mut dyn Siblings> {
        let p = path.segments();
        let c = &mut self.classes;
        Some(match p.len() {
            0 => c as &mut dyn Siblings,
            1 => c.get_mut(&p[0])? as &mut dyn Siblings,
            2 => c.get_mut(&p[0])?.get_mut(&p[1])? as &mut dyn Siblings,
            3 => c.get_mut(&p[0])?.get_mut(&p[1])?.get_mut(&p[2])? as &mut dyn Siblings,
            4 => {
                c.get_mut(&p[0])?
                    .get_mut(&p[1])?
                    .get_mut(&p[2])?
                    .get_mut(&p[3])? as &mut dyn Siblings
            }
            _ => return None,
        })
    }

    /// Names at the level addressed by `path`, in display order.
    ///
    /// `None` if the ancestors in `path` do not exist.
    pub fn children(&self, path: &NodePath) -> Option<Vec<&str>> {
        self.siblings(path).map(|s| s.names())
    }

    /// Whether every segment of `path` names an existing node.
    ///
    /// A five-segment path names a subtopic. The empty path is the root.
    pub fn contains(&self, path: &NodePath) -> bool {
        match path.segments().split_last() {
            None => true,
            Some((last, ancestors)) => self
                .siblings(&NodePath::new(ancestors.iter().cloned()))
                .is_some_and(|s| s.contains(last)),
        }
    }

    /// Owned view of the node named by `path` and its subtree.
    ///
    /// The empty path yields a synthetic root named "/" holding all classes.
    pub fn node(&self, path: &NodePath) -> Option<TreeNode> {
        match path.segments().split_last() {
            None => Some(TreeNode {
                name: "/".to_string(),
                children: self.classes.child_nodes(),
            }),
            Some((last, ancestors)) => self
                .siblings(&NodePath::new(ancestors.iter().cloned()))?
                .node(last),
        }
    }

    /// Append `name` at the level addressed by `path`.
    ///
    /// Adding a name that already exists at a map level leaves the tree
    /// unchanged. A duplicate subtopic fails with
    /// [`DomainError::DuplicateName`]. Precondition: the ancestors in `path`
    /// exist; otherwise this is a no-op.
    pub fn add(&mut self, path: &NodePath, name: &str) -> DomainResult<Edit> {
        let Some(siblings) = self.siblings_mut(path) else {
            trace!("add: no such path {}", path);
            return Ok(Edit::Unchanged);
        };
        if siblings.add(name) {
            return Ok(Edit::Added {
                path: path.clone(),
                name: name.to_string(),
            });
        }
        if path.level() == Some(Level::Subtopic) {
            return Err(DomainError::DuplicateName {
                level: Level::Subtopic,
                name: name.to_string(),
            });
        }
        trace!("add: '{}' already exists under {}", name, path);
        Ok(Edit::Unchanged)
    }

    /// Rename `old` to `new` at the level addressed by `path`, in place.
    ///
    /// Fails with [`DomainError::DuplicateName`] if `new` is already a
    /// sibling; the tree is not touched in that case. Precondition: `path`
    /// and `old` exist; otherwise this is a no-op.
    pub fn rename(&mut self, path: &NodePath, old: &str, new: &str) -> DomainResult<Edit> {
        let Some(level) = path.level() else {
            return Ok(Edit::Unchanged);
        };
        let Some(siblings) = self.siblings_mut(path) else {
            trace!("rename: no such path {}", path);
            return Ok(Edit::Unchanged);
        };
        if old == new {
            return Ok(Edit::Unchanged);
        }
        if siblings.contains(new) {
            return Err(DomainError::DuplicateName {
                level,
                name: new.to_string(),
            });
        }
        if !siblings.rename(old, new) {
            trace!("rename: '{}' not found under {}", old, path);
            return Ok(Edit::Unchanged);
        }
        Ok(Edit::Renamed {
            path: path.clone(),
            from: old.to_string(),
            to: new.to_string(),
        })
    }

    /// Remove `name` and everything below it.
    ///
    /// Confirming the deletion is the caller's business. Precondition:
    /// `path` and `name` exist; otherwise this is a no-op.
    pub fn remove(&mut self, path: &NodePath, name: &str) -> Edit {
        let removed = self
            .siblings_mut(path)
            .is_some_and(|siblings| siblings.remove(name));
        if !removed {
            trace!("remove: '{}' not found under {}", name, path);
            return Edit::Unchanged;
        }
        Edit::Removed {
            path: path.clone(),
            name: name.to_string(),
        }
    }

    /// Move the element at `from` to index `to` at the level addressed by
    /// `path`. Subtrees move with their keys.
    ///
    /// Precondition: both indices are in range. Violations trip a debug
    /// assertion and leave the tree unchanged in release builds.
    pub fn reorder(&mut self, path: &NodePath, from: usize, to: usize) -> Edit {
        let Some(level) = self.siblings_mut(path) else {
            trace!("reorder: no such path {}", path);
            return Edit::Unchanged;
        };
        let len = level.len();
        debug_assert!(
            from < len && to < len,
            "reorder index out of range: {from} -> {to} (len {len})"
        );
        if from >= len || to >= len || from == to {
            return Edit::Unchanged;
        }
        level.move_index(from, to);
        Edit::Reordered {
            path: path.clone(),
            from,
            to,
        }
    }

    /// Number of nodes at `level` across the whole tree.
    pub fn count(&self, level: Level) -> usize {
        let subjects = self.classes.values();
        match level {
            Level::Class => self.classes.len(),
            Level::Subject => subjects.map(OrderedMap::len).sum(),
            Level::Chapter => subjects.flat_map(|s| s.values()).map(OrderedMap::len).sum(),
            Level::Topic => subjects
                .flat_map(|s| s.values())
                .flat_map(|ch| ch.values())
                .map(OrderedMap::len)
                .sum(),
            Level::Subtopic => subjects
                .flat_map(|s| s.values())
                .flat_map(|ch| ch.values())
                .flat_map(|t| t.values())
                .map(Vec::len)
                .sum(),
        }
    }

    /// Chapter/topic rows of one subject, chapters and topics sorted by name.
    pub fn outline(&self, class: &str, subject: &str) -> Vec<OutlineRow> {
        let Some(chapters) = self.classes.get(class).and_then(|s| s.get(subject)) else {
            return Vec::new();
        };
        let mut chapter_names: Vec<&str> = chapters.keys().collect();
        chapter_names.sort_unstable();

        let mut rows = Vec::new();
        for chapter in chapter_names {
            let Some(topics) = chapters.get(chapter) else {
                continue;
            };
            let mut topic_names: Vec<(&str, &SubtopicList)> = topics.iter().collect();
            topic_names.sort_unstable_by(|a, b| a.0.cmp(b.0));
            rows.extend(topic_names.into_iter().map(|(topic, subs)| OutlineRow {
                chapter: chapter.to_string(),
                topic: topic.to_string(),
                subtopics: subs.len(),
            }));
        }
        rows
    }

    /// Every Class > Subject > Chapter > Topic > Subtopic path, in display order.
    pub fn subtopic_paths(&self) -> Vec<NodePath> {
        let mut paths = Vec::new();
        for (class, subjects) in self.classes.iter() {
            for (subject, chapters) in subjects.iter() {
                for (chapter, topics) in chapters.iter() {
                    for (topic, subtopics) in topics.iter() {
                        paths.extend(
                            subtopics
                                .iter()
                                .map(|s| NodePath::new([class, subject, chapter, topic, s.as_str()])),
                        );
                    }
                }
            }
        }
        paths
    }

    /// Built-in curriculum used when nothing has been stored yet.
    pub fn seed() -> Self {
        const SEED: &[(&str, &str, &str, &str, &[&str])] = &[
            (
                "Class 9",
                "Science",
                "Physics",
                "Motion",
                &["Speed and Velocity", "Acceleration", "Laws of Motion"],
            ),
            (
                "Class 9",
                "Science",
                "Physics",
                "Force",
                &["Types of Force", "Newton Laws", "Friction"],
            ),
            (
                "Class 9",
                "Science",
                "Biology",
                "Life Processes",
                &["Nutrition", "Respiration", "Transportation"],
            ),
            (
                "Class 9",
                "Mathematics",
                "Algebra",
                "Linear Equations",
                &["One Variable", "Two Variables"],
            ),
            (
                "Class 9",
                "Mathematics",
                "Algebra",
                "Polynomials",
                &["Introduction", "Factorization"],
            ),
            (
                "Class 10",
                "Science",
                "Chemistry",
                "Acids Bases and Salts",
                &["Properties of Acids", "Properties of Bases", "pH Scale"],
            ),
        ];

        let mut tree = Self::new();
        for &(class, subject, chapter, topic, subtopics) in SEED {
            let mut path = NodePath::root();
            for name in [class, subject, chapter, topic] {
                let _ = tree.add(&path, name);
                path = path.child(name);
            }
            // seed subtopics are distinct per topic
            for subtopic in subtopics {
                let _ = tree.add(&path, subtopic);
            }
        }
        tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn science() -> NodePath {
        NodePath::new(["Class 9", "Science"])
    }

    fn motion() -> NodePath {
        NodePath::new(["Class 9", "Science", "Physics", "Motion"])
    }

    #[test]
    fn given_seed_when_listing_then_source_order_is_kept() {
        let tree = CurriculumTree::seed();
        assert_eq!(
            tree.children(&NodePath::root()).unwrap(),
            ["Class 9", "Class 10"]
        );
        assert_eq!(tree.children(&science()).unwrap(), ["Physics", "Biology"]);
        assert_eq!(
            tree.children(&motion()).unwrap(),
            ["Speed and Velocity", "Acceleration", "Laws of Motion"]
        );
    }

    #[test]
    fn given_missing_ancestor_when_listing_then_none() {
        let tree = CurriculumTree::seed();
        assert!(tree.children(&NodePath::new(["Class 11"])).is_none());
        assert!(tree
            .children(&NodePath::new(["a", "b", "c", "d", "e"]))
            .is_none());
    }

    #[test]
    fn given_adds_at_every_level_when_listing_then_order_equals_call_order() {
        let mut tree = CurriculumTree::new();
        for name in ["Class 12", "Class 11"] {
            assert!(tree.add(&NodePath::root(), name).unwrap().is_change());
        }
        let class = NodePath::new(["Class 12"]);
        tree.add(&class, "History").unwrap();
        tree.add(&class.child("History"), "Ancient").unwrap();
        tree.add(&class.child("History").child("Ancient"), "Egypt").unwrap();
        let topic = class.child("History").child("Ancient").child("Egypt");
        tree.add(&topic, "Pyramids").unwrap();
        tree.add(&topic, "Nile").unwrap();

        assert_eq!(
            tree.children(&NodePath::root()).unwrap(),
            ["Class 12", "Class 11"]
        );
        assert_eq!(tree.children(&topic).unwrap(), ["Pyramids", "Nile"]);
    }

    #[test]
    fn given_duplicate_chapter_when_adding_then_tree_is_unchanged() {
        let mut tree = CurriculumTree::seed();
        let before = tree.clone();
        assert_eq!(tree.add(&science(), "Physics"), Ok(Edit::Unchanged));
        assert_eq!(tree, before);
    }

    #[test]
    fn given_duplicate_subtopic_when_adding_then_rejected_and_list_kept() {
        let mut tree = CurriculumTree::seed();
        let before = tree.clone();
        assert_eq!(
            tree.add(&motion(), "Acceleration"),
            Err(DomainError::DuplicateName {
                level: Level::Subtopic,
                name: "Acceleration".into(),
            })
        );
        assert_eq!(tree, before);
    }

    #[test]
    fn given_middle_key_when_renaming_then_position_is_kept() {
        let mut tree = CurriculumTree::new();
        for name in ["A", "B", "C"] {
            tree.add(&NodePath::root(), name).unwrap();
        }
        let edit = tree.rename(&NodePath::root(), "B", "X").unwrap();
        assert_eq!(
            edit,
            Edit::Renamed {
                path: NodePath::root(),
                from: "B".into(),
                to: "X".into()
            }
        );
        assert_eq!(tree.children(&NodePath::root()).unwrap(), ["A", "X", "C"]);
    }

    #[test]
    fn given_sibling_name_when_renaming_then_duplicate_error_and_tree_untouched() {
        let mut tree = CurriculumTree::seed();
        let before = serde_json::to_string(&tree).unwrap();

        let err = tree.rename(&science(), "Physics", "Biology").unwrap_err();
        assert_eq!(
            err,
            DomainError::DuplicateName {
                level: Level::Chapter,
                name: "Biology".into()
            }
        );
        let err = tree.rename(&motion(), "Acceleration", "Laws of Motion");
        assert!(err.is_err());

        assert_eq!(serde_json::to_string(&tree).unwrap(), before);
    }

    #[test]
    fn given_subtopic_when_renaming_then_list_position_is_kept() {
        let mut tree = CurriculumTree::seed();
        tree.rename(&motion(), "Acceleration", "Rate of Change").unwrap();
        assert_eq!(
            tree.children(&motion()).unwrap(),
            ["Speed and Velocity", "Rate of Change", "Laws of Motion"]
        );
    }

    #[test]
    fn given_same_name_when_renaming_then_unchanged() {
        let mut tree = CurriculumTree::seed();
        assert_eq!(
            tree.rename(&science(), "Physics", "Physics").unwrap(),
            Edit::Unchanged
        );
    }

    #[test]
    fn given_missing_name_when_renaming_then_noop() {
        let mut tree = CurriculumTree::seed();
        let before = tree.clone();
        assert_eq!(
            tree.rename(&science(), "Geology", "Earth").unwrap(),
            Edit::Unchanged
        );
        assert_eq!(tree, before);
    }

    #[test]
    fn given_chapter_when_removing_then_descendants_are_gone() {
        let mut tree = CurriculumTree::seed();
        let subtopics_before = tree.count(Level::Subtopic);
        let edit = tree.remove(&science(), "Physics");
        assert!(edit.is_change());
        assert!(!tree.contains(&science().child("Physics")));
        assert!(!tree.contains(&motion()));
        assert_eq!(tree.children(&science()).unwrap(), ["Biology"]);
        assert_eq!(tree.count(Level::Subtopic), subtopics_before - 6);
    }

    #[test]
    fn given_subtopic_when_removing_then_only_it_is_gone() {
        let mut tree = CurriculumTree::seed();
        tree.remove(&motion(), "Acceleration");
        assert_eq!(
            tree.children(&motion()).unwrap(),
            ["Speed and Velocity", "Laws of Motion"]
        );
    }

    #[test]
    fn given_abcd_when_moving_first_to_third_then_bcad() {
        let mut tree = CurriculumTree::new();
        for name in ["A", "B", "C", "D"] {
            tree.add(&NodePath::root(), name).unwrap();
            tree.add(&NodePath::new([name]), &format!("{name}-subject")).unwrap();
        }
        tree.reorder(&NodePath::root(), 0, 2);
        assert_eq!(
            tree.children(&NodePath::root()).unwrap(),
            ["B", "C", "A", "D"]
        );
        // subtrees travel with their keys
        assert_eq!(tree.children(&NodePath::new(["A"])).unwrap(), ["A-subject"]);
    }

    #[test]
    fn given_subtopic_list_when_reordering_then_plain_splice() {
        let mut tree = CurriculumTree::seed();
        tree.reorder(&motion(), 2, 0);
        assert_eq!(
            tree.children(&motion()).unwrap(),
            ["Laws of Motion", "Speed and Velocity", "Acceleration"]
        );
    }

    #[test]
    fn given_same_index_when_reordering_then_unchanged() {
        let mut tree = CurriculumTree::seed();
        assert_eq!(tree.reorder(&science(), 1, 1), Edit::Unchanged);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "out of range")]
    fn given_out_of_range_index_when_reordering_then_debug_assertion_fires() {
        let mut tree = CurriculumTree::seed();
        tree.reorder(&science(), 0, 7);
    }

    #[test]
    fn given_seed_when_counting_then_totals_match() {
        let tree = CurriculumTree::seed();
        assert_eq!(tree.count(Level::Class), 2);
        assert_eq!(tree.count(Level::Subject), 3);
        assert_eq!(tree.count(Level::Chapter), 4);
        assert_eq!(tree.count(Level::Topic), 6);
        assert_eq!(tree.count(Level::Subtopic), 16);
        assert_eq!(tree.subtopic_paths().len(), 16);
    }

    #[test]
    fn given_subject_when_outlining_then_rows_are_sorted() {
        let tree = CurriculumTree::seed();
        let rows = tree.outline("Class 9", "Science");
        let pairs: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.chapter.as_str(), r.topic.as_str()))
            .collect();
        assert_eq!(
            pairs,
            [
                ("Biology", "Life Processes"),
                ("Physics", "Force"),
                ("Physics", "Motion"),
            ]
        );
        assert_eq!(rows[2].subtopics, 3);
        assert!(tree.outline("Class 9", "Art").is_empty());
    }

    #[test]
    fn given_path_when_taking_node_then_subtree_is_returned() {
        let tree = CurriculumTree::seed();
        let node = tree.node(&science().child("Physics")).unwrap();
        assert_eq!(node.name, "Physics");
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.children[0].children.len(), 3);
        assert!(tree.node(&science().child("Geology")).is_none());
        assert_eq!(tree.node(&NodePath::root()).unwrap().children.len(), 2);
    }

    #[test]
    fn given_tree_when_serializing_then_nested_json_object_in_order() {
        let mut tree = CurriculumTree::new();
        tree.add(&NodePath::root(), "Z").unwrap();
        tree.add(&NodePath::root(), "A").unwrap();
        tree.add(&NodePath::new(["Z"]), "S").unwrap();
        tree.add(&NodePath::new(["Z", "S"]), "C").unwrap();
        tree.add(&NodePath::new(["Z", "S", "C"]), "T").unwrap();
        tree.add(&NodePath::new(["Z", "S", "C", "T"]), "x").unwrap();
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, r#"{"Z":{"S":{"C":{"T":["x"]}}},"A":{}}"#);
        let back: CurriculumTree = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tree);
    }
}
