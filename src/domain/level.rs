//! Hierarchy levels and ancestor paths

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One of the five levels of the curriculum hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    Class,
    Subject,
    Chapter,
    Topic,
    Subtopic,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Class,
        Level::Subject,
        Level::Chapter,
        Level::Topic,
        Level::Subtopic,
    ];

    /// Number of ancestor keys needed to address this level.
    pub fn depth(self) -> usize {
        self as usize
    }

    /// Level addressed by a path with `depth` ancestor keys.
    pub fn at_depth(depth: usize) -> Option<Level> {
        Self::ALL.get(depth).copied()
    }

    pub fn parent(self) -> Option<Level> {
        self.depth().checked_sub(1).and_then(Self::at_depth)
    }

    pub fn child(self) -> Option<Level> {
        Self::at_depth(self.depth() + 1)
    }

    /// Subtopics are plain strings in a list, every other level is a map.
    pub fn is_leaf(self) -> bool {
        self == Level::Subtopic
    }

    /// Tag used by callers: "class", "subject", ...
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Class => "class",
            Level::Subject => "subject",
            Level::Chapter => "chapter",
            Level::Topic => "topic",
            Level::Subtopic => "subtopic",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Level::Class => "Class",
            Level::Subject => "Subject",
            Level::Chapter => "Chapter",
            Level::Topic => "Topic",
            Level::Subtopic => "Subtopic",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown level '{0}' (expected class, subject, chapter, topic or subtopic)")]
pub struct UnknownLevel(pub String);

impl FromStr for Level {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLevel(s.to_string()))
    }
}

/// Ancestor keys leading to one level of the tree.
///
/// The empty path addresses the class level, `[class]` the subjects of that
/// class, and so on down to `[class, subject, chapter, topic]` which
/// addresses a subtopic list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath {
    segments: Vec<String>,
}

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Level whose siblings this path addresses, `None` if the path is too deep.
    pub fn level(&self) -> Option<Level> {
        Level::at_depth(self.segments.len())
    }

    /// Path one level further down, through `name`.
    pub fn child(&self, name: impl Into<String>) -> NodePath {
        let mut segments = self.segments.clone();
        segments.push(name.into());
        NodePath { segments }
    }

    pub fn starts_with(&self, prefix: &NodePath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        f.write_str(&self.segments.join(" > "))
    }
}
