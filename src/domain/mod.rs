//! Domain layer: the curriculum tree and its editing rules
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod level;
pub mod ordered_map;
pub mod selection;
pub mod tree;

pub use error::{DomainError, DomainResult};
pub use level::{Level, NodePath, UnknownLevel};
pub use ordered_map::OrderedMap;
pub use selection::Selection;
pub use tree::{CurriculumTree, Edit, OutlineRow, TreeNode};
