//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (CurriculumStore, SelectionStore)
//! but are themselves concrete structs, not traits.

mod hierarchy;
mod session;

pub use hierarchy::HierarchyService;
pub use session::EditorSession;
