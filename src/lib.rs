//! curtree: an ordered Class > Subject > Chapter > Topic > Subtopic
//! curriculum store with selection cursors and JSON persistence.
//!
//! Layers, innermost first: `domain` (tree, ordering, cursors),
//! `application` (atomic edit service, editing session), `infrastructure`
//! (file stores, DI container), `cli` (command-line front end).

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
