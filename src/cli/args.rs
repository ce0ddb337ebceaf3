//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint};

use crate::domain::Level;

/// Edit an ordered Class > Subject > Chapter > Topic > Subtopic curriculum
#[derive(Parser, Debug)]
#[command(name = "curtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory holding a local .curtree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// Curriculum document to edit (overrides data_dir and curriculum_file)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub data_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Ancestor names for the level being operated on.
///
/// Flags that are left out are taken from the current selection.
#[derive(Args, Debug, Default, Clone)]
pub struct ContextArgs {
    /// Class name
    #[arg(long)]
    pub class: Option<String>,

    /// Subject name
    #[arg(long)]
    pub subject: Option<String>,

    /// Chapter name
    #[arg(long)]
    pub chapter: Option<String>,

    /// Topic name
    #[arg(long)]
    pub topic: Option<String>,
}

impl ContextArgs {
    /// Flag value for an ancestor level; subtopics are never context.
    pub fn get(&self, level: Level) -> Option<&str> {
        match level {
            Level::Class => self.class.as_deref(),
            Level::Subject => self.subject.as_deref(),
            Level::Chapter => self.chapter.as_deref(),
            Level::Topic => self.topic.as_deref(),
            Level::Subtopic => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        Level::ALL.iter().all(|l| self.get(*l).is_none())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the hierarchy as a tree
    Show {
        #[command(flatten)]
        context: ContextArgs,
    },

    /// List the names at one level, numbered
    List {
        /// class, subject, chapter, topic or subtopic
        level: Level,
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Append a name at a level
    Add {
        level: Level,
        name: String,
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Rename a node in place
    Rename {
        level: Level,
        old: String,
        new: String,
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Delete a node and everything below it
    Delete {
        level: Level,
        name: String,
        #[command(flatten)]
        context: ContextArgs,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Move a node to another position among its siblings (1-based)
    Move {
        level: Level,
        from: usize,
        to: usize,
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Select a node; later commands default to it as context
    Select {
        level: Level,
        name: String,
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Show the current selection
    Selection,

    /// Clear the selection from a level down (default: everything)
    Deselect {
        level: Option<Level>,
    },

    /// Chapter and topic rows of one subject
    Outline {
        #[command(flatten)]
        context: ContextArgs,
    },

    /// Print every full path down to the subtopics
    Paths,

    /// Count nodes per level
    Stats,

    /// Write the built-in curriculum document
    Init {
        /// Overwrite an existing document
        #[arg(short, long)]
        force: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}
