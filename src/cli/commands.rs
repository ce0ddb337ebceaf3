//! Command dispatch and handlers
//!
//! Handlers check every precondition of a tree edit (ancestors exist, the
//! named node exists, indices are in range) before calling into the
//! session, so the library only ever sees well-formed requests.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::services::EditorSession;
use crate::cli::args::{Cli, Commands, ConfigCommands, ContextArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{CurriculumTree, Edit, Level, NodePath, Selection, TreeNode};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

/// Load settings, wire collaborators and run the parsed command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if let Commands::Completion { shell } = &cli.command {
        cmd_completion(*shell);
        return Ok(());
    }

    let project_dir = cli
        .project_dir
        .clone()
        .or_else(|| std::env::current_dir().ok());
    let mut settings = Settings::load(project_dir.as_deref())?;
    if let Some(file) = &cli.data_file {
        apply_data_file(&mut settings, file)?;
    }
    debug!("settings: {:?}", settings);

    let container = ServiceContainer::new(settings);
    run(&cli.command, &container, project_dir.as_deref())
}

/// Run one command against the collaborators in `container`.
pub fn run(
    command: &Commands,
    container: &ServiceContainer,
    project_dir: Option<&Path>,
) -> CliResult<()> {
    match command {
        Commands::Completion { shell } => {
            cmd_completion(*shell);
            Ok(())
        }
        Commands::Config { command } => cmd_config(container, command, project_dir),
        Commands::Init { force } => cmd_init(container, *force),
        _ => {
            let mut session = container.session()?;
            match command {
                Commands::Show { context } => cmd_show(&session, context),
                Commands::List { level, context } => cmd_list(&session, *level, context),
                Commands::Add {
                    level,
                    name,
                    context,
                } => cmd_add(&mut session, *level, name, context),
                Commands::Rename {
                    level,
                    old,
                    new,
                    context,
                } => cmd_rename(&mut session, *level, old, new, context),
                Commands::Delete {
                    level,
                    name,
                    context,
                    yes,
                } => cmd_delete(container, &mut session, *level, name, context, *yes),
                Commands::Move {
                    level,
                    from,
                    to,
                    context,
                } => cmd_move(&mut session, *level, *from, *to, context),
                Commands::Select {
                    level,
                    name,
                    context,
                } => cmd_select(&mut session, *level, name, context),
                Commands::Selection => cmd_selection(&session),
                Commands::Deselect { level } => {
                    cmd_deselect(&mut session, level.unwrap_or(Level::Class))
                }
                Commands::Outline { context } => cmd_outline(&session, context),
                Commands::Paths => cmd_paths(&session),
                Commands::Stats => cmd_stats(&session),
                Commands::Completion { .. } | Commands::Config { .. } | Commands::Init { .. } => {
                    Ok(())
                }
            }
        }
    }
}

/// Point the settings at an explicit document; the selection sidecar sits next to it.
fn apply_data_file(settings: &mut Settings, file: &Path) -> CliResult<()> {
    let name = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::InvalidArgs(format!("not a file path: {}", file.display())))?;
    settings.curriculum_file = name.to_string();
    settings.data_dir = match file.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok(())
}

// ============================================================
// CONTEXT RESOLUTION
// ============================================================

/// Ancestor path for working at `level`.
///
/// Each missing flag is filled from the selection, but only while the path
/// built so far still runs along the selected chain.
pub fn resolve_context(
    context: &ContextArgs,
    level: Level,
    selection: &Selection,
) -> CliResult<NodePath> {
    let mut segments = Vec::with_capacity(level.depth());
    let mut on_selection = true;
    for ancestor in Level::ALL.into_iter().take(level.depth()) {
        let name = match context.get(ancestor) {
            Some(name) => {
                on_selection &= selection.get(ancestor) == Some(name);
                name
            }
            None if on_selection => selection.get(ancestor).ok_or_else(|| {
                CliError::Usage(format!(
                    "no {ancestor} selected: pass --{ancestor} or run `curtree select {ancestor} <name>`"
                ))
            })?,
            None => {
                return Err(CliError::Usage(format!(
                    "--{ancestor} is required for a {level}"
                )))
            }
        };
        segments.push(name.to_string());
    }
    Ok(NodePath::new(segments))
}

/// Path made of the given flags only, which must not skip a level.
fn explicit_path(context: &ContextArgs) -> CliResult<NodePath> {
    let mut segments = Vec::new();
    let mut gap: Option<Level> = None;
    for level in Level::ALL.into_iter().take(Level::Subtopic.depth()) {
        match (context.get(level), gap) {
            (Some(_), Some(missing)) => {
                return Err(CliError::Usage(format!("--{level} needs --{missing}")))
            }
            (Some(name), None) => segments.push(name.to_string()),
            (None, None) => gap = Some(level),
            (None, Some(_)) => {}
        }
    }
    Ok(NodePath::new(segments))
}

fn existing_context(
    session: &EditorSession,
    context: &ContextArgs,
    level: Level,
) -> CliResult<NodePath> {
    let path = resolve_context(context, level, session.selection())?;
    require_path(session.tree(), &path)?;
    Ok(path)
}

fn require_path(tree: &CurriculumTree, path: &NodePath) -> CliResult<()> {
    if tree.contains(path) {
        Ok(())
    } else {
        Err(CliError::InvalidArgs(format!("no such path: {path}")))
    }
}

fn require_node(tree: &CurriculumTree, path: &NodePath, level: Level, name: &str) -> CliResult<()> {
    if tree.contains(&path.child(name)) {
        Ok(())
    } else {
        Err(CliError::InvalidArgs(format!(
            "no {level} named '{name}' under {path}"
        )))
    }
}

fn clean_name(name: &str) -> CliResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        Err(CliError::InvalidArgs("name must not be empty".into()))
    } else {
        Ok(name)
    }
}

// ============================================================
// READ COMMANDS
// ============================================================

fn to_termtree(node: &TreeNode) -> Tree<String> {
    Tree::new(node.name.clone()).with_leaves(node.children.iter().map(to_termtree))
}

#[instrument(skip(session))]
fn cmd_show(session: &EditorSession, context: &ContextArgs) -> CliResult<()> {
    let path = explicit_path(context)?;
    let node = session
        .tree()
        .node(&path)
        .ok_or_else(|| CliError::InvalidArgs(format!("no such path: {path}")))?;
    output::info(&to_termtree(&node));
    Ok(())
}

#[instrument(skip(session))]
fn cmd_list(session: &EditorSession, level: Level, context: &ContextArgs) -> CliResult<()> {
    let path = existing_context(session, context, level)?;
    let names = session.tree().children(&path).unwrap_or_default();
    output::header(&format!("{}s under {}", level.title(), path));
    if names.is_empty() {
        output::detail(&"(none)");
    }
    let selected = session.selection().path();
    for (i, name) in names.iter().enumerate() {
        output::entry(i + 1, name, selected.starts_with(&path.child(*name)));
    }
    Ok(())
}

#[instrument(skip(session))]
fn cmd_selection(session: &EditorSession) -> CliResult<()> {
    let selection = session.selection();
    if selection.is_empty() {
        output::info(&"nothing selected");
        return Ok(());
    }
    for level in Level::ALL {
        if let Some(name) = selection.get(level) {
            output::action(level.title(), &name);
        }
    }
    Ok(())
}

#[instrument(skip(session))]
fn cmd_outline(session: &EditorSession, context: &ContextArgs) -> CliResult<()> {
    let path = existing_context(session, context, Level::Chapter)?;
    let (class, subject) = match path.segments() {
        [class, subject] => (class, subject),
        _ => return Err(CliError::Usage("--class and --subject are required".into())),
    };
    let rows = session.tree().outline(class, subject);
    output::header(&path);
    if rows.is_empty() {
        output::detail(&"no chapters");
        return Ok(());
    }
    let chapter_w = rows.iter().map(|r| r.chapter.len()).max().unwrap_or(0);
    let topic_w = rows.iter().map(|r| r.topic.len()).max().unwrap_or(0);
    for row in rows {
        output::detail(&format!(
            "{:<chapter_w$}  {:<topic_w$}  {} subtopics",
            row.chapter, row.topic, row.subtopics
        ));
    }
    Ok(())
}

#[instrument(skip(session))]
fn cmd_paths(session: &EditorSession) -> CliResult<()> {
    for path in session.tree().subtopic_paths() {
        output::info(&path);
    }
    Ok(())
}

#[instrument(skip(session))]
fn cmd_stats(session: &EditorSession) -> CliResult<()> {
    for level in Level::ALL {
        output::info(&format!(
            "{:<10} {}",
            level.title(),
            session.tree().count(level)
        ));
    }
    Ok(())
}

// ============================================================
// EDIT COMMANDS
// ============================================================

#[instrument(skip(session))]
fn cmd_add(
    session: &mut EditorSession,
    level: Level,
    name: &str,
    context: &ContextArgs,
) -> CliResult<()> {
    let path = existing_context(session, context, level)?;
    let name = clean_name(name)?;
    match session.add(&path, name)? {
        Edit::Unchanged => output::warning(&format!(
            "{} '{}' already exists under {}, nothing added",
            level.title(),
            name,
            path
        )),
        _ => output::success(&format!("Added {} '{}' under {}", level, name, path)),
    }
    Ok(())
}

#[instrument(skip(session))]
fn cmd_rename(
    session: &mut EditorSession,
    level: Level,
    old: &str,
    new: &str,
    context: &ContextArgs,
) -> CliResult<()> {
    let path = existing_context(session, context, level)?;
    require_node(session.tree(), &path, level, old)?;
    let new = clean_name(new)?;
    match session.rename(&path, old, new)? {
        Edit::Unchanged => output::info(&"nothing to rename"),
        _ => output::success(&format!("Renamed {} '{}' to '{}'", level, old, new)),
    }
    Ok(())
}

#[instrument(skip(container, session))]
fn cmd_delete(
    container: &ServiceContainer,
    session: &mut EditorSession,
    level: Level,
    name: &str,
    context: &ContextArgs,
    yes: bool,
) -> CliResult<()> {
    let path = existing_context(session, context, level)?;
    require_node(session.tree(), &path, level, name)?;

    if container.settings.confirm_delete && !yes {
        let question = format!(
            "Delete {} '{}' and everything under it?",
            level, name
        );
        let confirmed = container
            .confirmer
            .confirm(&question)
            .map_err(|e| InfraError::io("read confirmation", e))?;
        if !confirmed {
            return Err(CliError::Aborted);
        }
    }

    session.delete(&path, name)?;
    output::success(&format!("Deleted {} '{}' from {}", level, name, path));
    Ok(())
}

#[instrument(skip(session))]
fn cmd_move(
    session: &mut EditorSession,
    level: Level,
    from: usize,
    to: usize,
    context: &ContextArgs,
) -> CliResult<()> {
    let path = existing_context(session, context, level)?;
    let count = session.tree().children(&path).map_or(0, |c| c.len());
    for (label, index) in [("from", from), ("to", to)] {
        if index == 0 || index > count {
            return Err(CliError::InvalidArgs(format!(
                "{label} position {index} out of range 1..={count}"
            )));
        }
    }
    match session.reorder(&path, from - 1, to - 1)? {
        Edit::Unchanged => output::info(&"nothing to move"),
        _ => output::success(&format!("Moved {} {} to position {}", level, from, to)),
    }
    Ok(())
}

#[instrument(skip(session))]
fn cmd_select(
    session: &mut EditorSession,
    level: Level,
    name: &str,
    context: &ContextArgs,
) -> CliResult<()> {
    if level.is_leaf() {
        return Err(CliError::Usage("subtopics cannot be selected".into()));
    }
    let path = existing_context(session, context, level)?;
    require_node(session.tree(), &path, level, name)?;
    if !session.select(&path, name)? {
        return Err(CliError::InvalidArgs(format!("cannot select {level} '{name}'")));
    }
    output::success(&format!("Selected {}", session.selection().path()));
    Ok(())
}

#[instrument(skip(session))]
fn cmd_deselect(session: &mut EditorSession, level: Level) -> CliResult<()> {
    session.deselect(level)?;
    output::success(&format!("Cleared selection from {level} down"));
    Ok(())
}

// ============================================================
// DOCUMENT / SETTINGS COMMANDS
// ============================================================

#[instrument(skip(container))]
fn cmd_init(container: &ServiceContainer, force: bool) -> CliResult<()> {
    let path = container.settings.curriculum_path();
    if container.fs.exists(&path) && !force {
        return Err(CliError::Usage(format!(
            "{} already exists, use --force to overwrite",
            path.display()
        )));
    }
    container.curriculum.reset(&CurriculumTree::seed())?;
    container.selection.save(&Selection::default())?;
    output::success(&format!("Initialized {}", container.curriculum.location()));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_config(
    container: &ServiceContainer,
    command: &ConfigCommands,
    project_dir: Option<&Path>,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".into())
                })?
            } else {
                local_config_path(project_dir.unwrap_or_else(|| Path::new(".")))
            };
            if container.fs.exists(&path) {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            container
                .fs
                .ensure_parent(&path)
                .and_then(|_| container.fs.write(&path, &Settings::template()))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(p) => output::action("Global", &p.display()),
                None => output::action("Global", &"(unavailable)"),
            }
            if let Some(dir) = project_dir {
                output::action("Local", &local_config_path(dir).display());
            }
            output::action("Curriculum", &container.settings.curriculum_path().display());
            output::action("Selection", &container.settings.selection_path().display());
        }
    }
    Ok(())
}

fn cmd_completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(class: Option<&str>, subject: Option<&str>) -> ContextArgs {
        ContextArgs {
            class: class.map(str::to_string),
            subject: subject.map(str::to_string),
            ..ContextArgs::default()
        }
    }

    fn selected(path: &[&str]) -> Selection {
        let mut selection = Selection::default();
        let (name, ancestors) = path.split_last().unwrap();
        assert!(selection.select(&NodePath::new(ancestors.iter().copied()), name));
        selection
    }

    #[test]
    fn given_no_flags_when_resolving_then_selection_supplies_ancestors() {
        let selection = selected(&["Class 9", "Science", "Physics"]);
        let path = resolve_context(&ContextArgs::default(), Level::Topic, &selection).unwrap();
        assert_eq!(path, NodePath::new(["Class 9", "Science", "Physics"]));
    }

    #[test]
    fn given_class_level_when_resolving_then_root() {
        let path =
            resolve_context(&ContextArgs::default(), Level::Class, &Selection::default()).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn given_flag_off_selection_when_resolving_then_deeper_flags_required() {
        let selection = selected(&["Class 9", "Science"]);
        let result = resolve_context(&context(Some("Class 10"), None), Level::Chapter, &selection);
        assert!(matches!(result, Err(CliError::Usage(_))));
    }

    #[test]
    fn given_flag_on_selection_when_resolving_then_selection_continues() {
        let selection = selected(&["Class 9", "Science"]);
        let path =
            resolve_context(&context(Some("Class 9"), None), Level::Chapter, &selection).unwrap();
        assert_eq!(path, NodePath::new(["Class 9", "Science"]));
    }

    #[test]
    fn given_nothing_selected_when_resolving_subject_then_usage_error() {
        let result = resolve_context(&ContextArgs::default(), Level::Subject, &Selection::default());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("no class selected"));
    }

    #[test]
    fn given_skipped_level_when_building_explicit_path_then_usage_error() {
        let result = explicit_path(&context(None, Some("Science")));
        assert!(matches!(result, Err(CliError::Usage(_))));
    }

    #[test]
    fn given_relative_data_file_when_applied_then_data_dir_is_cwd() {
        let mut settings = Settings::default();
        apply_data_file(&mut settings, Path::new("school.json")).unwrap();
        assert_eq!(settings.curriculum_path(), PathBuf::from("./school.json"));
        assert_eq!(settings.selection_path(), PathBuf::from("./selection.json"));
    }

    #[test]
    fn given_blank_name_when_cleaning_then_rejected() {
        assert!(clean_name("   ").is_err());
        assert_eq!(clean_name(" Optics ").unwrap(), "Optics");
    }
}
