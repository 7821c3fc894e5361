//! Project-level edits on an in-memory portfolio.

use crate::model::{AppData, Project};

/// Which child lists a clone copies from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloneOptions {
    pub risks: bool,
    pub tasks: bool,
    pub actions: bool,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            risks: true,
            tasks: true,
            actions: true,
        }
    }
}

pub fn default_clone_name(source: &Project) -> String {
    format!("{} (Copy)", source.name)
}

/// Copy of `source` under a new identity. Child lists not selected in
/// `options` start empty; every other field is copied as is.
pub fn clone_project(
    source: &Project,
    new_name: impl Into<String>,
    options: CloneOptions,
    new_id: i64,
) -> Project {
    let mut clone = source.clone();
    clone.id = new_id;
    clone.name = new_name.into();
    if !options.risks {
        clone.risks.clear();
    }
    if !options.tasks {
        clone.tasks.clear();
    }
    if !options.actions {
        clone.actions.clear();
    }
    clone
}

/// Clones project `source_id` into `data`, returning the new project's id,
/// or `None` when no such project exists.
pub fn clone_into(
    data: &mut AppData,
    source_id: i64,
    new_name: Option<String>,
    options: CloneOptions,
) -> Option<i64> {
    let source = data.project(source_id)?;
    let new_id = data.next_project_id();
    let name = new_name.unwrap_or_else(|| default_clone_name(source));
    let clone = clone_project(source, name, options, new_id);
    crate::log_info!(source_id, new_id, "cloned project '{}'", clone.name);
    data.projects.push(clone);
    Some(new_id)
}
