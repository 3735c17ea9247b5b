use std::collections::HashSet;

use crate::model::task::{TaskEdit, TaskId, TaskItem};

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("task id prefix is ambiguous: {0}")]
    Ambiguous(String),
    #[error("a drag is already in progress for task {0}")]
    DragInProgress(TaskId),
    #[error("task title cannot be empty")]
    EmptyTitle,
    #[error("task id already exists in this section: {0}")]
    DuplicateId(TaskId),
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Find a task by ID anywhere in the tree (pre-order, explicit stack).
pub fn find_task<'a>(roots: &'a [TaskItem], id: &TaskId) -> Option<&'a TaskItem> {
    let mut stack: Vec<&TaskItem> = roots.iter().rev().collect();
    while let Some(task) = stack.pop() {
        if &task.id == id {
            return Some(task);
        }
        stack.extend(task.children.iter().rev());
    }
    None
}

/// Find a task by ID anywhere in the tree, return mutable ref.
pub fn find_task_mut<'a>(roots: &'a mut [TaskItem], id: &TaskId) -> Option<&'a mut TaskItem> {
    let mut stack: Vec<&'a mut TaskItem> = roots.iter_mut().rev().collect();
    while let Some(task) = stack.pop() {
        if &task.id == id {
            return Some(task);
        }
        stack.extend(task.children.iter_mut().rev());
    }
    None
}

/// Resolve a user-typed id: an exact match wins, otherwise a unique prefix.
pub fn resolve_task_id(roots: &[TaskItem], input: &str) -> Result<TaskId, TaskError> {
    let mut matches = Vec::new();
    let mut stack: Vec<&TaskItem> = roots.iter().collect();
    while let Some(task) = stack.pop() {
        if task.id.as_str() == input {
            return Ok(task.id.clone());
        }
        if !input.is_empty() && task.id.as_str().starts_with(input) {
            matches.push(&task.id);
        }
        stack.extend(task.children.iter());
    }
    match matches.as_slice() {
        [one] => Ok((*one).clone()),
        [] => Err(TaskError::NotFound(input.to_string())),
        _ => Err(TaskError::Ambiguous(input.to_string())),
    }
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// Append a task at the root, or as the last child of `parent`.
///
/// Every id in the added subtree must be new to the tree.
pub fn add_task(
    roots: &mut Vec<TaskItem>,
    task: TaskItem,
    parent: Option<&TaskId>,
) -> Result<TaskId, TaskError> {
    if task.title.trim().is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    check_new_ids(roots, &task)?;
    let id = task.id.clone();
    match parent {
        None => roots.push(task),
        Some(parent_id) => {
            let parent = find_task_mut(roots, parent_id)
                .ok_or_else(|| TaskError::NotFound(parent_id.to_string()))?;
            parent.children.push(task);
        }
    }
    Ok(id)
}

fn check_new_ids(roots: &[TaskItem], task: &TaskItem) -> Result<(), TaskError> {
    let mut seen: HashSet<&TaskId> = HashSet::new();
    let mut stack: Vec<&TaskItem> = roots.iter().collect();
    while let Some(t) = stack.pop() {
        seen.insert(&t.id);
        stack.extend(t.children.iter());
    }
    let mut stack = vec![task];
    while let Some(t) = stack.pop() {
        if !seen.insert(&t.id) {
            return Err(TaskError::DuplicateId(t.id.clone()));
        }
        stack.extend(t.children.iter());
    }
    Ok(())
}

/// Remove a task and everything under it. Children are not promoted.
pub fn delete_task(roots: &mut Vec<TaskItem>, id: &TaskId) -> Result<TaskItem, TaskError> {
    let mut stack: Vec<&mut Vec<TaskItem>> = vec![roots];
    while let Some(list) = stack.pop() {
        if let Some(pos) = list.iter().position(|t| &t.id == id) {
            return Ok(list.remove(pos));
        }
        for task in list.iter_mut() {
            stack.push(&mut task.children);
        }
    }
    Err(TaskError::NotFound(id.to_string()))
}

/// Flip the collapse flag. Returns the new value.
pub fn toggle_collapse(roots: &mut [TaskItem], id: &TaskId) -> Result<bool, TaskError> {
    let task = find_task_mut(roots, id).ok_or_else(|| TaskError::NotFound(id.to_string()))?;
    task.collapsed = !task.collapsed;
    Ok(task.collapsed)
}

/// Flip the done flag. Returns the new value.
pub fn toggle_done(roots: &mut [TaskItem], id: &TaskId) -> Result<bool, TaskError> {
    let task = find_task_mut(roots, id).ok_or_else(|| TaskError::NotFound(id.to_string()))?;
    task.done = !task.done;
    Ok(task.done)
}

/// Apply field edits to a task
pub fn edit_task(roots: &mut [TaskItem], id: &TaskId, edit: TaskEdit) -> Result<(), TaskError> {
    if edit.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(TaskError::EmptyTitle);
    }
    let task = find_task_mut(roots, id).ok_or_else(|| TaskError::NotFound(id.to_string()))?;
    if let Some(title) = edit.title {
        task.title = title;
    }
    if let Some(description) = edit.description {
        task.description = description.filter(|d| !d.is_empty());
    }
    if let Some(due) = edit.due {
        task.due = due;
    }
    if let Some(priority) = edit.priority {
        task.priority = priority;
    }
    if let Some(labels) = edit.labels {
        task.labels = labels;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
