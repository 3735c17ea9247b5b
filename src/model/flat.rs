use chrono::NaiveDateTime;
use serde::Serialize;

use super::task::{Label, Priority, TaskId, TaskItem};

/// One row of a flattened task tree.
///
/// `depth`, `parent_id` and `index` are derived on every flatten and are
/// never written back to storage. `parent_id` is a lookup key, not a link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatItem {
    pub id: TaskId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
    pub done: bool,
    pub collapsed: bool,
    /// Distance from the virtual root (0 = top level)
    pub depth: usize,
    pub parent_id: Option<TaskId>,
    /// Position in the unfiltered flat sequence
    pub index: usize,
    pub has_children: bool,
}

impl FlatItem {
    /// Copy a task's scalar fields into a flat row
    pub fn from_task(task: &TaskItem, depth: usize, parent_id: Option<TaskId>, index: usize) -> Self {
        FlatItem {
            id: task.id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            due: task.due,
            priority: task.priority,
            labels: task.labels.clone(),
            done: task.done,
            collapsed: task.collapsed,
            depth,
            parent_id,
            index,
            has_children: !task.children.is_empty(),
        }
    }

    /// A childless task carrying this row's fields
    pub fn into_task(self) -> TaskItem {
        TaskItem {
            id: self.id,
            title: self.title,
            description: self.description,
            due: self.due,
            priority: self.priority,
            labels: self.labels,
            done: self.done,
            collapsed: self.collapsed,
            children: Vec::new(),
        }
    }
}
