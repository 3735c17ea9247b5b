use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identity of a task item. Stable across moves and edits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// A fresh random (v4) id
    pub fn generate() -> Self {
        TaskId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first `width` characters, for compact display
    pub fn short(&self, width: usize) -> &str {
        match self.0.char_indices().nth(width) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        TaskId(s)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Task priority, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    VeryHigh,
    High,
    Medium,
    Low,
    VeryLow,
}

impl Priority {
    /// Short marker used in list output (`p1` = very high … `p5` = very low)
    pub fn marker(self) -> &'static str {
        match self {
            Priority::VeryHigh => "p1",
            Priority::High => "p2",
            Priority::Medium => "p3",
            Priority::Low => "p4",
            Priority::VeryLow => "p5",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Priority::VeryHigh => "very-high",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::VeryLow => "very-low",
        };
        f.write_str(name)
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "very-high" | "veryhigh" | "p1" => Ok(Priority::VeryHigh),
            "high" | "p2" => Ok(Priority::High),
            "medium" | "p3" => Ok(Priority::Medium),
            "low" | "p4" => Ok(Priority::Low),
            "very-low" | "verylow" | "p5" => Ok(Priority::VeryLow),
            other => Err(format!(
                "invalid priority '{}' (expected very-high, high, medium, low, very-low or p1..p5)",
                other
            )),
        }
    }
}

/// A label from the board's catalog, copied onto tasks that use it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub title: String,
}

/// A task with its nested children. Children are owned by their parent;
/// there are no back-references.
///
/// `Clone`, `PartialEq` and `Drop` walk the tree with an explicit stack, so
/// arbitrarily deep chains never exhaust the call stack.
#[derive(Debug)]
pub struct TaskItem {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub due: Option<NaiveDateTime>,
    pub priority: Option<Priority>,
    pub labels: Vec<Label>,
    pub done: bool,
    pub collapsed: bool,
    pub children: Vec<TaskItem>,
}

impl TaskItem {
    /// Create a new open, expanded task with a fresh id
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(TaskId::generate(), title)
    }

    pub fn with_id(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        TaskItem {
            id: id.into(),
            title: title.into(),
            description: None,
            due: None,
            priority: None,
            labels: Vec::new(),
            done: false,
            collapsed: false,
            children: Vec::new(),
        }
    }

    /// Builder-style child append
    pub fn child(mut self, child: TaskItem) -> Self {
        self.children.push(child);
        self
    }

    /// Number of tasks below this one, at any depth
    pub fn descendant_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&TaskItem> = self.children.iter().collect();
        while let Some(task) = stack.pop() {
            count += 1;
            stack.extend(task.children.iter());
        }
        count
    }

    /// A copy of this task's own fields with no children
    fn without_children(&self) -> TaskItem {
        TaskItem {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            due: self.due,
            priority: self.priority,
            labels: self.labels.clone(),
            done: self.done,
            collapsed: self.collapsed,
            children: Vec::new(),
        }
    }

    fn same_fields(&self, other: &TaskItem) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.description == other.description
            && self.due == other.due
            && self.priority == other.priority
            && self.labels == other.labels
            && self.done == other.done
            && self.collapsed == other.collapsed
    }
}

impl Clone for TaskItem {
    fn clone(&self) -> Self {
        let mut order: Vec<&TaskItem> = Vec::new();
        let mut stack: Vec<&TaskItem> = self.children.iter().rev().collect();
        while let Some(task) = stack.pop() {
            order.push(task);
            stack.extend(task.children.iter().rev());
        }

        // Reverse pre-order finishes every subtree before its parent; the
        // finished children sit on top of `built`, last child first.
        let mut built: Vec<TaskItem> = Vec::with_capacity(order.len());
        for task in order.into_iter().rev() {
            let mut copy = task.without_children();
            copy.children = built.split_off(built.len() - task.children.len());
            copy.children.reverse();
            built.push(copy);
        }
        built.reverse();

        let mut root = self.without_children();
        root.children = built;
        root
    }
}

impl PartialEq for TaskItem {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if !a.same_fields(b) || a.children.len() != b.children.len() {
                return false;
            }
            stack.extend(a.children.iter().zip(b.children.iter()));
        }
        true
    }
}

impl Drop for TaskItem {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut task) = stack.pop() {
            stack.append(&mut task.children);
        }
    }
}

/// Field changes for an edit. `None` leaves a field untouched; the nested
/// `Option` on clearable fields distinguishes "set" from "clear".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub due: Option<Option<NaiveDateTime>>,
    pub priority: Option<Option<Priority>>,
    pub labels: Option<Vec<Label>>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due.is_none()
            && self.priority.is_none()
            && self.labels.is_none()
    }
}
