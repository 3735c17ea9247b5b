use serde::{Deserialize, Serialize};
use std::fmt;

use super::task::{Label, TaskItem};

/// Identity of a section on the board
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn generate() -> Self {
        SectionId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn short(&self, width: usize) -> &str {
        match self.0.char_indices().nth(width) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl From<&str> for SectionId {
    fn from(s: &str) -> Self {
        SectionId(s.to_string())
    }
}

impl From<String> for SectionId {
    fn from(s: String) -> Self {
        SectionId(s)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A titled group of tasks. Each section owns exactly one root list.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: SectionId,
    pub title: String,
    /// Whole-section fold (independent of per-task collapse)
    pub collapsed: bool,
    pub tasks: Vec<TaskItem>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Section {
            id: SectionId::generate(),
            title: title.into(),
            collapsed: false,
            tasks: Vec::new(),
        }
    }

    /// Total number of tasks at every depth
    pub fn task_count(&self) -> usize {
        self.tasks.iter().map(|t| 1 + t.descendant_count()).sum()
    }
}

/// The persisted board: sections in display order plus the label catalog.
/// See `io::board_json` for how it is laid out on disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardDoc {
    pub sections: Vec<Section>,
    pub labels: Vec<Label>,
}

impl BoardDoc {
    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| &s.id == id)
    }

    pub fn section_mut(&mut self, id: &SectionId) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| &s.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_count_includes_nested() {
        let mut section = Section::new("Inbox");
        section.tasks.push(
            TaskItem::with_id("a", "A")
                .child(TaskItem::with_id("b", "B").child(TaskItem::with_id("c", "C"))),
        );
        section.tasks.push(TaskItem::with_id("d", "D"));
        assert_eq!(section.task_count(), 4);
    }
}
