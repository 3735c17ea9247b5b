//! On-disk shape of `board.json`.
//!
//! Each section stores its tasks as pre-order rows that name their parent,
//! not as nested objects. Reading and writing a board therefore never
//! recurses with the depth of a tree; the nesting is rebuilt with
//! [`build_tree`] on load.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::model::flat::FlatItem;
use crate::model::section::{BoardDoc, Section, SectionId};
use crate::model::task::{Label, Priority, TaskId};
use crate::ops::build::build_tree;
use crate::ops::flatten::flatten;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredBoard {
    #[serde(default)]
    sections: Vec<StoredSection>,
    #[serde(default)]
    labels: Vec<Label>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredSection {
    id: SectionId,
    title: String,
    #[serde(default)]
    collapsed: bool,
    #[serde(default)]
    tasks: Vec<StoredTask>,
}

/// One task row. `parent_id` is absent for top-level tasks.
#[derive(Debug, Serialize, Deserialize)]
struct StoredTask {
    id: TaskId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<TaskId>,
    title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    due: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    labels: Vec<Label>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    collapsed: bool,
}

impl StoredTask {
    fn from_flat(item: FlatItem) -> Self {
        StoredTask {
            id: item.id,
            parent_id: item.parent_id,
            title: item.title,
            description: item.description,
            due: item.due,
            priority: item.priority,
            labels: item.labels,
            done: item.done,
            collapsed: item.collapsed,
        }
    }

    /// Depth and child flags are left for the builder to work out.
    fn into_flat(self, index: usize) -> FlatItem {
        FlatItem {
            id: self.id,
            title: self.title,
            description: self.description,
            due: self.due,
            priority: self.priority,
            labels: self.labels,
            done: self.done,
            collapsed: self.collapsed,
            depth: 0,
            parent_id: self.parent_id,
            index,
            has_children: false,
        }
    }
}

impl From<&Section> for StoredSection {
    fn from(section: &Section) -> Self {
        StoredSection {
            id: section.id.clone(),
            title: section.title.clone(),
            collapsed: section.collapsed,
            tasks: flatten(&section.tasks)
                .into_iter()
                .map(StoredTask::from_flat)
                .collect(),
        }
    }
}

impl From<StoredSection> for Section {
    fn from(stored: StoredSection) -> Self {
        let rows = stored
            .tasks
            .into_iter()
            .enumerate()
            .map(|(index, task)| task.into_flat(index))
            .collect();
        Section {
            id: stored.id,
            title: stored.title,
            collapsed: stored.collapsed,
            tasks: build_tree(rows),
        }
    }
}

/// Serialize a board as pretty JSON with a trailing newline.
pub fn to_json(doc: &BoardDoc) -> serde_json::Result<String> {
    let stored = StoredBoard {
        sections: doc.sections.iter().map(StoredSection::from).collect(),
        labels: doc.labels.clone(),
    };
    let mut json = serde_json::to_string_pretty(&stored)?;
    json.push('\n');
    Ok(json)
}

/// Parse `board.json` text. Missing top-level keys default to empty.
pub fn from_json(text: &str) -> serde_json::Result<BoardDoc> {
    let stored: StoredBoard = serde_json::from_str(text)?;
    Ok(BoardDoc {
        sections: stored.sections.into_iter().map(Section::from).collect(),
        labels: stored.labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::TaskItem;
    use pretty_assertions::assert_eq;

    fn doc() -> BoardDoc {
        let mut b = TaskItem::with_id("b", "B").child(TaskItem::with_id("c", "C"));
        b.collapsed = true;
        b.priority = Some(Priority::High);
        let mut section = Section::new("Work");
        section.id = SectionId::from("work");
        section.tasks = vec![
            TaskItem::with_id("a", "A")
                .child(b)
                .child(TaskItem::with_id("d", "D")),
        ];
        BoardDoc {
            sections: vec![section],
            labels: vec![Label {
                id: "0".into(),
                title: "read".into(),
            }],
        }
    }

    #[test]
    fn test_board_round_trips() {
        let doc = doc();
        assert_eq!(from_json(&to_json(&doc).unwrap()).unwrap(), doc);
    }

    #[test]
    fn test_tasks_are_stored_as_parented_rows() {
        let json: serde_json::Value = serde_json::from_str(&to_json(&doc()).unwrap()).unwrap();
        let rows = json["sections"][0]["tasks"].as_array().unwrap();
        let pairs: Vec<(&str, Option<&str>)> = rows
            .iter()
            .map(|r| (r["id"].as_str().unwrap(), r["parent_id"].as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("a", None), ("b", Some("a")), ("c", Some("b")), ("d", Some("a"))]
        );
        assert!(rows.iter().all(|r| r.get("children").is_none()));
        assert!(rows.iter().all(|r| r.get("depth").is_none()));
        assert_eq!(rows[1]["priority"], "high");
        assert_eq!(rows[1]["collapsed"], true);
    }

    #[test]
    fn test_empty_object_is_empty_board() {
        assert_eq!(from_json("{}").unwrap(), BoardDoc::default());
    }

    #[test]
    fn test_deep_chain_round_trips() {
        let mut section = Section::new("Deep");
        section.id = SectionId::from("deep");
        let mut node = TaskItem::with_id("leaf", "leaf");
        for i in 0..5_000 {
            node = TaskItem::with_id(format!("n{}", i), "n").child(node);
        }
        section.tasks.push(node);
        let doc = BoardDoc {
            sections: vec![section],
            labels: Vec::new(),
        };

        let back = from_json(&to_json(&doc).unwrap()).unwrap();
        assert_eq!(back.sections[0].task_count(), 5_001);
        assert!(back == doc);
    }
}
