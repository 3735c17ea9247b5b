use std::collections::HashMap;

use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::model::flat::FlatItem;
use crate::model::section::Section;
use crate::model::task::TaskId;
use crate::ops::drag::DropOutcome;
use crate::ops::flatten::{flatten, visible_items};
use crate::util::unicode::{pad_to_width, truncate_to_width};

/// Titles longer than this many cells are cut with `…`
const TITLE_WIDTH: usize = 72;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct SectionInfoJson {
    pub id: String,
    pub title: String,
    pub collapsed: bool,
    pub task_count: usize,
}

#[derive(Serialize)]
pub struct SectionListJson {
    pub id: String,
    pub title: String,
    pub collapsed: bool,
    pub items: Vec<FlatItem>,
}

#[derive(Serialize)]
pub struct DropJson {
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<TaskId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
}

#[derive(Serialize)]
pub struct TaskRefJson {
    pub section: String,
    pub id: TaskId,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn section_info_json(section: &Section) -> SectionInfoJson {
    SectionInfoJson {
        id: section.id.to_string(),
        title: section.title.clone(),
        collapsed: section.collapsed,
        task_count: section.task_count(),
    }
}

pub fn section_list_json(section: &Section, all: bool) -> SectionListJson {
    let items = if all {
        flatten(&section.tasks)
    } else if section.collapsed {
        Vec::new()
    } else {
        visible_items(&section.tasks, None)
    };
    SectionListJson {
        id: section.id.to_string(),
        title: section.title.clone(),
        collapsed: section.collapsed,
        items,
    }
}

pub fn drop_json(outcome: &DropOutcome) -> DropJson {
    match outcome {
        DropOutcome::Moved {
            task_id,
            parent_id,
            depth,
        } => DropJson {
            outcome: "moved",
            task_id: Some(task_id.clone()),
            parent_id: parent_id.clone(),
            depth: Some(*depth),
        },
        DropOutcome::Cancelled => DropJson {
            outcome: "cancelled",
            task_id: None,
            parent_id: None,
            depth: None,
        },
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Display options for list output, taken from `[ui]`
#[derive(Debug, Clone, Copy)]
pub struct ListStyle {
    pub show_ids: bool,
    pub id_width: usize,
}

/// End-of-day due dates print as a bare date
pub fn format_due(due: NaiveDateTime) -> String {
    if due.time() == end_of_day() {
        due.format("%Y-%m-%d").to_string()
    } else {
        due.format("%Y-%m-%d %H:%M").to_string()
    }
}

pub fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 59).unwrap_or_default()
}

/// Parse `YYYY-MM-DD` (end of that day) or `YYYY-MM-DD HH:MM`
pub fn parse_due(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        return Ok(dt);
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(end_of_day()))
        .map_err(|_| format!("invalid due date '{}' (expected YYYY-MM-DD or \"YYYY-MM-DD HH:MM\")", s))
}

/// One row of `td list`
pub fn format_item_line(
    item: &FlatItem,
    style: &ListStyle,
    hidden: usize,
    now: NaiveDateTime,
) -> String {
    let indent = "  ".repeat(item.depth);
    let fold = match (item.has_children, item.collapsed) {
        (true, true) => '▸',
        (true, false) => '▾',
        (false, _) => ' ',
    };
    let check = if item.done { 'x' } else { ' ' };
    let id = if style.show_ids {
        format!("{} ", pad_to_width(item.id.short(style.id_width), style.id_width))
    } else {
        String::new()
    };

    let mut line = format!(
        "{}{} [{}] {}{}",
        indent,
        fold,
        check,
        id,
        truncate_to_width(&item.title, TITLE_WIDTH)
    );
    if hidden > 0 {
        line.push_str(&format!(" (+{})", hidden));
    }
    if let Some(priority) = item.priority {
        line.push_str(&format!(" !{}", priority.marker()));
    }
    if let Some(due) = item.due {
        line.push_str(&format!(" due:{}", format_due(due)));
        if !item.done && due < now {
            line.push_str(" OVERDUE");
        }
    }
    for label in &item.labels {
        line.push_str(&format!(" #{}", label.title));
    }
    line
}

/// Header line for a section
pub fn format_section_header(section: &Section) -> String {
    let folded = if section.collapsed { " [collapsed]" } else { "" };
    format!("== {} ({}) =={}", section.title, section.id.short(8), folded)
}

/// A section rendered as an indented tree. Collapsed subtrees (and a
/// collapsed section) are hidden unless `all`.
pub fn format_section_listing(
    section: &Section,
    style: &ListStyle,
    all: bool,
    now: NaiveDateTime,
) -> Vec<String> {
    let mut lines = vec![format_section_header(section)];
    let full = flatten(&section.tasks);

    if section.collapsed && !all {
        lines.push(format!("  ({} tasks hidden)", full.len()));
        return lines;
    }
    if full.is_empty() {
        lines.push("  (no tasks)".to_string());
        return lines;
    }

    // Rows after a node with greater depth are exactly its descendants
    let mut descendants: HashMap<&TaskId, usize> = HashMap::new();
    for (i, item) in full.iter().enumerate() {
        let count = full[i + 1..]
            .iter()
            .take_while(|next| next.depth > item.depth)
            .count();
        descendants.insert(&item.id, count);
    }

    let rows = if all {
        full.clone()
    } else {
        visible_items(&section.tasks, None)
    };
    for item in &rows {
        let hidden = if item.collapsed && !all {
            descendants.get(&item.id).copied().unwrap_or(0)
        } else {
            0
        };
        lines.push(format_item_line(item, style, hidden, now));
    }
    lines
}

pub fn format_section_info(section: &Section) -> String {
    let folded = if section.collapsed { "  [collapsed]" } else { "" };
    format!(
        "{}  {} ({} tasks){}",
        section.id.short(8),
        section.title,
        section.task_count(),
        folded
    )
}

pub fn format_drop(outcome: &DropOutcome) -> String {
    match outcome {
        DropOutcome::Moved {
            task_id,
            parent_id: Some(parent),
            depth,
        } => format!("moved {} under {} (depth {})", task_id, parent, depth),
        DropOutcome::Moved {
            task_id,
            parent_id: None,
            ..
        } => format!("moved {} to top level", task_id),
        DropOutcome::Cancelled => "no drop target; nothing moved".to_string(),
    }
}
