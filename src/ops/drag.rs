use tracing::{debug, trace};

use crate::model::flat::FlatItem;
use crate::model::section::Section;
use crate::model::task::{TaskEdit, TaskId, TaskItem};
use crate::ops::build::build_tree;
use crate::ops::flatten::{flatten, visible_items};
use crate::ops::projection::{Projection, array_move, project};
use crate::ops::task_ops::{self, TaskError};

/// Transient state of an in-progress drag
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub active_id: TaskId,
    /// Row currently under the pointer; `None` when outside every drop zone
    pub over_id: Option<TaskId>,
    /// Horizontal pointer travel since the drag started, in pixels
    pub offset_x: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// What a drop did to the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    Moved {
        task_id: TaskId,
        parent_id: Option<TaskId>,
        depth: usize,
    },
    /// Nothing to drop onto; the tree is unchanged
    Cancelled,
}

/// Owns one section's task tree and its drag session.
///
/// Every handler runs to completion before returning, so the tree and the
/// flat view derived from it are never observed mid-change.
#[derive(Debug, Clone)]
pub struct SectionController {
    section: Section,
    drag: DragState,
    indent_width: f64,
}

impl SectionController {
    pub fn new(section: Section, indent_width: f64) -> Self {
        SectionController {
            section,
            drag: DragState::Idle,
            indent_width,
        }
    }

    pub fn section(&self) -> &Section {
        &self.section
    }

    pub fn section_mut(&mut self) -> &mut Section {
        &mut self.section
    }

    pub fn tasks(&self) -> &[TaskItem] {
        &self.section.tasks
    }

    pub fn into_section(self) -> Section {
        self.section
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn indent_width(&self) -> f64 {
        self.indent_width
    }

    fn active_id(&self) -> Option<&TaskId> {
        match &self.drag {
            DragState::Dragging(session) => Some(&session.active_id),
            DragState::Idle => None,
        }
    }

    /// Rows to render: collapsed subtrees and the dragged subtree hidden
    pub fn flat_items(&self) -> Vec<FlatItem> {
        visible_items(&self.section.tasks, self.active_id())
    }

    /// Where the dragged item would land right now
    pub fn projection(&self) -> Option<Projection> {
        let DragState::Dragging(session) = &self.drag else {
            return None;
        };
        let over_id = session.over_id.as_ref()?;
        let items = visible_items(&self.section.tasks, Some(&session.active_id));
        project(
            &items,
            &session.active_id,
            over_id,
            session.offset_x,
            self.indent_width,
        )
    }

    // -----------------------------------------------------------------------
    // Drag events
    // -----------------------------------------------------------------------

    pub fn drag_start(&mut self, id: &TaskId) -> Result<(), TaskError> {
        if let DragState::Dragging(session) = &self.drag {
            return Err(TaskError::DragInProgress(session.active_id.clone()));
        }
        if task_ops::find_task(&self.section.tasks, id).is_none() {
            return Err(TaskError::NotFound(id.to_string()));
        }
        debug!(section = %self.section.id, task_id = %id, "drag start");
        self.drag = DragState::Dragging(DragSession {
            active_id: id.clone(),
            over_id: Some(id.clone()),
            offset_x: 0.0,
        });
        Ok(())
    }

    /// Pointer moved; `delta_x` is the total horizontal travel since start.
    pub fn drag_move(&mut self, delta_x: f64) {
        if let DragState::Dragging(session) = &mut self.drag {
            session.offset_x = delta_x;
            trace!(offset_x = delta_x, "drag move");
        }
    }

    /// Pointer entered another row's drop zone (or left all of them).
    pub fn drag_over(&mut self, over: Option<&TaskId>) {
        if let DragState::Dragging(session) = &mut self.drag {
            session.over_id = over.cloned();
            trace!(over = ?session.over_id, "drag over");
        }
    }

    pub fn drag_cancel(&mut self) {
        if matches!(self.drag, DragState::Dragging(_)) {
            debug!(section = %self.section.id, "drag cancelled");
        }
        self.drag = DragState::Idle;
    }

    /// Commit the drag at the current projection.
    pub fn drag_end(&mut self) -> DropOutcome {
        let projection = self.projection();
        let session = match std::mem::take(&mut self.drag) {
            DragState::Dragging(session) => session,
            DragState::Idle => return DropOutcome::Cancelled,
        };
        let (Some(projection), Some(over_id)) = (projection, session.over_id) else {
            debug!(task_id = %session.active_id, "drop without a target");
            return DropOutcome::Cancelled;
        };

        // Reorder the full (unfiltered) sequence; hidden descendants keep
        // their parent ids and are reattached by the rebuild.
        let mut items = flatten(&self.section.tasks);
        let active_index = items.iter().position(|i| i.id == session.active_id);
        let over_index = items.iter().position(|i| i.id == over_id);
        let (Some(active_index), Some(over_index)) = (active_index, over_index) else {
            return DropOutcome::Cancelled;
        };

        let active = &mut items[active_index];
        active.depth = projection.depth;
        active.parent_id = projection.parent_id.clone();
        array_move(&mut items, active_index, over_index);

        self.section.tasks = build_tree(items);
        debug!(
            task_id = %session.active_id,
            parent = ?projection.parent_id,
            depth = projection.depth,
            "drop committed"
        );

        DropOutcome::Moved {
            task_id: session.active_id,
            parent_id: projection.parent_id,
            depth: projection.depth,
        }
    }

    // -----------------------------------------------------------------------
    // Direct edits (no projection or rebuild)
    // -----------------------------------------------------------------------

    pub fn add_task(&mut self, task: TaskItem, parent: Option<&TaskId>) -> Result<TaskId, TaskError> {
        task_ops::add_task(&mut self.section.tasks, task, parent)
    }

    /// Delete a task and its subtree. Cancels a drag whose active item was
    /// inside the removed subtree.
    pub fn delete_task(&mut self, id: &TaskId) -> Result<TaskItem, TaskError> {
        let removed = task_ops::delete_task(&mut self.section.tasks, id)?;
        let orphaned = self.active_id().is_some_and(|active| {
            &removed.id == active || task_ops::find_task(&removed.children, active).is_some()
        });
        if orphaned {
            self.drag = DragState::Idle;
        }
        Ok(removed)
    }

    pub fn toggle_collapse(&mut self, id: &TaskId) -> Result<bool, TaskError> {
        task_ops::toggle_collapse(&mut self.section.tasks, id)
    }

    pub fn toggle_done(&mut self, id: &TaskId) -> Result<bool, TaskError> {
        task_ops::toggle_done(&mut self.section.tasks, id)
    }

    pub fn edit_task(&mut self, id: &TaskId, edit: TaskEdit) -> Result<(), TaskError> {
        task_ops::edit_task(&mut self.section.tasks, id, edit)
    }
}
