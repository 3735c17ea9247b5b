use indexmap::IndexMap;
use tracing::error;

use crate::io::store::{StoreError, TreeStore};
use crate::model::flat::FlatItem;
use crate::model::section::{Section, SectionId};
use crate::model::task::{TaskEdit, TaskId, TaskItem};
use crate::ops::drag::{DropOutcome, SectionController};
use crate::ops::projection::Projection;
use crate::ops::task_ops::{self, TaskError};

/// Error type for board orchestration
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error("unknown section: {0}")]
    UnknownSection(SectionId),
    #[error("could not load section {section}: {source}")]
    Load {
        section: SectionId,
        source: StoreError,
    },
    #[error("change applied but not saved: {0}")]
    Persist(StoreError),
}

/// All sections of a board, each driven by its own controller, plus the
/// store that every committed change is written through.
pub struct Board<S: TreeStore> {
    store: S,
    sections: IndexMap<SectionId, SectionController>,
}

impl<S: TreeStore> Board<S> {
    /// Open a board over `headers` (section id, title and fold state). Each
    /// section's tasks come from the store.
    pub fn open(
        store: S,
        headers: impl IntoIterator<Item = Section>,
        indent_width: f64,
    ) -> Result<Self, BoardError> {
        let mut sections = IndexMap::new();
        for mut section in headers {
            section.tasks = store
                .load_tree(&section.id)
                .map_err(|source| BoardError::Load {
                    section: section.id.clone(),
                    source,
                })?;
            sections.insert(section.id.clone(), SectionController::new(section, indent_width));
        }
        Ok(Board { store, sections })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Sections in display order
    pub fn sections(&self) -> impl Iterator<Item = &SectionController> {
        self.sections.values()
    }

    pub fn section(&self, id: &SectionId) -> Result<&SectionController, BoardError> {
        self.sections
            .get(id)
            .ok_or_else(|| BoardError::UnknownSection(id.clone()))
    }

    fn section_mut(&mut self, id: &SectionId) -> Result<&mut SectionController, BoardError> {
        self.sections
            .get_mut(id)
            .ok_or_else(|| BoardError::UnknownSection(id.clone()))
    }

    /// Find which section holds a task typed by the user (full id or unique
    /// prefix across the whole board).
    pub fn resolve_task(&self, input: &str) -> Result<(SectionId, TaskId), BoardError> {
        let mut found: Option<(SectionId, TaskId)> = None;
        for (section_id, ctl) in &self.sections {
            match task_ops::resolve_task_id(ctl.tasks(), input) {
                Ok(id) if id.as_str() == input => return Ok((section_id.clone(), id)),
                Ok(id) => {
                    if found.is_some() {
                        return Err(TaskError::Ambiguous(input.to_string()).into());
                    }
                    found = Some((section_id.clone(), id));
                }
                Err(TaskError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        found.ok_or_else(|| TaskError::NotFound(input.to_string()).into())
    }

    /// Write one section's tree through the store.
    fn commit(&mut self, id: &SectionId) -> Result<(), BoardError> {
        let ctl = self
            .sections
            .get(id)
            .ok_or_else(|| BoardError::UnknownSection(id.clone()))?;
        if let Err(e) = self.store.save_tree(id, ctl.tasks()) {
            error!(section = %id, error = %e, "failed to persist section");
            return Err(BoardError::Persist(e));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn flat_items(&self, section: &SectionId) -> Result<Vec<FlatItem>, BoardError> {
        Ok(self.section(section)?.flat_items())
    }

    pub fn projection(&self, section: &SectionId) -> Result<Option<Projection>, BoardError> {
        Ok(self.section(section)?.projection())
    }

    // -----------------------------------------------------------------------
    // Drag session
    // -----------------------------------------------------------------------

    pub fn drag_start(&mut self, section: &SectionId, id: &TaskId) -> Result<(), BoardError> {
        Ok(self.section_mut(section)?.drag_start(id)?)
    }

    pub fn drag_move(&mut self, section: &SectionId, delta_x: f64) -> Result<(), BoardError> {
        self.section_mut(section)?.drag_move(delta_x);
        Ok(())
    }

    pub fn drag_over(&mut self, section: &SectionId, over: Option<&TaskId>) -> Result<(), BoardError> {
        self.section_mut(section)?.drag_over(over);
        Ok(())
    }

    pub fn drag_cancel(&mut self, section: &SectionId) -> Result<(), BoardError> {
        self.section_mut(section)?.drag_cancel();
        Ok(())
    }

    /// Drop; saves only when something moved.
    pub fn drag_end(&mut self, section: &SectionId) -> Result<DropOutcome, BoardError> {
        let outcome = self.section_mut(section)?.drag_end();
        if matches!(outcome, DropOutcome::Moved { .. }) {
            self.commit(section)?;
        }
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Direct edits
    // -----------------------------------------------------------------------

    pub fn add_task(
        &mut self,
        section: &SectionId,
        task: TaskItem,
        parent: Option<&TaskId>,
    ) -> Result<TaskId, BoardError> {
        let id = self.section_mut(section)?.add_task(task, parent)?;
        self.commit(section)?;
        Ok(id)
    }

    pub fn delete_task(&mut self, section: &SectionId, id: &TaskId) -> Result<TaskItem, BoardError> {
        let removed = self.section_mut(section)?.delete_task(id)?;
        self.commit(section)?;
        Ok(removed)
    }

    pub fn toggle_collapse(&mut self, section: &SectionId, id: &TaskId) -> Result<bool, BoardError> {
        let collapsed = self.section_mut(section)?.toggle_collapse(id)?;
        self.commit(section)?;
        Ok(collapsed)
    }

    pub fn toggle_done(&mut self, section: &SectionId, id: &TaskId) -> Result<bool, BoardError> {
        let done = self.section_mut(section)?.toggle_done(id)?;
        self.commit(section)?;
        Ok(done)
    }

    pub fn edit_task(
        &mut self,
        section: &SectionId,
        id: &TaskId,
        edit: TaskEdit,
    ) -> Result<(), BoardError> {
        self.section_mut(section)?.edit_task(id, edit)?;
        self.commit(section)
    }
}
