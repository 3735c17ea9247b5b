use std::collections::HashMap;

use crate::io::lock::LockError;
use crate::model::section::SectionId;
use crate::model::task::TaskItem;

/// Error type for task tree persistence
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unknown section: {0}")]
    UnknownSection(SectionId),
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed board document: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Lock(#[from] LockError),
}

/// Where section trees are loaded from and saved to.
///
/// `save_tree` receives the whole nested tree of one section after each
/// committed change.
pub trait TreeStore {
    fn load_tree(&self, section: &SectionId) -> Result<Vec<TaskItem>, StoreError>;
    fn save_tree(&mut self, section: &SectionId, tasks: &[TaskItem]) -> Result<(), StoreError>;
}

/// In-process store, for embedding and tests. Counts saves.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    trees: HashMap<SectionId, Vec<TaskItem>>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a section's tree without counting it as a save
    pub fn with_tree(mut self, section: SectionId, tasks: Vec<TaskItem>) -> Self {
        self.trees.insert(section, tasks);
        self
    }

    pub fn tree(&self, section: &SectionId) -> Option<&[TaskItem]> {
        self.trees.get(section).map(Vec::as_slice)
    }

    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl TreeStore for MemoryStore {
    fn load_tree(&self, section: &SectionId) -> Result<Vec<TaskItem>, StoreError> {
        self.trees
            .get(section)
            .cloned()
            .ok_or_else(|| StoreError::UnknownSection(section.clone()))
    }

    fn save_tree(&mut self, section: &SectionId, tasks: &[TaskItem]) -> Result<(), StoreError> {
        self.trees.insert(section.clone(), tasks.to_vec());
        self.saves += 1;
        Ok(())
    }
}
