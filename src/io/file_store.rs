use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::io::board_json;
use crate::io::lock::{BoardLock, DEFAULT_LOCK_TIMEOUT};
use crate::io::project_io::BOARD_FILE;
use crate::io::store::{StoreError, TreeStore};
use crate::model::section::{BoardDoc, SectionId};
use crate::model::task::TaskItem;

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Read `board.json`. A missing file is an empty board.
pub fn load_board(board_dir: &Path) -> Result<BoardDoc, StoreError> {
    let path = board_dir.join(BOARD_FILE);
    match fs::read_to_string(&path) {
        Ok(text) => Ok(board_json::from_json(&text)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BoardDoc::default()),
        Err(e) => Err(e.into()),
    }
}

/// Write `board.json` as pretty JSON. The caller holds the lock.
fn write_board(board_dir: &Path, doc: &BoardDoc) -> Result<(), StoreError> {
    let json = board_json::to_json(doc)?;
    atomic_write(&board_dir.join(BOARD_FILE), json.as_bytes())?;
    Ok(())
}

/// Write the whole board under the directory lock.
pub fn save_board(board_dir: &Path, doc: &BoardDoc) -> Result<(), StoreError> {
    let _lock = BoardLock::acquire(board_dir, DEFAULT_LOCK_TIMEOUT)?;
    write_board(board_dir, doc)
}

/// `board.json`-backed store.
///
/// Each save re-reads the document under the lock and replaces only the
/// saved section's tasks, so writers touching other sections are not lost.
#[derive(Debug)]
pub struct FileStore {
    board_dir: PathBuf,
    doc: BoardDoc,
}

impl FileStore {
    pub fn open(board_dir: &Path) -> Result<Self, StoreError> {
        let doc = load_board(board_dir)?;
        Ok(FileStore {
            board_dir: board_dir.to_path_buf(),
            doc,
        })
    }

    /// The document as of the last load or save
    pub fn doc(&self) -> &BoardDoc {
        &self.doc
    }

    /// Replace the whole document (section and label edits).
    pub fn save_doc(&mut self, doc: BoardDoc) -> Result<(), StoreError> {
        save_board(&self.board_dir, &doc)?;
        self.doc = doc;
        Ok(())
    }
}

impl TreeStore for FileStore {
    fn load_tree(&self, section: &SectionId) -> Result<Vec<TaskItem>, StoreError> {
        self.doc
            .section(section)
            .map(|s| s.tasks.clone())
            .ok_or_else(|| StoreError::UnknownSection(section.clone()))
    }

    fn save_tree(&mut self, section: &SectionId, tasks: &[TaskItem]) -> Result<(), StoreError> {
        let _lock = BoardLock::acquire(&self.board_dir, DEFAULT_LOCK_TIMEOUT)?;
        let mut doc = load_board(&self.board_dir)?;
        let target = doc
            .section_mut(section)
            .ok_or_else(|| StoreError::UnknownSection(section.clone()))?;
        target.tasks = tasks.to_vec();
        write_board(&self.board_dir, &doc)?;
        debug!(section = %section, path = %self.board_dir.display(), "board saved");
        self.doc = doc;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::section::Section;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn board_with(ids: &[&str]) -> BoardDoc {
        let mut doc = BoardDoc::default();
        for id in ids {
            let mut section = Section::new(id.to_uppercase());
            section.id = SectionId::from(*id);
            doc.sections.push(section);
        }
        doc
    }

    #[test]
    fn test_missing_board_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(load_board(tmp.path()).unwrap(), BoardDoc::default());
    }

    #[test]
    fn test_save_tree_round_trips_through_disk() {
        let tmp = TempDir::new().unwrap();
        save_board(tmp.path(), &board_with(&["s1"])).unwrap();

        let mut store = FileStore::open(tmp.path()).unwrap();
        let section = SectionId::from("s1");
        let tasks = vec![TaskItem::with_id("a", "A").child(TaskItem::with_id("b", "B"))];
        store.save_tree(&section, &tasks).unwrap();

        let reopened = FileStore::open(tmp.path()).unwrap();
        assert_eq!(reopened.load_tree(&section).unwrap(), tasks);
    }

    #[test]
    fn test_save_tree_keeps_other_sections_written_meanwhile() {
        let tmp = TempDir::new().unwrap();
        save_board(tmp.path(), &board_with(&["s1", "s2"])).unwrap();
        let mut store = FileStore::open(tmp.path()).unwrap();

        // Another writer adds a task to s2 after we opened
        let mut other = load_board(tmp.path()).unwrap();
        other.sections[1].tasks.push(TaskItem::with_id("x", "X"));
        save_board(tmp.path(), &other).unwrap();

        store
            .save_tree(&SectionId::from("s1"), &[TaskItem::with_id("a", "A")])
            .unwrap();
        let doc = load_board(tmp.path()).unwrap();
        assert_eq!(doc.sections[0].tasks.len(), 1);
        assert_eq!(doc.sections[1].tasks.len(), 1);
    }

    #[test]
    fn test_deep_chain_saves_and_reloads() {
        let tmp = TempDir::new().unwrap();
        save_board(tmp.path(), &board_with(&["s1"])).unwrap();
        let mut node = TaskItem::with_id("leaf", "leaf");
        for i in 0..500 {
            node = TaskItem::with_id(format!("n{}", i), "n").child(node);
        }
        let tasks = vec![node];

        let mut store = FileStore::open(tmp.path()).unwrap();
        let section = SectionId::from("s1");
        store.save_tree(&section, &tasks).unwrap();

        let reopened = FileStore::open(tmp.path()).unwrap();
        let loaded = reopened.load_tree(&section).unwrap();
        assert!(loaded == tasks);
        assert_eq!(loaded[0].descendant_count(), 500);
    }

    #[test]
    fn test_unknown_section() {
        let tmp = TempDir::new().unwrap();
        save_board(tmp.path(), &board_with(&["s1"])).unwrap();
        let mut store = FileStore::open(tmp.path()).unwrap();
        let ghost = SectionId::from("ghost");
        assert!(matches!(
            store.load_tree(&ghost),
            Err(StoreError::UnknownSection(_))
        ));
        assert!(matches!(
            store.save_tree(&ghost, &[]),
            Err(StoreError::UnknownSection(_))
        ));
    }

    #[test]
    fn test_malformed_json() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(BOARD_FILE), "{ not json").unwrap();
        assert!(matches!(load_board(tmp.path()), Err(StoreError::Json(_))));
    }

    #[test]
    fn test_partial_task_fields_load() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(BOARD_FILE),
            r#"{"sections":[{"id":"s1","title":"S","tasks":[{"id":"a","title":"A"},{"id":"b","parent_id":"a","title":"B"}]}]}"#,
        )
        .unwrap();
        let doc = load_board(tmp.path()).unwrap();
        let task = &doc.sections[0].tasks[0];
        assert!(!task.done && !task.collapsed);
        assert_eq!(task.children.len(), 1);
        assert_eq!(task.children[0].title, "B");
    }
}
