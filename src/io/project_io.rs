use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::BoardConfig;

/// Directory holding a board's files, at the project root
pub const BOARD_DIR: &str = ".taskdeck";
pub const CONFIG_FILE: &str = "config.toml";
pub const BOARD_FILE: &str = "board.json";

/// Error type for project discovery and configuration
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("not a taskdeck project: no .taskdeck/config.toml found (run `td init`)")]
    NotAProject,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not serialize config.toml: {0}")]
    ConfigSerializeError(#[from] toml::ser::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A discovered board: where it lives and how it is configured
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub board_dir: PathBuf,
    pub config: BoardConfig,
}

/// Walk up from `start` looking for `.taskdeck/config.toml`.
/// Returns the directory that contains `.taskdeck/`.
pub fn discover_project(start: &Path) -> Result<PathBuf, ProjectError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(BOARD_DIR).join(CONFIG_FILE).is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(ProjectError::NotAProject);
        }
    }
}

/// Load the project rooted at `root` (the parent of `.taskdeck/`).
pub fn load_project(root: &Path) -> Result<Project, ProjectError> {
    let board_dir = root.join(BOARD_DIR);
    if !board_dir.is_dir() {
        return Err(ProjectError::NotAProject);
    }
    let config = load_config(&board_dir)?;
    Ok(Project {
        root: root.to_path_buf(),
        board_dir,
        config,
    })
}

/// Read and validate `config.toml`.
pub fn load_config(board_dir: &Path) -> Result<BoardConfig, ProjectError> {
    let path = board_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&path).map_err(|e| ProjectError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let config: BoardConfig = toml::from_str(&text)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn save_config(board_dir: &Path, config: &BoardConfig) -> Result<(), ProjectError> {
    validate_config(config)?;
    let text = toml::to_string_pretty(config)?;
    let path = board_dir.join(CONFIG_FILE);
    crate::io::file_store::atomic_write(&path, text.as_bytes())
        .map_err(|e| ProjectError::ReadError { path, source: e })
}

fn validate_config(config: &BoardConfig) -> Result<(), ProjectError> {
    let indent = config.ui.indent_width;
    if !indent.is_finite() || indent <= 0.0 {
        return Err(ProjectError::InvalidConfig(format!(
            "ui.indent_width must be a positive number, got {}",
            indent
        )));
    }
    if config.ui.id_width == 0 {
        return Err(ProjectError::InvalidConfig(
            "ui.id_width must be at least 1".into(),
        ));
    }
    Ok(())
}
