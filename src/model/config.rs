use serde::{Deserialize, Serialize};

/// Configuration from `.taskdeck/config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub board: BoardInfo,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardInfo {
    #[serde(default = "default_board_name")]
    pub name: String,
}

impl Default for BoardInfo {
    fn default() -> Self {
        BoardInfo {
            name: default_board_name(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiConfig {
    /// Horizontal pointer travel (in pixels) per nesting level while dragging
    #[serde(default = "default_indent_width")]
    pub indent_width: f64,
    /// Show short task ids in `td list`
    #[serde(default = "default_true")]
    pub show_ids: bool,
    /// Characters of the id shown
    #[serde(default = "default_id_width")]
    pub id_width: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            indent_width: default_indent_width(),
            show_ids: true,
            id_width: default_id_width(),
        }
    }
}

impl BoardConfig {
    pub fn new(name: impl Into<String>) -> Self {
        BoardConfig {
            board: BoardInfo { name: name.into() },
            ui: UiConfig::default(),
        }
    }
}

fn default_board_name() -> String {
    "my board".to_string()
}

fn default_indent_width() -> f64 {
    28.0
}

fn default_true() -> bool {
    true
}

fn default_id_width() -> usize {
    8
}
