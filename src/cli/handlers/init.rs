use std::fs;
use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::file_store::{atomic_write, save_board};
use crate::io::project_io::{self, BOARD_DIR, CONFIG_FILE};
use crate::io::seed;

const CONFIG_TEMPLATE: &str = r##"[board]
name = "{name}"

[ui]
# Pixels of horizontal pointer travel per nesting level while dragging.
# `td mv --offset` is measured in the same unit.
indent_width = 28.0

# Show short task ids in `td list`
show_ids = true
id_width = 8
"##;

/// Infer a board name from a directory name: hyphens and underscores become
/// spaces, words are title-cased.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => c.to_uppercase().chain(chars).collect(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_config(name: &str) -> String {
    CONFIG_TEMPLATE.replace("{name}", &name.replace('\\', "\\\\").replace('"', "\\\""))
}

pub fn cmd_init(args: InitArgs, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let board_dir = root.join(BOARD_DIR);

    if board_dir.join(CONFIG_FILE).exists() && !args.force {
        return Err(format!(
            "board already exists in {} (use --force to overwrite)",
            board_dir.display()
        )
        .into());
    }

    if let Some(parent) = root.parent()
        && let Ok(parent_root) = project_io::discover_project(parent)
    {
        eprintln!(
            "note: parent board found at {}",
            parent_root.join(BOARD_DIR).display()
        );
    }

    let name = args.name.unwrap_or_else(|| {
        root.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Untitled".to_string())
    });

    fs::create_dir_all(&board_dir)?;
    atomic_write(&board_dir.join(CONFIG_FILE), render_config(&name).as_bytes())?;
    // Parse what we just wrote so a bad template can never produce a board
    project_io::load_config(&board_dir)?;

    let doc = if args.seed {
        seed::seed_board()
    } else {
        seed::empty_board()
    };
    save_board(&board_dir, &doc)?;

    println!("Initialized taskdeck board: {}", name);
    for section in &doc.sections {
        println!("  section: {} ({} tasks)", section.title, section.task_count());
    }
    Ok(())
}
