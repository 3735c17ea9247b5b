mod init;
pub use init::cmd_init;

use std::path::{Path, PathBuf};

use chrono::Local;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::file_store::FileStore;
use crate::io::project_io::{self, Project};
use crate::model::section::{BoardDoc, SectionId};
use crate::model::task::{Label, Priority, TaskEdit, TaskItem};
use crate::ops::board::Board;
use crate::ops::section_ops;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Directory commands run against: `-C` if given, else the cwd
pub fn start_dir(project_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match project_dir {
        Some(dir) => Ok(std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?),
        None => Ok(std::env::current_dir()?),
    }
}

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let start = start_dir(cli.project_dir.as_deref())?;

    match cli.command {
        Commands::Init(args) => cmd_init(args, &start),

        // Read commands
        Commands::Sections => cmd_sections(&start, json),
        Commands::List(args) => cmd_list(&start, args, json),
        Commands::Labels => cmd_labels(&start, json),

        // Write commands
        Commands::Section(cmd) => cmd_section(&start, cmd.action, json),
        Commands::Add(args) => cmd_add(&start, args, json),
        Commands::Done(args) => cmd_done(&start, args, json),
        Commands::Collapse(args) => cmd_collapse(&start, args, json),
        Commands::Edit(args) => cmd_edit(&start, args),
        Commands::Rm(args) => cmd_rm(&start, args, json),
        Commands::Mv(args) => cmd_mv(&start, args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_project_at(start: &Path) -> Result<Project, Box<dyn std::error::Error>> {
    let root = project_io::discover_project(start)?;
    Ok(project_io::load_project(&root)?)
}

fn open_store(project: &Project) -> Result<FileStore, Box<dyn std::error::Error>> {
    Ok(FileStore::open(&project.board_dir)?)
}

fn open_board(project: &Project, store: FileStore) -> Result<Board<FileStore>, Box<dyn std::error::Error>> {
    let headers = store.doc().sections.clone();
    Ok(Board::open(store, headers, project.config.ui.indent_width)?)
}

fn list_style(project: &Project) -> ListStyle {
    ListStyle {
        show_ids: project.config.ui.show_ids,
        id_width: project.config.ui.id_width,
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Look up (or create) catalog labels for `titles`. Returns the labels and
/// whether the catalog grew.
fn ensure_labels(doc: &mut BoardDoc, titles: &[String]) -> (Vec<Label>, bool) {
    let before = doc.labels.len();
    let labels = titles
        .iter()
        .filter(|t| !t.trim().is_empty())
        .map(|t| section_ops::ensure_label(doc, t))
        .collect();
    (labels, doc.labels.len() != before)
}

fn parse_priority(s: &str) -> Result<Priority, Box<dyn std::error::Error>> {
    Ok(s.parse::<Priority>()?)
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_sections(start: &Path, json: bool) -> CmdResult {
    let project = load_project_at(start)?;
    let store = open_store(&project)?;
    let sections = &store.doc().sections;
    if json {
        let out: Vec<SectionInfoJson> = sections.iter().map(section_info_json).collect();
        return print_json(&out);
    }
    if sections.is_empty() {
        println!("no sections (add one with `td section add <title>`)");
    }
    for section in sections {
        println!("{}", format_section_info(section));
    }
    Ok(())
}

fn cmd_list(start: &Path, args: ListArgs, json: bool) -> CmdResult {
    let project = load_project_at(start)?;
    let store = open_store(&project)?;
    let doc = store.doc();

    let selected: Vec<_> = match &args.section {
        Some(reference) => {
            let id = section_ops::resolve_section(doc, reference)?;
            doc.sections.iter().filter(|s| s.id == id).collect()
        }
        None => doc.sections.iter().collect(),
    };

    if json {
        let out: Vec<SectionListJson> = selected
            .iter()
            .map(|s| section_list_json(s, args.all))
            .collect();
        return print_json(&out);
    }

    let style = list_style(&project);
    let now = Local::now().naive_local();
    for (i, section) in selected.iter().enumerate() {
        if i > 0 {
            println!();
        }
        for line in format_section_listing(section, &style, args.all, now) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_labels(start: &Path, json: bool) -> CmdResult {
    let project = load_project_at(start)?;
    let store = open_store(&project)?;
    let labels = &store.doc().labels;
    if json {
        return print_json(labels);
    }
    for label in labels {
        println!("{}  #{}", label.id, label.title);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Section commands
// ---------------------------------------------------------------------------

fn cmd_section(start: &Path, action: SectionAction, json: bool) -> CmdResult {
    let project = load_project_at(start)?;
    let mut store = open_store(&project)?;
    let mut doc = store.doc().clone();

    let (id, message) = match action {
        SectionAction::Add { title, after } => {
            let after = after
                .map(|a| section_ops::resolve_section(&doc, &a))
                .transpose()?;
            let id = section_ops::add_section(&mut doc, &title, after.as_ref())?;
            (id, format!("added section {}", title.trim()))
        }
        SectionAction::Collapse { section } => {
            let id = section_ops::resolve_section(&doc, &section)?;
            let collapsed = section_ops::toggle_section_collapse(&mut doc, &id)?;
            let state = if collapsed { "collapsed" } else { "expanded" };
            (id, format!("section {}", state))
        }
        SectionAction::Rename { section, title } => {
            let id = section_ops::resolve_section(&doc, &section)?;
            section_ops::rename_section(&mut doc, &id, &title)?;
            (id, format!("renamed section to {}", title.trim()))
        }
        SectionAction::Rm { section } => {
            let id = section_ops::resolve_section(&doc, &section)?;
            let removed = section_ops::remove_section(&mut doc, &id)?;
            let message = format!(
                "removed section {} ({} tasks)",
                removed.title,
                removed.task_count()
            );
            (id, message)
        }
    };

    store.save_doc(doc)?;
    if json {
        return print_json(&serde_json::json!({ "section": id.to_string() }));
    }
    println!("{}", message);
    Ok(())
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

fn cmd_add(start: &Path, args: AddArgs, json: bool) -> CmdResult {
    let project = load_project_at(start)?;
    let mut store = open_store(&project)?;

    let mut doc = store.doc().clone();
    let (labels, catalog_changed) = ensure_labels(&mut doc, &args.labels);
    if catalog_changed {
        store.save_doc(doc.clone())?;
    }

    let mut task = TaskItem::new(args.title);
    task.description = args.description.filter(|d| !d.is_empty());
    task.due = args.due.as_deref().map(parse_due).transpose()?;
    task.priority = args.priority.as_deref().map(parse_priority).transpose()?;
    task.labels = labels;

    let mut board = open_board(&project, store)?;
    let parent = args
        .parent
        .as_deref()
        .map(|p| board.resolve_task(p))
        .transpose()?;

    let section: SectionId = match (&args.section, &parent) {
        (Some(reference), _) => section_ops::resolve_section(&doc, reference)?,
        (None, Some((parent_section, _))) => parent_section.clone(),
        (None, None) => doc
            .sections
            .first()
            .map(|s| s.id.clone())
            .ok_or("board has no sections (add one with `td section add <title>`)")?,
    };
    if let Some((parent_section, parent_id)) = &parent
        && parent_section != &section
    {
        return Err(format!("task {} is not in section {}", parent_id, section).into());
    }

    let id = board.add_task(&section, task, parent.as_ref().map(|(_, id)| id))?;
    if json {
        return print_json(&TaskRefJson {
            section: section.to_string(),
            id,
        });
    }
    println!("{}", id);
    Ok(())
}

fn cmd_done(start: &Path, args: TaskRef, json: bool) -> CmdResult {
    let project = load_project_at(start)?;
    let mut board = open_board(&project, open_store(&project)?)?;
    let (section, id) = board.resolve_task(&args.id)?;
    let done = board.toggle_done(&section, &id)?;
    if json {
        return print_json(&serde_json::json!({ "id": id, "done": done }));
    }
    println!("{} {}", id, if done { "done" } else { "reopened" });
    Ok(())
}

fn cmd_collapse(start: &Path, args: TaskRef, json: bool) -> CmdResult {
    let project = load_project_at(start)?;
    let mut board = open_board(&project, open_store(&project)?)?;
    let (section, id) = board.resolve_task(&args.id)?;
    let collapsed = board.toggle_collapse(&section, &id)?;
    if json {
        return print_json(&serde_json::json!({ "id": id, "collapsed": collapsed }));
    }
    println!("{} {}", id, if collapsed { "collapsed" } else { "expanded" });
    Ok(())
}

fn cmd_edit(start: &Path, args: EditArgs) -> CmdResult {
    let project = load_project_at(start)?;
    let mut store = open_store(&project)?;

    let labels = if args.clear_labels {
        Some(Vec::new())
    } else if args.labels.is_empty() {
        None
    } else {
        let mut doc = store.doc().clone();
        let (labels, catalog_changed) = ensure_labels(&mut doc, &args.labels);
        if catalog_changed {
            store.save_doc(doc)?;
        }
        Some(labels)
    };

    let due = if args.clear_due {
        Some(None)
    } else {
        args.due.as_deref().map(parse_due).transpose()?.map(Some)
    };
    let priority = if args.clear_priority {
        Some(None)
    } else {
        args.priority
            .as_deref()
            .map(parse_priority)
            .transpose()?
            .map(Some)
    };

    let edit = TaskEdit {
        title: args.title,
        description: args.description.map(Some),
        due,
        priority,
        labels,
    };
    if edit.is_empty() {
        return Err("nothing to change (see `td edit --help`)".into());
    }

    let mut board = open_board(&project, store)?;
    let (section, id) = board.resolve_task(&args.id)?;
    board.edit_task(&section, &id, edit)?;
    println!("updated {}", id);
    Ok(())
}

fn cmd_rm(start: &Path, args: TaskRef, json: bool) -> CmdResult {
    let project = load_project_at(start)?;
    let mut board = open_board(&project, open_store(&project)?)?;
    let (section, id) = board.resolve_task(&args.id)?;
    let removed = board.delete_task(&section, &id)?;
    let count = 1 + removed.descendant_count();
    if json {
        return print_json(&serde_json::json!({ "id": id, "removed": count }));
    }
    println!("deleted {} ({} tasks)", id, count);
    Ok(())
}

/// Replays one drag session: start on `id`, hover `over`, move by
/// `offset`, drop.
fn cmd_mv(start: &Path, args: MvArgs, json: bool) -> CmdResult {
    let project = load_project_at(start)?;
    let mut board = open_board(&project, open_store(&project)?)?;
    let (section, id) = board.resolve_task(&args.id)?;
    let (over_section, over) = board.resolve_task(&args.over)?;
    if over_section != section {
        return Err("cannot drag a task into a different section".into());
    }

    board.drag_start(&section, &id)?;
    board.drag_over(&section, Some(&over))?;
    board.drag_move(&section, args.offset)?;
    let outcome = board.drag_end(&section)?;

    if json {
        return print_json(&drop_json(&outcome));
    }
    println!("{}", format_drop(&outcome));
    Ok(())
}
