use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "td", about = concat!("taskdeck v", env!("CARGO_PKG_VERSION"), " - nested task lists with drag-to-nest"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different project directory
    #[arg(short = 'C', long = "project-dir", global = true)]
    pub project_dir: Option<String>,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a .taskdeck/ board in the current directory
    Init(InitArgs),
    /// List sections with task counts
    Sections,
    /// Section management
    Section(SectionCmd),
    /// Show tasks as an indented tree
    List(ListArgs),
    /// Add a task
    Add(AddArgs),
    /// Toggle a task's done flag
    Done(TaskRef),
    /// Fold or unfold a task's children
    Collapse(TaskRef),
    /// Change task fields
    Edit(EditArgs),
    /// Delete a task and everything under it
    Rm(TaskRef),
    /// Drag a task onto another row, optionally shifted left or right
    Mv(MvArgs),
    /// List the label catalog
    Labels,
}

// ---------------------------------------------------------------------------
// Init / read args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Board name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Start from a sample board instead of an empty one
    #[arg(long)]
    pub seed: bool,
    /// Overwrite an existing .taskdeck/
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ListArgs {
    /// Section to list (id, id prefix or title; default: all)
    pub section: Option<String>,
    /// Show collapsed subtrees and sections too
    #[arg(long)]
    pub all: bool,
}

// ---------------------------------------------------------------------------
// Task write args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct TaskRef {
    /// Task id or unique id prefix
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Section to add to (default: first section)
    #[arg(short, long)]
    pub section: Option<String>,
    /// Add as the last child of this task
    #[arg(long)]
    pub parent: Option<String>,
    /// Description
    #[arg(long = "desc")]
    pub description: Option<String>,
    /// Due date: YYYY-MM-DD or "YYYY-MM-DD HH:MM"
    #[arg(long)]
    pub due: Option<String>,
    /// very-high, high, medium, low, very-low (or p1..p5)
    #[arg(long)]
    pub priority: Option<String>,
    /// Label title (repeatable; created if new)
    #[arg(long = "label", action = ArgAction::Append)]
    pub labels: Vec<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task id or unique id prefix
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    /// New description (empty string clears it)
    #[arg(long = "desc")]
    pub description: Option<String>,
    #[arg(long, conflicts_with = "clear_due")]
    pub due: Option<String>,
    #[arg(long)]
    pub clear_due: bool,
    #[arg(long, conflicts_with = "clear_priority")]
    pub priority: Option<String>,
    #[arg(long)]
    pub clear_priority: bool,
    /// Replace labels (repeatable)
    #[arg(long = "label", action = ArgAction::Append)]
    pub labels: Vec<String>,
    /// Remove all labels
    #[arg(long, conflicts_with = "labels")]
    pub clear_labels: bool,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task to drag
    pub id: String,
    /// Row to drop onto
    #[arg(long)]
    pub over: String,
    /// Horizontal pointer travel in pixels (negative = left)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub offset: f64,
}

// ---------------------------------------------------------------------------
// Section args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SectionCmd {
    #[command(subcommand)]
    pub action: SectionAction,
}

#[derive(Subcommand)]
pub enum SectionAction {
    /// Add a section
    Add {
        title: String,
        /// Insert after this section (default: at the end)
        #[arg(long)]
        after: Option<String>,
    },
    /// Fold or unfold a whole section
    Collapse { section: String },
    /// Rename a section
    Rename { section: String, title: String },
    /// Remove a section and all its tasks
    Rm { section: String },
}
