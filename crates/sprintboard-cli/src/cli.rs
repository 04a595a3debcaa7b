use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use sprintboard_domain::{Priority, Role};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "sprintboard")]
#[command(about = "Agile projects, sprints and boards from the terminal", long_about = None)]
#[command(
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_HASH"), ")")
)]
pub struct Cli {
    /// Path to the data store (overrides SPRINTBOARD_ENDPOINT and config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<String>,

    /// Email of the signed-in user (overrides SPRINTBOARD_USER)
    #[arg(long, global = true, value_name = "EMAIL")]
    pub user: Option<String>,

    /// Access key of the data store (overrides SPRINTBOARD_API_KEY)
    #[arg(long, global = true, value_name = "KEY")]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Project operations
    Project(ProjectCommand),
    /// Sprint operations
    Sprint(SprintCommand),
    /// Column operations
    Column(ColumnCommand),
    /// Task operations
    Task(TaskCommand),
    /// Backlog operations
    Backlog(BacklogCommand),
    /// Collaborators and invitations
    Invite(InviteCommand),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// Project commands
#[derive(Args)]
pub struct ProjectCommand {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a new project
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        end_goal: String,
    },
    /// List projects you own or collaborate on
    List,
    /// Get a specific project
    Get {
        #[arg(long)]
        id: Uuid,
    },
    /// Update a project
    Update {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        end_goal: Option<String>,
    },
    /// Delete a project with its sprints, backlog and collaborators
    Delete {
        #[arg(long)]
        id: Uuid,
    },
}

// Sprint commands
#[derive(Args)]
pub struct SprintCommand {
    #[command(subcommand)]
    pub action: SprintAction,
}

#[derive(Subcommand)]
pub enum SprintAction {
    /// Create a sprint with the default columns
    Create {
        #[arg(long)]
        project_id: Uuid,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last day (YYYY-MM-DD), after the first
        #[arg(long)]
        end: NaiveDate,
    },
    /// List sprints of a project
    List {
        #[arg(long)]
        project_id: Uuid,
    },
    /// Get a specific sprint
    Get {
        #[arg(long)]
        id: Uuid,
    },
    /// Update a sprint
    Update(SprintUpdateArgs),
    /// Mark a sprint completed
    Complete {
        #[arg(long)]
        id: Uuid,
    },
    /// Delete a sprint with its columns and tasks
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// Show the sprint board
    Board {
        #[arg(long)]
        id: Uuid,
    },
    /// Task and point totals
    Progress {
        #[arg(long)]
        id: Uuid,
    },
    /// Burndown series, one point per day
    Burndown {
        #[arg(long)]
        id: Uuid,
        /// Count completions up to this day (defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
}

#[derive(Args)]
pub struct SprintUpdateArgs {
    #[arg(long)]
    pub id: Uuid,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

// Column commands
#[derive(Args)]
pub struct ColumnCommand {
    #[command(subcommand)]
    pub action: ColumnAction,
}

#[derive(Subcommand)]
pub enum ColumnAction {
    /// Add a column to the end of a sprint board
    Create {
        #[arg(long)]
        sprint_id: Uuid,
        #[arg(long)]
        title: String,
    },
    /// List columns of a sprint
    List {
        #[arg(long)]
        sprint_id: Uuid,
    },
    /// Rename a column
    Rename {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        title: String,
    },
    /// Delete an empty, non-default column
    Delete {
        #[arg(long)]
        id: Uuid,
    },
}

// Task commands
#[derive(Args)]
pub struct TaskCommand {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Create(TaskCreateArgs),
    /// List tasks
    List {
        #[arg(long)]
        sprint_id: Option<Uuid>,
        #[arg(long)]
        column_id: Option<Uuid>,
        #[arg(long)]
        assignee: Option<String>,
    },
    /// Get a specific task
    Get {
        #[arg(long)]
        id: Uuid,
    },
    /// Update a task
    Update(TaskUpdateArgs),
    /// Move a task between columns of its sprint
    Move {
        #[arg(long)]
        id: Uuid,
        /// Column the task is in now
        #[arg(long)]
        from: Uuid,
        /// Column to move it to
        #[arg(long)]
        to: Uuid,
    },
    /// Send a task back to the project backlog
    ToBacklog {
        #[arg(long)]
        id: Uuid,
    },
    /// Delete a task
    Delete {
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Args)]
pub struct TaskCreateArgs {
    #[arg(long)]
    pub sprint_id: Uuid,
    /// Defaults to the sprint's TO DO column
    #[arg(long)]
    pub column_id: Option<Uuid>,
    #[arg(long)]
    pub title: String,
    #[arg(long, default_value = "")]
    pub description: String,
    /// low, medium or high
    #[arg(long, default_value = "medium")]
    pub priority: Priority,
    #[arg(long)]
    pub assignee: Option<String>,
    #[arg(long, default_value_t = 0)]
    pub points: u32,
}

#[derive(Args)]
pub struct TaskUpdateArgs {
    #[arg(long)]
    pub id: Uuid,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub priority: Option<Priority>,
    #[arg(long, conflicts_with = "clear_assignee")]
    pub assignee: Option<String>,
    #[arg(long)]
    pub clear_assignee: bool,
    #[arg(long)]
    pub points: Option<u32>,
}

// Backlog commands
#[derive(Args)]
pub struct BacklogCommand {
    #[command(subcommand)]
    pub action: BacklogAction,
}

#[derive(Subcommand)]
pub enum BacklogAction {
    /// Add an item to a project backlog
    Create {
        #[arg(long)]
        project_id: Uuid,
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        #[arg(long, default_value_t = 0)]
        points: u32,
    },
    /// List a project's backlog
    List {
        #[arg(long)]
        project_id: Uuid,
    },
    /// Update a backlog item
    Update {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long)]
        points: Option<u32>,
    },
    /// Delete a backlog item
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// Turn an item into a task in the sprint's TO DO column
    ToSprint {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        sprint_id: Uuid,
    },
}

// Invitation commands
#[derive(Args)]
pub struct InviteCommand {
    #[command(subcommand)]
    pub action: InviteAction,
}

#[derive(Subcommand)]
pub enum InviteAction {
    /// Invite someone to a project
    Send {
        #[arg(long)]
        project_id: Uuid,
        #[arg(long)]
        email: String,
        /// viewer, editor or admin
        #[arg(long, default_value = "viewer")]
        role: Role,
    },
    /// List collaborators of a project
    List {
        #[arg(long)]
        project_id: Uuid,
    },
    /// Invitations waiting for you
    Pending,
    /// Accept an invitation
    Accept {
        #[arg(long)]
        id: Uuid,
    },
    /// Decline an invitation
    Decline {
        #[arg(long)]
        id: Uuid,
    },
    /// Withdraw access or a pending invitation
    Revoke {
        #[arg(long)]
        id: Uuid,
    },
    /// Change a collaborator's role
    SetRole {
        #[arg(long)]
        id: Uuid,
        #[arg(long)]
        role: Role,
    },
    /// Print your pending invitations whenever they change
    Watch {
        /// Stop after this many updates
        #[arg(long)]
        count: Option<usize>,
    },
}
