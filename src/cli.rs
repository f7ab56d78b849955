use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use taskboard::types::{IssueStatus, Priority};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Compact,
}

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "A CLI for boards and issues on a task tracker", version)]
#[command(after_help = "EXAMPLES:
    taskboard boards                       List boards
    taskboard board 3                      Show a board's lanes
    taskboard issues --status done         List finished issues
    taskboard issue view 42                View issue details
    taskboard issue move 42 --to in-progress  Move an issue to another lane")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json, compact)
    #[arg(long, short = 'o', global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Output as JSON (alias for --format json)
    #[arg(long, global = true, hide = true)]
    pub json: bool,

    /// Suppress success messages
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Show debug logs and the full error chain
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Get the effective output format, considering --json flag
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List boards
    #[command(
        alias = "b",
        after_help = "EXAMPLES:
    taskboard boards
    taskboard boards --format json"
    )]
    Boards,
    /// Show one board with its issues grouped by status
    #[command(after_help = "EXAMPLES:
    taskboard board 3")]
    Board {
        /// Board id
        id: i64,
    },
    /// Manage issues
    #[command(
        alias = "i",
        after_help = "EXAMPLES:
    taskboard issue list --board 3
    taskboard issue view 42
    taskboard issue create -t \"Bug fix\" -d \"Steps\" --priority high --assignee 5 --board 3
    taskboard issue update 42 --status done
    taskboard issue move 42 --to backlog"
    )]
    Issue {
        #[command(subcommand)]
        action: IssueCommands,
    },
    /// List issues (alias for 'issue list')
    #[command(
        alias = "is",
        after_help = "EXAMPLES:
    taskboard issues --search login
    taskboard issues --assignee 5 --status in-progress"
    )]
    Issues(IssueListArgs),
    /// List users
    #[command(
        alias = "u",
        after_help = "EXAMPLES:
    taskboard users"
    )]
    Users,
    /// Generate shell completions
    #[command(after_help = "EXAMPLES:
    taskboard completions bash > ~/.bash_completion.d/taskboard
    taskboard completions zsh > ~/.zfunc/_taskboard
    taskboard completions fish > ~/.config/fish/completions/taskboard.fish")]
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
    /// Initialize configuration file interactively
    #[command(after_help = "EXAMPLES:
    taskboard init")]
    Init,
}

#[derive(Subcommand)]
pub enum IssueCommands {
    /// List issues
    #[command(alias = "ls")]
    List(IssueListArgs),
    /// Show issue details
    #[command(alias = "show")]
    View {
        /// Issue id
        id: i64,
    },
    /// Create a new issue in the backlog
    Create(IssueCreateArgs),
    /// Update an existing issue
    Update(IssueUpdateArgs),
    /// Move an issue to another status lane
    #[command(after_help = "EXAMPLES:
    taskboard issue move 42 --to done")]
    Move {
        /// Issue id
        id: i64,

        /// Destination lane
        #[arg(long, value_enum)]
        to: IssueStatus,
    },
}

#[derive(Args, Clone, Default)]
pub struct IssueListArgs {
    /// Filter by status
    #[arg(long, value_enum)]
    pub status: Option<IssueStatus>,

    /// Filter by board id
    #[arg(long)]
    pub board: Option<i64>,

    /// Case-insensitive title search
    #[arg(long, short)]
    pub search: Option<String>,

    /// Filter by assignee user id
    #[arg(long)]
    pub assignee: Option<i64>,

    /// Group the result into status lanes
    #[arg(long)]
    pub lanes: bool,
}

#[derive(Args)]
pub struct IssueCreateArgs {
    /// Issue title
    #[arg(long, short)]
    pub title: String,

    /// Issue description
    #[arg(long, short)]
    pub description: String,

    /// Priority
    #[arg(long, value_enum)]
    pub priority: Priority,

    /// Assignee user id
    #[arg(long)]
    pub assignee: i64,

    /// Board id
    #[arg(long)]
    pub board: i64,
}

#[derive(Args)]
pub struct IssueUpdateArgs {
    /// Issue id
    pub id: i64,

    /// New title
    #[arg(long, short)]
    pub title: Option<String>,

    /// New description
    #[arg(long, short)]
    pub description: Option<String>,

    /// New priority
    #[arg(long, value_enum)]
    pub priority: Option<Priority>,

    /// New status
    #[arg(long, value_enum)]
    pub status: Option<IssueStatus>,

    /// New assignee user id
    #[arg(long)]
    pub assignee: Option<i64>,
}

impl IssueUpdateArgs {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.assignee.is_none()
    }
}
