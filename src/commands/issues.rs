use colored::Colorize;
use tabled::Tabled;
use tracing::warn;

use taskboard::drag::{DragGesture, DragOutcome, LanePosition};
use taskboard::error::{Result, TrackerError};
use taskboard::filter::{group_by_status, FilterCriteria};
use taskboard::store::ISSUE_UPDATE_FAILED;
use taskboard::types::{BoardName, Issue, IssueStatus};
use taskboard::workflow::IssueDraft;
use taskboard::Tracker;

use crate::cli::{IssueCreateArgs, IssueListArgs, IssueUpdateArgs};
use crate::commands::boards::print_lanes;
use crate::output::{print_item, print_message, print_table, truncate};

#[derive(Tabled)]
struct IssueRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Assignee")]
    assignee: String,
    #[tabled(rename = "Board")]
    board: String,
}

impl From<&Issue> for IssueRow {
    fn from(issue: &Issue) -> Self {
        Self {
            id: issue.id,
            title: truncate(&issue.title, 50),
            status: issue.status.label().to_string(),
            priority: issue.priority.label().to_string(),
            assignee: issue.assignee.display_name().to_string(),
            board: issue.board_name.clone(),
        }
    }
}

impl From<&IssueListArgs> for FilterCriteria {
    fn from(args: &IssueListArgs) -> Self {
        Self {
            status: args.status,
            board_id: args.board,
            title_query: args.search.clone().unwrap_or_default(),
            assignee_id: args.assignee,
        }
    }
}

async fn load_issues(tracker: &Tracker) -> Result<()> {
    tracker.issues().fetch_issues().await;
    match tracker.issues().error() {
        Some(message) => Err(TrackerError::Rejected(message)),
        None => Ok(()),
    }
}

pub async fn list(tracker: &Tracker, args: IssueListArgs) -> Result<()> {
    load_issues(tracker).await?;
    tracker.set_filter(FilterCriteria::from(&args)).await;
    if let Some(message) = tracker.filter().error() {
        warn!("{message}; showing issues for every assignee");
    }

    let issues = tracker.filtered_issues();
    if args.lanes {
        let lanes = group_by_status(&issues);
        let title = BoardName::Known("Issues".to_string());
        print_item(&lanes, |lanes| print_lanes(&title, lanes));
    } else {
        print_table(&issues, |i| IssueRow::from(i));
    }
    Ok(())
}

pub async fn view(tracker: &Tracker, id: i64) -> Result<()> {
    tracker.refresh().await;
    tracker.open_view(id);
    let issue = match tracker.selected_issue() {
        Some(issue) => issue,
        None => tracker.issues().load_issue(id).await?,
    };

    let board = tracker.board_name(&issue);
    print_item(&issue, |issue| {
        println!("{} {}", format!("#{}", issue.id).bold(), issue.title.bold());
        println!();
        if !issue.description.is_empty() {
            println!("{}", issue.description);
            println!();
        }
        println!("Board:    {board}");
        println!("Status:   {}", issue.status.colored());
        println!("Priority: {}", issue.priority.colored());
        println!("Assignee: {}", issue.assignee.display_name());
        if !issue.assignee.email.is_empty() {
            println!("Email:    {}", issue.assignee.email);
        }
    });
    Ok(())
}

pub async fn create(tracker: &mut Tracker, args: IssueCreateArgs) -> Result<()> {
    tracker.begin_create().await;
    let draft = IssueDraft {
        title: args.title,
        description: args.description,
        priority: Some(args.priority),
        status: None,
        assignee_id: args.assignee.to_string(),
        board_id: args.board.to_string(),
    };

    let id = tracker.submit_create(draft).await?;
    print_message(&format!("Created issue #{id}"));
    Ok(())
}

pub async fn update(tracker: &mut Tracker, args: IssueUpdateArgs) -> Result<()> {
    if args.is_empty() {
        print_message("No updates specified");
        return Ok(());
    }

    load_issues(tracker).await?;
    tracker.open_edit(args.id).await?;

    let mut draft = tracker.composer().draft().clone();
    if let Some(title) = args.title {
        draft.title = title;
    }
    if let Some(description) = args.description {
        draft.description = description;
    }
    if let Some(priority) = args.priority {
        draft.priority = Some(priority);
    }
    if let Some(status) = args.status {
        draft.status = Some(status);
    }
    if let Some(assignee) = args.assignee {
        draft.assignee_id = assignee.to_string();
    }

    tracker.submit_edit(args.id, draft).await?;
    print_message(&format!("Updated issue #{}", args.id));
    Ok(())
}

/// Move an issue between lanes the same way a dropped card does.
pub async fn move_to(tracker: &Tracker, id: i64, to: IssueStatus) -> Result<()> {
    load_issues(tracker).await?;
    let issue = tracker
        .issues()
        .issue(id)
        .ok_or(TrackerError::IssueNotFound(id))?;

    let lanes = tracker.lanes();
    let index = lanes
        .lane(issue.status)
        .iter()
        .position(|i| i.id == id)
        .unwrap_or_default();
    let gesture = DragGesture {
        draggable_id: id,
        source: LanePosition {
            lane: issue.status,
            index,
        },
        destination: Some(LanePosition {
            lane: to,
            index: lanes.lane(to).len(),
        }),
    };

    match tracker.drag_issue(gesture).await {
        DragOutcome::Ignored => print_message(&format!("Issue #{id} is already in {to}")),
        DragOutcome::Moved { id, to } => print_message(&format!("Moved issue #{id} to {to}")),
        DragOutcome::NotInView(id) => return Err(TrackerError::IssueNotFound(id)),
        DragOutcome::Rejected(_) => {
            let message = tracker
                .issues()
                .update_error()
                .unwrap_or_else(|| ISSUE_UPDATE_FAILED.to_string());
            return Err(TrackerError::Rejected(message));
        }
    }
    Ok(())
}
