use colored::Colorize;
use tabled::Tabled;
use tracing::warn;

use taskboard::error::{Result, TrackerError};
use taskboard::filter::Lanes;
use taskboard::types::{Board, BoardName, Issue};
use taskboard::Tracker;

use crate::output::{print_item, print_table, truncate};

#[derive(Tabled)]
struct BoardRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Issues")]
    task_count: i64,
    #[tabled(rename = "Description")]
    description: String,
}

impl From<&Board> for BoardRow {
    fn from(board: &Board) -> Self {
        Self {
            id: board.id,
            name: board.name.clone(),
            task_count: board.task_count,
            description: truncate(&board.description, 60),
        }
    }
}

pub async fn list(tracker: &Tracker) -> Result<()> {
    tracker.boards().fetch_boards().await;
    if let Some(message) = tracker.boards().error() {
        return Err(TrackerError::Rejected(message));
    }

    print_table(&tracker.boards().boards(), |b| BoardRow::from(b));
    Ok(())
}

/// Board page: the board's issues split into status lanes.
pub async fn show(tracker: &Tracker, id: i64) -> Result<()> {
    tracker.refresh().await;
    if let Some(message) = tracker.issues().error() {
        return Err(TrackerError::Rejected(message));
    }

    let lanes = tracker.board_lanes(id);
    let name = tracker.boards().board_name(id);
    if let BoardName::Unknown(_) = name {
        if lanes.is_empty() {
            return Err(TrackerError::BoardNotFound(id));
        }
        warn!(board_id = id, "board is not in the board list");
    }

    print_item(&lanes, |lanes| print_lanes(&name, lanes));
    Ok(())
}

pub fn print_lanes(title: &BoardName, lanes: &Lanes) {
    println!("{}", title.to_string().bold());
    for (status, issues) in lanes.iter() {
        println!();
        println!("{} ({})", status.colored(), issues.len());
        if issues.is_empty() {
            println!("  -");
        }
        for issue in issues {
            println!("  {}", card_line(issue));
        }
    }
}

fn card_line(issue: &Issue) -> String {
    format!(
        "#{:<5} {:<50} {:<8} {}",
        issue.id,
        truncate(&issue.title, 50),
        issue.priority.colored(),
        issue.assignee.display_name()
    )
}
