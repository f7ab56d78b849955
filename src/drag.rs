//! Turns a card drop between status lanes into a status update.
//!
//! Only lane membership is persisted; the order of cards inside a lane is not
//! an attribute of an issue. The patch is built straight from the dragged
//! issue without going through form validation, since no user-editable field
//! changes. Lanes are re-derived from the store afterwards, so a rejected
//! update leaves the card where it was.

use serde::Deserialize;
use tracing::{debug, info};

use crate::filter::Lanes;
use crate::store::IssueStore;
use crate::types::{IssueId, IssuePatch, IssueStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanePosition {
    pub lane: IssueStatus,
    pub index: usize,
}

/// Result of a drag gesture as reported by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragGesture {
    pub draggable_id: IssueId,
    pub source: LanePosition,
    /// `None` when the drop was aborted.
    pub destination: Option<LanePosition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// Aborted drop or a move inside one lane; nothing was sent.
    Ignored,
    /// The dragged card is not part of the current view.
    NotInView(IssueId),
    Moved { id: IssueId, to: IssueStatus },
    /// The server refused the update; see the store's update error.
    Rejected(IssueId),
}

/// Work out the update a gesture calls for, if any.
pub fn plan_move(view: &Lanes, gesture: &DragGesture) -> Result<Option<IssuePatch>, IssueId> {
    let Some(destination) = gesture.destination else {
        return Ok(None);
    };
    if destination.lane == gesture.source.lane {
        return Ok(None);
    }

    let issue = view
        .find(gesture.draggable_id)
        .ok_or(gesture.draggable_id)?;
    Ok(Some(IssuePatch::from_issue(issue).with_status(destination.lane)))
}

pub async fn handle_drag(store: &IssueStore, view: &Lanes, gesture: &DragGesture) -> DragOutcome {
    let patch = match plan_move(view, gesture) {
        Ok(Some(patch)) => patch,
        Ok(None) => {
            debug!(id = gesture.draggable_id, "drag without lane change ignored");
            return DragOutcome::Ignored;
        }
        Err(id) => {
            debug!(id, "dragged issue is not in the current view");
            return DragOutcome::NotInView(id);
        }
    };

    let id = gesture.draggable_id;
    let to = patch.status;
    info!(id, from = %gesture.source.lane, %to, "moving issue between lanes");
    if store.update_issue(id, &patch).await {
        DragOutcome::Moved { id, to }
    } else {
        DragOutcome::Rejected(id)
    }
}
