use crate::types::IssueId;

/// Which issue dialog is open, and in which mode.
///
/// At most one issue is open at a time and edit mode always refers to the
/// open issue, so `edit_mode_issue_id()` is either `None` or equal to
/// `open_issue_id()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Closed,
    Viewing(IssueId),
    Editing {
        id: IssueId,
        /// Opened straight into edit mode, so cancelling closes the dialog.
        direct: bool,
    },
}

impl Selection {
    pub fn open_issue_id(&self) -> Option<IssueId> {
        match *self {
            Selection::Closed => None,
            Selection::Viewing(id) | Selection::Editing { id, .. } => Some(id),
        }
    }

    pub fn edit_mode_issue_id(&self) -> Option<IssueId> {
        match *self {
            Selection::Editing { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn is_edit_mode(&self) -> bool {
        matches!(self, Selection::Editing { .. })
    }

    /// Open `id` read-only, replacing any current selection.
    pub fn open_view(&mut self, id: IssueId) {
        *self = Selection::Viewing(id);
    }

    /// Open `id` in edit mode, replacing any current selection. Coming from
    /// the view of the same issue counts as switching modes.
    pub fn open_edit(&mut self, id: IssueId) {
        let direct = *self != Selection::Viewing(id);
        *self = Selection::Editing { id, direct };
    }

    /// Switch the open dialog from view to edit. Returns false when there is
    /// no viewed issue.
    pub fn switch_to_edit(&mut self) -> bool {
        match *self {
            Selection::Viewing(id) => {
                *self = Selection::Editing { id, direct: false };
                true
            }
            Selection::Editing { .. } => true,
            Selection::Closed => false,
        }
    }

    pub fn cancel_edit(&mut self) {
        if let Selection::Editing { id, direct } = *self {
            *self = if direct {
                Selection::Closed
            } else {
                Selection::Viewing(id)
            };
        }
    }

    pub fn finish_edit(&mut self) {
        if let Selection::Editing { id, .. } = *self {
            *self = Selection::Viewing(id);
        }
    }

    pub fn close(&mut self) {
        *self = Selection::Closed;
    }

    /// Close the dialog if its issue no longer exists.
    pub fn retain(&mut self, exists: impl Fn(IssueId) -> bool) {
        if let Some(id) = self.open_issue_id() {
            if !exists(id) {
                *self = Selection::Closed;
            }
        }
    }
}
