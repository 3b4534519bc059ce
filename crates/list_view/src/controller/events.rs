//! Document events delegated to the list view controller.

use shared::domain::ConfigId;

use super::orchestration::LoadOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Char(char),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// A table header was clicked. `field` is its `data-field` marker, if any.
    HeaderClicked { field: Option<String> },
    KeywordKeyPressed(Key),
    MethodFilterChanged,
    PrevPage,
    NextPage,
    /// A `.delete-btn` inside `#config-table` was clicked.
    DeleteClicked { id: ConfigId },
}

impl ViewEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ViewEvent::HeaderClicked { .. } => "header_clicked",
            ViewEvent::KeywordKeyPressed(_) => "keyword_key_pressed",
            ViewEvent::MethodFilterChanged => "method_filter_changed",
            ViewEvent::PrevPage => "prev_page",
            ViewEvent::NextPage => "next_page",
            ViewEvent::DeleteClicked { .. } => "delete_clicked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Declined,
    Completed {
        id: ConfigId,
        /// `None` when the delete call itself succeeded.
        failure: Option<String>,
        reload: LoadOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Ignored,
    Loaded(LoadOutcome),
    Delete(DeleteOutcome),
}
