use crate::dnd::PayloadRecord;
use crate::types::Filter;

/// Inbound events from the presentation layer, applied in delivery order.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddColumn,
    AddCard {
        column_id: String,
        description: String,
    },
    EditCard {
        card_id: String,
        text: String,
    },
    DeleteCard(String),
    ToggleComplete(String),
    ToggleSelect(String),
    SelectAll(String),
    DeleteColumn(String),
    EditColumn {
        column_id: String,
        title: String,
    },
    DeleteSelected,
    MarkSelectedComplete,
    MarkSelectedIncomplete,
    ClearSelection,
    SetSearchTerm(String),
    SetFilter(Filter),
    /// Terminal event of a drag gesture; `drop_targets` is innermost first.
    Drop {
        source: PayloadRecord,
        drop_targets: Vec<PayloadRecord>,
    },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddColumn => "add-column",
            Action::AddCard { .. } => "add-card",
            Action::EditCard { .. } => "edit-card",
            Action::DeleteCard(_) => "delete-card",
            Action::ToggleComplete(_) => "toggle-complete",
            Action::ToggleSelect(_) => "toggle-select",
            Action::SelectAll(_) => "select-all",
            Action::DeleteColumn(_) => "delete-column",
            Action::EditColumn { .. } => "edit-column",
            Action::DeleteSelected => "delete-selected",
            Action::MarkSelectedComplete => "mark-selected-complete",
            Action::MarkSelectedIncomplete => "mark-selected-incomplete",
            Action::ClearSelection => "clear-selection",
            Action::SetSearchTerm(_) => "set-search-term",
            Action::SetFilter(_) => "set-filter",
            Action::Drop { .. } => "drop",
        }
    }
}
