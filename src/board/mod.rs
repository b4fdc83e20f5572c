//! The board state container.
//!
//! [`BoardStore`] owns the authoritative snapshot. Every change builds a new
//! [`Board`] and swaps it in through [`BoardStore::replace`], which notifies
//! subscribers and hands the snapshot to the persistence collaborator.
//! Unchanged snapshots keep their `Arc`, so `Arc::ptr_eq` is a valid change
//! check for renderers.

pub mod actions;
pub mod messages;
pub mod seed;
pub mod view;

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

pub use self::messages::Action;
pub use self::view::{ColumnCount, Segment, ViewState, highlight_segments};

use crate::dnd::{DropOutcome, PayloadRecord, resolve_drop};
use crate::storage::BoardStorage;
use crate::types::{Board, Filter};

pub const DEFAULT_COLUMN_TITLE: &str = "New column";

type Subscriber = Box<dyn FnMut(&Arc<Board>)>;

pub struct BoardStore {
    board: Arc<Board>,
    view: ViewState,
    storage: Option<Box<dyn BoardStorage>>,
    subscribers: Vec<Subscriber>,
    new_column_title: String,
}

impl BoardStore {
    /// Store without persistence.
    pub fn new(board: Board) -> Self {
        Self {
            board: Arc::new(board),
            view: ViewState::default(),
            storage: None,
            subscribers: Vec::new(),
            new_column_title: DEFAULT_COLUMN_TITLE.to_string(),
        }
    }

    /// Loads the persisted board, falling back to the seed board when
    /// nothing is stored or the stored data cannot be used.
    pub fn open(storage: impl BoardStorage + 'static) -> Self {
        let board = match storage.load() {
            Ok(Some(board)) => board,
            Ok(None) => {
                debug!("no stored board; starting from seed data");
                seed::seed_board()
            }
            Err(error) => {
                warn!("failed to load stored board, using seed data: {error:#}");
                seed::seed_board()
            }
        };

        let mut store = Self::new(board);
        store.storage = Some(Box::new(storage));
        store
    }

    pub fn with_new_column_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        if !title.trim().is_empty() {
            self.new_column_title = title.trim().to_string();
        }
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.view.filter = filter;
        self
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn snapshot(&self) -> Arc<Board> {
        Arc::clone(&self.board)
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn subscribe(&mut self, subscriber: impl FnMut(&Arc<Board>) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Swaps in `next` as the current snapshot. A board that breaks the id
    /// invariants is refused and the current snapshot stays.
    pub fn replace(&mut self, next: Board) -> bool {
        if let Err(error) = next.validate() {
            warn!("refusing board snapshot: {error}");
            return false;
        }

        self.board = Arc::new(next);
        debug!(
            columns = self.board.columns.len(),
            cards = self.board.card_count(),
            "board replaced"
        );

        for subscriber in &mut self.subscribers {
            subscriber(&self.board);
        }
        if let Some(storage) = &self.storage
            && let Err(error) = storage.save(&self.board)
        {
            warn!("failed to persist board: {error:#}");
        }
        true
    }

    fn apply(&mut self, next: Option<Board>) -> bool {
        match next {
            Some(board) => self.replace(board),
            None => false,
        }
    }

    /// Returns the new column's id.
    pub fn add_column(&mut self) -> Option<String> {
        let id = format!("column:{}", Uuid::new_v4());
        let next = actions::add_column(&self.board, &id, &self.new_column_title);
        self.apply(next).then_some(id)
    }

    /// Returns the new card's id, or `None` for a blank description or an
    /// unknown column.
    pub fn add_card(&mut self, column_id: &str, description: &str) -> Option<String> {
        let id = format!("card:{}", Uuid::new_v4());
        let next = actions::add_card(&self.board, column_id, &id, description);
        self.apply(next).then_some(id)
    }

    pub fn edit_card(&mut self, card_id: &str, text: &str) -> bool {
        let next = actions::edit_card(&self.board, card_id, text);
        self.apply(next)
    }

    pub fn delete_card(&mut self, card_id: &str) -> bool {
        let next = actions::delete_card(&self.board, card_id);
        self.apply(next)
    }

    pub fn toggle_complete(&mut self, card_id: &str) -> bool {
        let next = actions::toggle_complete(&self.board, card_id);
        self.apply(next)
    }

    pub fn toggle_select(&mut self, card_id: &str) -> bool {
        let next = actions::toggle_select(&self.board, card_id);
        self.apply(next)
    }

    pub fn select_all(&mut self, column_id: &str) -> bool {
        let next = actions::select_all(&self.board, column_id);
        self.apply(next)
    }

    pub fn delete_column(&mut self, column_id: &str) -> bool {
        let next = actions::delete_column(&self.board, column_id);
        self.apply(next)
    }

    pub fn edit_column(&mut self, column_id: &str, title: &str) -> bool {
        let next = actions::edit_column(&self.board, column_id, title);
        self.apply(next)
    }

    pub fn delete_selected(&mut self) -> bool {
        let next = actions::delete_selected(&self.board);
        self.apply(next)
    }

    pub fn mark_selected_complete(&mut self) -> bool {
        let next = actions::set_selected_completed(&self.board, true);
        self.apply(next)
    }

    pub fn mark_selected_incomplete(&mut self) -> bool {
        let next = actions::set_selected_completed(&self.board, false);
        self.apply(next)
    }

    pub fn clear_selection(&mut self) -> bool {
        let next = actions::clear_selection(&self.board);
        self.apply(next)
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) -> bool {
        let term = term.into();
        if self.view.search_term == term {
            return false;
        }
        self.view.search_term = term;
        true
    }

    pub fn set_filter(&mut self, filter: Filter) -> bool {
        if self.view.filter == filter {
            return false;
        }
        self.view.filter = filter;
        true
    }

    pub fn visible_counts(&self) -> Vec<ColumnCount> {
        self.view.visible_counts(&self.board)
    }

    /// Resolves a finished gesture against the latest snapshot.
    pub fn apply_drop(
        &mut self,
        source: &PayloadRecord,
        drop_targets: &[PayloadRecord],
    ) -> Option<DropOutcome> {
        let resolution = resolve_drop(&self.board, source, drop_targets)?;
        debug!(outcome = ?resolution.outcome, "drop resolved");
        self.replace(resolution.board)
            .then_some(resolution.outcome)
    }

    /// Applies one inbound action. Returns whether the board or the view
    /// changed.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let name = action.name();
        let changed = match action {
            Action::AddColumn => self.add_column().is_some(),
            Action::AddCard {
                column_id,
                description,
            } => self.add_card(&column_id, &description).is_some(),
            Action::EditCard { card_id, text } => self.edit_card(&card_id, &text),
            Action::DeleteCard(card_id) => self.delete_card(&card_id),
            Action::ToggleComplete(card_id) => self.toggle_complete(&card_id),
            Action::ToggleSelect(card_id) => self.toggle_select(&card_id),
            Action::SelectAll(column_id) => self.select_all(&column_id),
            Action::DeleteColumn(column_id) => self.delete_column(&column_id),
            Action::EditColumn { column_id, title } => self.edit_column(&column_id, &title),
            Action::DeleteSelected => self.delete_selected(),
            Action::MarkSelectedComplete => self.mark_selected_complete(),
            Action::MarkSelectedIncomplete => self.mark_selected_incomplete(),
            Action::ClearSelection => self.clear_selection(),
            Action::SetSearchTerm(term) => self.set_search_term(term),
            Action::SetFilter(filter) => self.set_filter(filter),
            Action::Drop {
                source,
                drop_targets,
            } => self.apply_drop(&source, &drop_targets).is_some(),
        };
        if !changed {
            debug!(action = name, "action left state unchanged");
        }
        changed
    }
}
