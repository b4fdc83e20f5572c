//! Card and column operations as pure board transformations.
//!
//! Each returns the next snapshot, or `None` when the operation would not
//! change anything (unknown id, blank input, nothing selected).

use crate::types::{Board, Card, Column};

fn normalized_text(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn update_card(board: &Board, card_id: &str, apply: impl FnOnce(&mut Card) -> bool) -> Option<Board> {
    let (column_idx, card_idx) = board.find_card(card_id)?;
    let mut next = board.clone();
    apply(&mut next.columns[column_idx].cards[card_idx]).then_some(next)
}

/// Applies `apply` to every card and keeps the result only if some card
/// reported a change.
fn update_every_card(board: &Board, mut apply: impl FnMut(&mut Card) -> bool) -> Option<Board> {
    let mut next = board.clone();
    let mut changed = false;
    for card in next.columns.iter_mut().flat_map(|column| column.cards.iter_mut()) {
        changed |= apply(card);
    }
    changed.then_some(next)
}

/// Append a new empty column
pub fn add_column(board: &Board, column_id: &str, title: &str) -> Option<Board> {
    if board.column_index(column_id).is_some() {
        return None;
    }
    let title = normalized_text(title)?;
    let mut next = board.clone();
    next.columns.push(Column::new(column_id, title));
    Some(next)
}

/// Append a new card to the end of a column
pub fn add_card(board: &Board, column_id: &str, card_id: &str, description: &str) -> Option<Board> {
    let description = normalized_text(description)?;
    if board.find_card(card_id).is_some() {
        return None;
    }
    let column_idx = board.column_index(column_id)?;
    let mut next = board.clone();
    next.columns[column_idx]
        .cards
        .push(Card::new(card_id, description));
    Some(next)
}

pub fn edit_card(board: &Board, card_id: &str, text: &str) -> Option<Board> {
    let text = normalized_text(text)?;
    update_card(board, card_id, |card| {
        if card.description == text {
            return false;
        }
        card.description = text.to_string();
        true
    })
}

pub fn delete_card(board: &Board, card_id: &str) -> Option<Board> {
    let (column_idx, card_idx) = board.find_card(card_id)?;
    let mut next = board.clone();
    next.columns[column_idx].cards.remove(card_idx);
    Some(next)
}

pub fn toggle_complete(board: &Board, card_id: &str) -> Option<Board> {
    update_card(board, card_id, |card| {
        card.completed = !card.completed;
        true
    })
}

pub fn toggle_select(board: &Board, card_id: &str) -> Option<Board> {
    update_card(board, card_id, |card| {
        card.selected = !card.selected;
        true
    })
}

/// Select every card in one column
pub fn select_all(board: &Board, column_id: &str) -> Option<Board> {
    let column_idx = board.column_index(column_id)?;
    let mut next = board.clone();
    let mut changed = false;
    for card in &mut next.columns[column_idx].cards {
        changed |= !card.selected;
        card.selected = true;
    }
    changed.then_some(next)
}

/// Delete a column together with every card it owns
pub fn delete_column(board: &Board, column_id: &str) -> Option<Board> {
    let column_idx = board.column_index(column_id)?;
    let mut next = board.clone();
    next.columns.remove(column_idx);
    Some(next)
}

pub fn edit_column(board: &Board, column_id: &str, title: &str) -> Option<Board> {
    let title = normalized_text(title)?;
    let column_idx = board.column_index(column_id)?;
    if board.columns[column_idx].title == title {
        return None;
    }
    let mut next = board.clone();
    next.columns[column_idx].title = title.to_string();
    Some(next)
}

/// Delete selected cards in every column
pub fn delete_selected(board: &Board) -> Option<Board> {
    if board.selected_count() == 0 {
        return None;
    }
    let mut next = board.clone();
    for column in &mut next.columns {
        column.cards.retain(|card| !card.selected);
    }
    Some(next)
}

/// Mark every selected card completed (or not)
pub fn set_selected_completed(board: &Board, completed: bool) -> Option<Board> {
    update_every_card(board, |card| {
        if !card.selected || card.completed == completed {
            return false;
        }
        card.completed = completed;
        true
    })
}

pub fn clear_selection(board: &Board) -> Option<Board> {
    update_every_card(board, |card| std::mem::replace(&mut card.selected, false))
}
