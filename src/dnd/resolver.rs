//! Computes the next board from a finished drag.
//!
//! Every failure mode (unclassifiable payloads, no target under the pointer,
//! ids that no longer exist because the board changed mid-gesture) resolves
//! to `None`: the caller keeps its current snapshot.

use tracing::debug;

use super::payload::{
    CardDropTarget, DraggingCard, Edge, Payload, PayloadRecord, classify,
};
use super::reorder::{reorder, reorder_with_edge};
use crate::types::{Board, Column};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DropOutcome {
    /// Card dropped on a sibling card in its own column.
    CardReordered {
        card_id: String,
        column_id: String,
        from: usize,
        to: usize,
    },
    /// Card dropped on a card in another column.
    CardMoved {
        card_id: String,
        from_column: String,
        to_column: String,
        index: usize,
    },
    /// Card dropped on the empty area of its own column.
    CardSentToEnd { card_id: String, column_id: String },
    /// Card dropped on the empty area of another column.
    CardAppended {
        card_id: String,
        from_column: String,
        to_column: String,
    },
    ColumnReordered {
        column_id: String,
        from: usize,
        to: usize,
    },
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Resolution {
    pub outcome: DropOutcome,
    pub board: Board,
}

fn noop(reason: &'static str) -> Option<Resolution> {
    debug!(reason, "drop left the board unchanged");
    None
}

/// `drop_targets` is the hovered target stack at release time, innermost
/// first.
pub fn resolve_drop(
    board: &Board,
    source: &PayloadRecord,
    drop_targets: &[PayloadRecord],
) -> Option<Resolution> {
    let Some(dragging) = classify(source) else {
        return noop("source payload is not ours");
    };
    let Some(innermost) = drop_targets.first() else {
        return noop("released outside any drop target");
    };
    let Some(target) = classify(innermost) else {
        return noop("drop target payload is not ours");
    };

    match dragging {
        Payload::Card(dragging) => resolve_card_drop(board, &dragging, &target),
        Payload::Column(data) => resolve_column_drop(board, &data.column.id, &target),
        _ => noop("source payload is not draggable"),
    }
}

fn resolve_card_drop(
    board: &Board,
    dragging: &DraggingCard,
    target: &Payload,
) -> Option<Resolution> {
    let Some(home_idx) = board.column_index(&dragging.column_id) else {
        return noop("home column no longer exists");
    };
    let Some(card_idx) = board.columns[home_idx].card_index(&dragging.card.id) else {
        return noop("dragged card is no longer in its home column");
    };

    if let Payload::CardDropTarget(target) = target {
        return drop_on_card(board, home_idx, card_idx, target);
    }

    let Some(column_id) = target.column_target_id() else {
        return noop("card dropped on an unsupported target");
    };
    let Some(destination_idx) = board.column_index(column_id) else {
        return noop("destination column no longer exists");
    };
    drop_on_column(board, home_idx, card_idx, destination_idx)
}

fn drop_on_card(
    board: &Board,
    home_idx: usize,
    card_idx: usize,
    target: &CardDropTarget,
) -> Option<Resolution> {
    let Some(destination_idx) = board.column_index(&target.column_id) else {
        return noop("destination column no longer exists");
    };
    let home = &board.columns[home_idx];
    let destination = &board.columns[destination_idx];
    let Some(target_idx) = destination.card_index(&target.card.id) else {
        return noop("target card is no longer in its column");
    };
    let card_id = home.cards[card_idx].id.clone();

    if home_idx == destination_idx {
        if card_idx == target_idx {
            return noop("card dropped onto itself");
        }
        let reordered = reorder_with_edge(&home.cards, card_idx, target_idx, target.closest_edge);
        if reordered == home.cards {
            return noop("card already sits on that edge");
        }
        let to = reordered
            .iter()
            .position(|card| card.id == card_id)
            .unwrap_or(card_idx);
        let mut columns = board.columns.clone();
        columns[home_idx].cards = reordered;
        return Some(Resolution {
            outcome: DropOutcome::CardReordered {
                card_id,
                column_id: home.id.clone(),
                from: card_idx,
                to,
            },
            board: Board { columns },
        });
    }

    let index = match target.closest_edge {
        Some(Edge::Bottom) => target_idx + 1,
        _ => target_idx,
    };
    let board = transfer_card(board, home_idx, card_idx, destination_idx, index);
    Some(Resolution {
        outcome: DropOutcome::CardMoved {
            card_id,
            from_column: home.id.clone(),
            to_column: destination.id.clone(),
            index,
        },
        board,
    })
}

fn drop_on_column(
    board: &Board,
    home_idx: usize,
    card_idx: usize,
    destination_idx: usize,
) -> Option<Resolution> {
    let home = &board.columns[home_idx];
    let card_id = home.cards[card_idx].id.clone();

    if home_idx == destination_idx {
        let last = home.cards.len() - 1;
        if card_idx == last {
            return noop("card is already last in its column");
        }
        let mut columns = board.columns.clone();
        columns[home_idx].cards = reorder(&home.cards, card_idx, last);
        return Some(Resolution {
            outcome: DropOutcome::CardSentToEnd {
                card_id,
                column_id: home.id.clone(),
            },
            board: Board { columns },
        });
    }

    let destination = &board.columns[destination_idx];
    let index = destination.cards.len();
    let next = transfer_card(board, home_idx, card_idx, destination_idx, index);
    Some(Resolution {
        outcome: DropOutcome::CardAppended {
            card_id,
            from_column: home.id.clone(),
            to_column: destination.id.clone(),
        },
        board: next,
    })
}

/// Moves the board's current copy of the card (not the drag-start snapshot)
/// so edits made during the gesture survive. Both columns change in the
/// same new snapshot.
fn transfer_card(
    board: &Board,
    home_idx: usize,
    card_idx: usize,
    destination_idx: usize,
    index: usize,
) -> Board {
    let mut columns: Vec<Column> = board.columns.clone();
    let card = columns[home_idx].cards.remove(card_idx);
    let destination = &mut columns[destination_idx].cards;
    let index = index.min(destination.len());
    destination.insert(index, card);
    Board { columns }
}

fn resolve_column_drop(board: &Board, column_id: &str, target: &Payload) -> Option<Resolution> {
    let Some(target_id) = target.column_target_id() else {
        return noop("column dropped on a non-column target");
    };
    let (Some(from), Some(to)) = (board.column_index(column_id), board.column_index(target_id))
    else {
        return noop("column no longer exists");
    };
    if from == to {
        return noop("column dropped onto itself");
    }

    Some(Resolution {
        outcome: DropOutcome::ColumnReordered {
            column_id: column_id.to_string(),
            from,
            to,
        },
        board: Board {
            columns: reorder(&board.columns, from, to),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dnd::payload::{
        Rect, attach_closest_edge, card_data, card_drop_target_data, column_data,
        column_drop_target_data,
    };
    use crate::types::Card;
    use serde_json::json;

    fn column(id: &str, title: &str, cards: &[&str]) -> Column {
        let mut column = Column::new(id, title);
        column.cards = cards
            .iter()
            .map(|id| Card::new(*id, format!("task {id}")))
            .collect();
        column
    }

    fn board() -> Board {
        Board {
            columns: vec![
                column("P", "Mon", &["X", "Y"]),
                column("Q", "Tue", &["W", "Z"]),
                column("R", "Wed", &[]),
            ],
        }
    }

    fn ids(board: &Board, column_id: &str) -> Vec<String> {
        board
            .column(column_id)
            .expect("column should exist")
            .cards
            .iter()
            .map(|card| card.id.clone())
            .collect()
    }

    fn drag_card(board: &Board, card_id: &str) -> PayloadRecord {
        let (column_idx, card_idx) = board.find_card(card_id).expect("card should exist");
        let column = &board.columns[column_idx];
        card_data(&column.cards[card_idx], &column.id, Rect::default())
    }

    fn onto_card(board: &Board, card_id: &str, edge: Option<Edge>) -> PayloadRecord {
        let (column_idx, card_idx) = board.find_card(card_id).expect("card should exist");
        let column = &board.columns[column_idx];
        attach_closest_edge(
            card_drop_target_data(&column.cards[card_idx], &column.id),
            edge,
        )
    }

    fn onto_column(board: &Board, column_id: &str) -> PayloadRecord {
        column_drop_target_data(board.column(column_id).expect("column should exist"))
    }

    /// Hovered stack as the gesture source reports it: card target, then the
    /// column body it sits in.
    fn stack(board: &Board, card_id: &str, edge: Option<Edge>) -> Vec<PayloadRecord> {
        let (column_idx, _) = board.find_card(card_id).expect("card should exist");
        vec![
            onto_card(board, card_id, edge),
            onto_column(board, &board.columns[column_idx].id),
        ]
    }

    #[test]
    fn same_column_bottom_edge_moves_after_target() {
        let board = Board {
            columns: vec![column("P", "Mon", &["A", "B", "C"])],
        };
        let resolution = resolve_drop(
            &board,
            &drag_card(&board, "A"),
            &stack(&board, "B", Some(Edge::Bottom)),
        )
        .expect("drop should reorder");

        assert_eq!(ids(&resolution.board, "P"), vec!["B", "A", "C"]);
        assert_eq!(
            resolution.outcome,
            DropOutcome::CardReordered {
                card_id: "A".to_string(),
                column_id: "P".to_string(),
                from: 0,
                to: 1,
            }
        );
    }

    #[test]
    fn same_column_top_edge_of_next_sibling_is_noop() {
        let board = Board {
            columns: vec![column("P", "Mon", &["A", "B", "C"])],
        };
        let resolution = resolve_drop(
            &board,
            &drag_card(&board, "A"),
            &stack(&board, "B", Some(Edge::Top)),
        );
        assert_eq!(resolution, None);
    }

    #[test]
    fn card_dropped_onto_itself_is_noop() {
        let board = board();
        for edge in [Some(Edge::Top), Some(Edge::Bottom), None] {
            let resolution =
                resolve_drop(&board, &drag_card(&board, "X"), &stack(&board, "X", edge));
            assert_eq!(resolution, None);
        }
    }

    #[test]
    fn cross_column_top_edge_inserts_before_target() {
        let board = board();
        let resolution = resolve_drop(
            &board,
            &drag_card(&board, "X"),
            &stack(&board, "Z", Some(Edge::Top)),
        )
        .expect("drop should move the card");

        assert_eq!(ids(&resolution.board, "P"), vec!["Y"]);
        assert_eq!(ids(&resolution.board, "Q"), vec!["W", "X", "Z"]);
        assert_eq!(
            resolution.outcome,
            DropOutcome::CardMoved {
                card_id: "X".to_string(),
                from_column: "P".to_string(),
                to_column: "Q".to_string(),
                index: 1,
            }
        );
    }

    #[test]
    fn cross_column_bottom_edge_inserts_after_target() {
        let board = board();
        let resolution = resolve_drop(
            &board,
            &drag_card(&board, "Y"),
            &stack(&board, "Z", Some(Edge::Bottom)),
        )
        .expect("drop should move the card");

        assert_eq!(ids(&resolution.board, "P"), vec!["X"]);
        assert_eq!(ids(&resolution.board, "Q"), vec!["W", "Z", "Y"]);
    }

    #[test]
    fn cross_column_move_keeps_latest_card_state() {
        let before = board();
        let source = drag_card(&before, "X");
        let mut during = before.clone();
        during.columns[0].cards[0].description = "edited mid-drag".to_string();
        during.columns[0].cards[0].completed = true;

        let resolution = resolve_drop(&during, &source, &stack(&during, "W", Some(Edge::Top)))
            .expect("drop should move the card");

        let moved = resolution.board.card("X").expect("card should move");
        assert_eq!(moved.description, "edited mid-drag");
        assert!(moved.completed);
    }

    #[test]
    fn column_background_in_home_sends_card_to_end() {
        let board = Board {
            columns: vec![column("P", "Mon", &["A", "B", "C"])],
        };
        let resolution = resolve_drop(
            &board,
            &drag_card(&board, "A"),
            &[onto_column(&board, "P")],
        )
        .expect("drop should move the card to the end");

        assert_eq!(ids(&resolution.board, "P"), vec!["B", "C", "A"]);
        assert!(matches!(
            resolution.outcome,
            DropOutcome::CardSentToEnd { .. }
        ));
    }

    #[test]
    fn column_background_in_home_for_last_card_is_noop() {
        let board = board();
        let resolution = resolve_drop(
            &board,
            &drag_card(&board, "Y"),
            &[onto_column(&board, "P")],
        );
        assert_eq!(resolution, None);
    }

    #[test]
    fn column_background_elsewhere_appends() {
        let board = board();
        let resolution = resolve_drop(
            &board,
            &drag_card(&board, "X"),
            &[onto_column(&board, "Q")],
        )
        .expect("drop should append the card");

        assert_eq!(ids(&resolution.board, "P"), vec!["Y"]);
        assert_eq!(ids(&resolution.board, "Q"), vec!["W", "Z", "X"]);
    }

    #[test]
    fn empty_column_accepts_card() {
        let board = board();
        let resolution = resolve_drop(
            &board,
            &drag_card(&board, "W"),
            &[onto_column(&board, "R")],
        )
        .expect("drop should append the card");

        assert_eq!(ids(&resolution.board, "R"), vec!["W"]);
        assert_eq!(ids(&resolution.board, "Q"), vec!["Z"]);
    }

    #[test]
    fn column_reorder_moves_to_target_index() {
        let board = board();
        let source = column_data(board.column("R").expect("column should exist"));
        let resolution = resolve_drop(&board, &source, &[onto_column(&board, "P")])
            .expect("drop should reorder columns");

        let order: Vec<_> = resolution
            .board
            .columns
            .iter()
            .map(|column| column.title.as_str())
            .collect();
        assert_eq!(order, vec!["Wed", "Mon", "Tue"]);
        assert_eq!(
            resolution.outcome,
            DropOutcome::ColumnReordered {
                column_id: "R".to_string(),
                from: 2,
                to: 0,
            }
        );
    }

    #[test]
    fn column_dropped_on_itself_is_noop() {
        let board = board();
        let source = column_data(board.column("Q").expect("column should exist"));
        assert_eq!(
            resolve_drop(&board, &source, &[onto_column(&board, "Q")]),
            None
        );
    }

    #[test]
    fn column_dropped_on_card_target_is_noop() {
        let board = board();
        let source = column_data(board.column("Q").expect("column should exist"));
        assert_eq!(
            resolve_drop(&board, &source, &stack(&board, "X", Some(Edge::Top))),
            None
        );
    }

    #[test]
    fn release_outside_targets_is_noop() {
        let board = board();
        assert_eq!(resolve_drop(&board, &drag_card(&board, "X"), &[]), None);
    }

    #[test]
    fn foreign_payloads_are_ignored() {
        let board = board();
        let foreign = PayloadRecord::from_value(json!({ "files": ["a.txt"] }));
        assert_eq!(
            resolve_drop(&board, &foreign, &[onto_column(&board, "Q")]),
            None
        );
        assert_eq!(
            resolve_drop(&board, &drag_card(&board, "X"), &[foreign]),
            None
        );
    }

    #[test]
    fn deleted_destination_column_is_noop() {
        let before = board();
        let source = drag_card(&before, "X");
        let targets = stack(&before, "Z", Some(Edge::Top));
        let mut after = before.clone();
        after.columns.remove(1);

        assert_eq!(resolve_drop(&after, &source, &targets), None);
    }

    #[test]
    fn deleted_home_column_is_noop() {
        let before = board();
        let source = drag_card(&before, "X");
        let targets = vec![onto_column(&before, "Q")];
        let mut after = before.clone();
        after.columns.remove(0);

        assert_eq!(resolve_drop(&after, &source, &targets), None);
    }

    #[test]
    fn deleted_dragged_card_never_removes_another_card() {
        let before = board();
        let source = drag_card(&before, "X");
        let targets = stack(&before, "Z", Some(Edge::Top));
        let mut after = before.clone();
        after.columns[0].cards.remove(0);

        assert_eq!(resolve_drop(&after, &source, &targets), None);
    }

    #[test]
    fn deleted_target_card_is_noop() {
        let before = board();
        let source = drag_card(&before, "X");
        let targets = stack(&before, "Z", Some(Edge::Bottom));
        let mut after = before.clone();
        after.columns[1].cards.retain(|card| card.id != "Z");

        assert_eq!(resolve_drop(&after, &source, &targets), None);
    }

    #[test]
    fn resolutions_preserve_identity_invariants() {
        let board = board();
        let drops = [
            (drag_card(&board, "X"), stack(&board, "Z", Some(Edge::Top))),
            (drag_card(&board, "Y"), vec![onto_column(&board, "R")]),
            (drag_card(&board, "W"), stack(&board, "Z", Some(Edge::Bottom))),
            (drag_card(&board, "X"), vec![onto_column(&board, "P")]),
        ];
        for (source, targets) in drops {
            if let Some(resolution) = resolve_drop(&board, &source, &targets) {
                assert_eq!(resolution.board.validate(), Ok(()));
                assert_eq!(resolution.board.card_count(), board.card_count());
            }
        }
    }
}
